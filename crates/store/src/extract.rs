//! Pattern-based extraction from store HTML.  Pure functions, no I/O.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::{ListingId, ListingRecord};

/// Path fragment of every listing detail link.
const DETAILS_MARKER: &str = "/store/apps/details?id=";

/// Description containers, in order of preference.
const DESCRIPTION_BLOCKS: &[&str] = &["div[jsname=\"bN97Pc\"]", "div[jsname=\"sngebd\"]"];

fn rating_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"Rated ([0-9.]+) stars").expect("rating regex"))
}

fn installs_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)([0-9.,]+[KMB+]+)\s+downloads").expect("installs regex")
    })
}

/// Listing ids linked from a search results page, unique, in page order,
/// at most `max`.  Relative links are resolved against `base`.
pub fn listing_ids(html: &str, base: &Url, max: usize) -> Vec<ListingId> {
    let Ok(links) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    let doc = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut ids = Vec::new();

    for link in doc.select(&links) {
        if ids.len() >= max {
            break;
        }
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        let Some(id) = listing_id_from_href(base, href) else {
            continue;
        };
        if seen.insert(id.clone()) {
            ids.push(id);
        }
    }

    ids
}

fn listing_id_from_href(base: &Url, href: &str) -> Option<ListingId> {
    if !href.contains(DETAILS_MARKER) {
        return None;
    }
    let url = base.join(href).ok()?;
    url.query_pairs()
        .filter(|(key, _)| key == "id")
        .last()
        .map(|(_, value)| value.trim().to_string())
        .filter(|id| !id.is_empty())
}

/// Build a record from a detail page.  Never fails; anything that cannot be
/// found is left empty or `None`.
pub fn listing_record(html: &str, id: &str) -> ListingRecord {
    let doc = Html::parse_document(html);
    ListingRecord {
        id: id.to_string(),
        name: extract_name(&doc).unwrap_or_else(|| id.to_string()),
        summary: extract_summary(&doc).unwrap_or_default(),
        rating: extract_rating(&doc),
        installs: extract_installs(&doc),
    }
}

fn extract_name(doc: &Html) -> Option<String> {
    let heading = select_first(doc, "h1")?;
    let label = Selector::parse("span")
        .ok()
        .and_then(|span| heading.select(&span).next());
    let name = element_text(label.unwrap_or(heading));
    (!name.is_empty()).then_some(name)
}

fn extract_summary(doc: &Html) -> Option<String> {
    if let Some(meta) = select_first(doc, "meta[itemprop=\"description\"]") {
        if let Some(content) = meta.value().attr("content") {
            let content = content.trim();
            if !content.is_empty() {
                return Some(content.to_string());
            }
        }
    }

    DESCRIPTION_BLOCKS
        .iter()
        .find_map(|css| select_first(doc, css))
        .map(element_text)
        .filter(|text| !text.is_empty())
}

fn extract_rating(doc: &Html) -> Option<f64> {
    let labelled = Selector::parse("div[aria-label]").ok()?;
    // Only the first rating-like label counts, parsed or not.
    let label = doc
        .select(&labelled)
        .filter_map(|div| div.value().attr("aria-label"))
        .find(|label| label.contains("Rated") && label.contains("stars out of five stars"))?;
    rating_regex()
        .captures(label)
        .and_then(|caps| caps.get(1))
        .and_then(|value| value.as_str().parse::<f64>().ok())
}

fn extract_installs(doc: &Html) -> Option<String> {
    let text = flattened_text(doc);
    installs_regex()
        .captures(&text)
        .and_then(|caps| caps.get(1))
        .map(|token| token.as_str().to_string())
}

fn select_first<'a>(doc: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    doc.select(&selector).next()
}

/// Text of `el` with whitespace runs collapsed to single spaces.
fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// All visible text of the page (script and style bodies excluded).
fn flattened_text(doc: &Html) -> String {
    let mut pieces = Vec::new();
    for node in doc.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let in_code = node
            .parent()
            .and_then(|parent| parent.value().as_element().map(|el| el.name()))
            .is_some_and(|name| matches!(name, "script" | "style"));
        if in_code {
            continue;
        }
        let piece = text.trim();
        if !piece.is_empty() {
            pieces.push(piece);
        }
    }
    pieces.join(" ")
}
