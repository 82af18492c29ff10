//! Prompt assembly for the three report kinds.
//!
//! Everything here is synchronous and side-effect free; callers gather data
//! first and hand it over.

use anyhow::{Result, bail};

use appscout_config::{Niche, ReportConfig};
use appscout_store::ListingRecord;

const TRUNCATION_MARKER: &str = "\n... (truncated)";
const MISSING: &str = "n/a";

// ─── listing block ───────────────────────────────────────────────────────────

/// Render records as a numbered plain-text block.
///
/// Each summary is cut to `summary_max` chars (plus `...`); the whole block is
/// cut to `total_max` chars with a truncation marker appended.  Absent fields
/// render as `n/a`.
pub fn format_listings(records: &[ListingRecord], summary_max: usize, total_max: usize) -> String {
    let entries = records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            let summary = if record.summary.trim().is_empty() {
                MISSING.to_string()
            } else {
                match truncate_chars(&record.summary, summary_max) {
                    (head, true) => format!("{head}..."),
                    (head, false) => head.to_string(),
                }
            };
            let rating = record
                .rating
                .map(|rating| rating.to_string())
                .unwrap_or_else(|| MISSING.to_string());
            let installs = record.installs.as_deref().unwrap_or(MISSING);
            format!(
                "{n}) Name: {name}\n   Rating: {rating}\n   Installs: {installs}\n   Summary: {summary}\n",
                n = index + 1,
                name = record.name,
            )
        })
        .collect::<Vec<_>>();

    let text = entries.join("\n");
    match truncate_chars(&text, total_max) {
        (head, true) => format!("{head}{TRUNCATION_MARKER}"),
        (_, false) => text,
    }
}

/// First `max` chars of `s`, and whether anything was cut.
fn truncate_chars(s: &str, max: usize) -> (&str, bool) {
    match s.char_indices().nth(max) {
        Some((byte_index, _)) => (&s[..byte_index], true),
        None => (s, false),
    }
}

// ─── report prompts ──────────────────────────────────────────────────────────

/// Market report grounded on scraped listings.  Fails when there is nothing
/// to analyze.
pub fn research_prompt(
    niche_label: &str,
    records: &[ListingRecord],
    report: &ReportConfig,
) -> Result<String> {
    if records.is_empty() {
        bail!("no store listings to analyze for niche '{niche_label}'");
    }
    let listings = format_listings(records, report.summary_max_chars, report.listings_max_chars);
    let language = &report.language;

    Ok(format!(
        "You are an experienced product manager and mobile app strategist.\n\
         Below are real app listings scraped from Google Play.\n\n\
         Niche: {niche_label}\n\n\
         Raw data (the apps we care about most):\n\n\
         {listings}\n\n\
         Write a clear, business-focused analysis in {language} using these headings:\n\n\
         1) State of the Niche\n\
         - What does the overall picture look like?\n\
         - Judging by these apps, which problems do users want solved?\n\n\
         2) Competitor Strengths\n\
         - Summarize the shared strengths of the sample apps as bullet points.\n\
         - Focus on UX, simplicity, visual quality and feature set.\n\n\
         3) Weak Spots and Opportunities\n\
         - List likely weaknesses of the sample apps (ads, complex flows, forced sign-up, etc.).\n\
         - From those, write 4-6 points on how our app could stand out.\n\n\
         4) Concrete Recommendations for a New App\n\
         - Speak as \"if I were launching a new app in this niche\".\n\
         - Give 5-7 very concrete feature or differentiation ideas.\n\n\
         5) Revenue Model Options\n\
         - Suggest 2-3 sensible revenue models (ads, one-time premium, subscription, ...).\n\
         - One sentence each on the upside and the downside.\n\n\
         6) One-Week MVP Plan\n\
         - List the minimum feature set buildable in one week (3-6 bullets).\n\
         - Keep it realistic.\n\n\
         Keep the report SHORT BUT DENSE. No filler, only findings we can act on.\n"
    ))
}

/// Competitor and opportunity report from the niche description alone.
pub fn analysis_prompt(niche: &Niche, report: &ReportConfig) -> String {
    let keywords = niche.keywords.join(", ");
    let label = &niche.label;
    let language = &report.language;

    format!(
        "You are an experienced product manager and growth consultant.\n\
         Your task is a competitor and opportunity analysis for this Google Play niche:\n\n\
         Niche: {label}\n\
         Likely store search keywords: {keywords}\n\n\
         Write the analysis in {language}. Use these headings in order:\n\n\
         1) 🎯 Niche Summary\n\
         - What is this app category for?\n\
         - Who uses it (target audience)?\n\
         - What problem do users most often want solved?\n\n\
         2) 📱 Typical Competitor Features\n\
         - List the core features apps in this category usually offer.\n\
         - Add the UX strengths you commonly see.\n\n\
         3) 😬 User Complaints and Gaps\n\
         - Estimate the complaints common in reviews of such apps \
         (too many ads, cluttered design, mandatory sign-up, ...).\n\
         - Start each point with '•' and keep it short.\n\n\
         4) 🧠 How Would You Differentiate?\n\
         - Suggest 4-6 strong ideas for a new app to clearly stand apart.\n\
         - Think simplicity, offline use, free features, extras for students.\n\
         - Start each point with '•'.\n\n\
         5) 💰 Revenue Model Suggestions\n\
         - 2-3 sensible revenue models (ads, one-time premium, subscription, ...).\n\
         - For each: upside and downside in one sentence.\n\n\
         6) ⚙️ Quick MVP (Version 1)\n\
         - The fewest features an MVP needs (3-6 bullets).\n\
         - Keep it at a 'codeable in the first week' level.\n\n\
         KEEP THE REPORT SHORT BUT DENSE.\n\
         No decoration, only information we can use directly.\n"
    )
}

/// A single niche-but-sensible Android app idea.
pub fn idea_prompt(report: &ReportConfig) -> String {
    let language = &report.language;

    format!(
        "You are an experienced mobile product and growth consultant.\n\
         Your task is to propose a *niche but sensible* app idea for Android.\n\n\
         Rules:\n\
         - Write the output in {language}.\n\
         - Produce exactly *ONE* app idea.\n\
         - It should not have many clones on Play Store, yet bring real value to real users.\n\
         - In particular:\n  \
           - It may target students, developers, traders or content creators.\n  \
           - Keep it to a single screen or a simple flow where possible.\n  \
           - The backend should be cheap or buildable on free services (Firebase, GitHub Actions, ...).\n\n\
         Output format:\n\
         - First line: a short title (e.g. \"🎯 Smart Exam Study Coach\")\n\
         - Then 5-10 lines covering:\n  \
           - what the idea does\n  \
           - how it brings the user back every day (habit / gamification)\n  \
           - a simple revenue model (ads, subscription, one-time payment, ...)\n\n\
         PLEASE:\n\
         - Bullet points are fine, but keep them around the one idea.\n\
         - Do not give more than one idea.\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, summary: &str, rating: Option<f64>, installs: Option<&str>) -> ListingRecord {
        ListingRecord {
            id: id.to_string(),
            name: format!("{id} app"),
            summary: summary.to_string(),
            rating,
            installs: installs.map(ToString::to_string),
        }
    }

    #[test]
    fn formats_numbered_entries() {
        let records = vec![
            record("a", "Timer for study", Some(4.5), Some("1M+")),
            record("b", "Planner", None, None),
        ];
        let text = format_listings(&records, 220, 2500);
        assert_eq!(
            text,
            "1) Name: a app\n   Rating: 4.5\n   Installs: 1M+\n   Summary: Timer for study\n\
             \n\
             2) Name: b app\n   Rating: n/a\n   Installs: n/a\n   Summary: Planner\n"
        );
    }

    #[test]
    fn record_with_every_optional_field_absent_renders() {
        let text = format_listings(&[ListingRecord::bare("com.empty")], 220, 2500);
        assert!(text.contains("Name: com.empty"));
        assert!(text.contains("Rating: n/a"));
        assert!(text.contains("Installs: n/a"));
        assert!(text.contains("Summary: n/a"));
    }

    #[test]
    fn long_summary_is_capped_per_record() {
        let summary = "ş".repeat(300);
        let text = format_listings(&[record("a", &summary, None, None)], 220, 10_000);
        let expected = format!("Summary: {}...\n", "ş".repeat(220));
        assert!(text.ends_with(&expected));
    }

    #[test]
    fn summary_at_exact_limit_is_not_marked() {
        let summary = "x".repeat(220);
        let text = format_listings(&[record("a", &summary, None, None)], 220, 10_000);
        assert!(text.ends_with(&format!("Summary: {summary}\n")));
    }

    #[test]
    fn whole_block_is_capped_with_marker() {
        let records: Vec<_> = (0..20)
            .map(|i| record(&format!("app{i}"), &"y".repeat(200), Some(4.0), Some("10K+")))
            .collect();
        let text = format_listings(&records, 220, 2500);
        assert!(text.ends_with(TRUNCATION_MARKER));
        assert_eq!(
            text.chars().count(),
            2500 + TRUNCATION_MARKER.chars().count()
        );
    }

    #[test]
    fn research_prompt_requires_records() {
        let err = research_prompt("Study planner", &[], &ReportConfig::default()).unwrap_err();
        assert!(err.to_string().contains("Study planner"));
    }

    #[test]
    fn research_prompt_embeds_label_listings_and_language() {
        let report = ReportConfig {
            language: "Turkish".to_string(),
            ..ReportConfig::default()
        };
        let prompt = research_prompt(
            "Study planner / Pomodoro",
            &[record("com.focus", "Focus timer", Some(4.7), Some("5M+"))],
            &report,
        )
        .unwrap();
        assert!(prompt.contains("Niche: Study planner / Pomodoro"));
        assert!(prompt.contains("1) Name: com.focus app"));
        assert!(prompt.contains("in Turkish"));
        assert!(prompt.contains("6) One-Week MVP Plan"));
    }

    #[test]
    fn analysis_prompt_lists_keywords() {
        let niche = Niche::new("n", "Expense tracking", &["expense tracker", "budget manager"]);
        let prompt = analysis_prompt(&niche, &ReportConfig::default());
        assert!(prompt.contains("Niche: Expense tracking"));
        assert!(prompt.contains("keywords: expense tracker, budget manager"));
        assert!(prompt.contains("in English"));
    }

    #[test]
    fn idea_prompt_asks_for_one_idea() {
        let prompt = idea_prompt(&ReportConfig::default());
        assert!(prompt.contains("exactly *ONE* app idea"));
        assert!(prompt.contains("Write the output in English."));
    }
}
