use tracing::{debug, info, warn};

use appscout_config::Niche;

use crate::{ListingRecord, ListingSource};

/// Collect up to `max` listing records for `niche`.
///
/// Keywords are tried in order.  A failed or empty search moves on to the
/// next keyword; failed detail fetches are logged and skipped.  The first
/// keyword that yields at least one record ends the search.  Nothing is
/// retried.
pub async fn gather_listings(
    source: &dyn ListingSource,
    niche: &Niche,
    max: usize,
) -> Vec<ListingRecord> {
    let mut records = Vec::new();

    for keyword in &niche.keywords {
        let ids = match source.search(keyword, max).await {
            Ok(ids) => ids,
            Err(err) => {
                warn!(niche = %niche.id, keyword = %keyword, error = %err, "search failed; trying next keyword");
                continue;
            }
        };
        if ids.is_empty() {
            debug!(niche = %niche.id, keyword = %keyword, "search returned no listings");
            continue;
        }

        for id in ids.iter().take(max) {
            match source.fetch_details(id).await {
                Ok(record) => records.push(record),
                Err(err) => warn!(id = %id, error = %err, "detail fetch failed; skipping listing"),
            }
        }

        if !records.is_empty() {
            info!(niche = %niche.id, keyword = %keyword, count = records.len(), "listings gathered");
            break;
        }
    }

    records
}
