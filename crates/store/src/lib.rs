//! Best-effort app store scraping.
//!
//! The store's HTML is not a stable interface.  Extraction degrades to empty
//! or absent fields when the layout changes; only transport and HTTP status
//! failures are errors.

use async_trait::async_trait;
use thiserror::Error;

pub mod extract;
mod gather;
mod play;

pub use gather::gather_listings;
pub use play::PlayStoreScraper;

/// Opaque store identifier of a listing (e.g. `com.example.app`).
pub type ListingId = String;

/// Flat record scraped from one listing's detail page.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingRecord {
    pub id: ListingId,
    /// Falls back to `id` when no name could be extracted.
    pub name: String,
    /// Empty when no description could be extracted.
    pub summary: String,
    pub rating: Option<f64>,
    /// Install-count token such as `10M+`.
    pub installs: Option<String>,
}

impl ListingRecord {
    /// A record with nothing but its id.
    pub fn bare(id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            summary: String::new(),
            rating: None,
            installs: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("store returned HTTP {status} for {url}")]
    Status { status: u16, url: String },
}

/// Search and detail surface of an app catalog.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Unique ids in first-seen order, at most `max_results`.  One request.
    async fn search(&self, keyword: &str, max_results: usize)
    -> Result<Vec<ListingId>, ScrapeError>;

    /// One request for the detail page of `id`.
    async fn fetch_details(&self, id: &str) -> Result<ListingRecord, ScrapeError>;
}
