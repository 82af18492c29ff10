use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use tracing::debug;
use url::Url;

use appscout_config::ScraperConfig;

use crate::{ListingId, ListingRecord, ListingSource, ScrapeError, extract};

/// Google Play web storefront, scraped with a desktop browser profile.
#[derive(Debug, Clone)]
pub struct PlayStoreScraper {
    client: reqwest::Client,
    search_url: Url,
    detail_url: Url,
    language: String,
    region: String,
}

impl PlayStoreScraper {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language)?,
        );
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()?;

        let search_url = Url::parse(&config.search_url)
            .with_context(|| format!("invalid scraper.search_url '{}'", config.search_url))?;
        let detail_url = Url::parse(&config.detail_url)
            .with_context(|| format!("invalid scraper.detail_url '{}'", config.detail_url))?;

        Ok(Self {
            client,
            search_url,
            detail_url,
            language: config.language.clone(),
            region: config.region.clone(),
        })
    }

    async fn get_page(&self, url: &Url, query: &[(&str, &str)]) -> Result<String, ScrapeError> {
        let response = self.client.get(url.clone()).query(query).send().await?;
        let status = response.status();
        debug!(url = %url, %status, "store: response");
        if !status.is_success() {
            return Err(ScrapeError::Status {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl ListingSource for PlayStoreScraper {
    async fn search(
        &self,
        keyword: &str,
        max_results: usize,
    ) -> Result<Vec<ListingId>, ScrapeError> {
        debug!(keyword, "store: search");
        let query = [
            ("q", keyword),
            ("c", "apps"),
            ("hl", self.language.as_str()),
            ("gl", self.region.as_str()),
        ];
        let html = self.get_page(&self.search_url, &query).await?;
        let ids = extract::listing_ids(&html, &self.search_url, max_results);
        debug!(keyword, found = ids.len(), ids = ?ids, "store: search results");
        Ok(ids)
    }

    async fn fetch_details(&self, id: &str) -> Result<ListingRecord, ScrapeError> {
        debug!(id, "store: fetching details");
        let query = [
            ("id", id),
            ("hl", self.language.as_str()),
            ("gl", self.region.as_str()),
        ];
        let html = self.get_page(&self.detail_url, &query).await?;
        let record = extract::listing_record(&html, id);
        debug!(
            id,
            name = %record.name,
            rating = ?record.rating,
            installs = ?record.installs,
            has_summary = !record.summary.is_empty(),
            "store: details extracted"
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    /// Accept one connection, read the request head, answer with `status`
    /// and an HTML `body`.  Returns the base URL.
    async fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 4096];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();
        });
        format!("http://{addr}")
    }

    fn scraper_at(base: &str) -> PlayStoreScraper {
        let config = ScraperConfig {
            search_url: format!("{base}/store/search"),
            detail_url: format!("{base}/store/apps/details"),
            timeout_secs: 5,
            ..ScraperConfig::default()
        };
        PlayStoreScraper::new(&config).unwrap()
    }

    #[test]
    fn builds_from_default_config() {
        let scraper = PlayStoreScraper::new(&ScraperConfig::default()).unwrap();
        assert_eq!(scraper.language, "en");
        assert_eq!(scraper.region, "us");
        assert_eq!(scraper.search_url.path(), "/store/search");
    }

    #[test]
    fn rejects_header_values_with_newlines() {
        let config = ScraperConfig {
            accept_language: "en\r\nX-Injected: 1".to_string(),
            ..ScraperConfig::default()
        };
        assert!(PlayStoreScraper::new(&config).is_err());
    }

    #[test]
    fn rejects_unparsable_urls() {
        let config = ScraperConfig {
            search_url: "play.google.com/store/search".to_string(),
            ..ScraperConfig::default()
        };
        let err = PlayStoreScraper::new(&config).unwrap_err();
        assert!(err.to_string().contains("scraper.search_url"));

        let config = ScraperConfig {
            detail_url: "::".to_string(),
            ..ScraperConfig::default()
        };
        assert!(PlayStoreScraper::new(&config).is_err());
    }

    #[tokio::test]
    async fn unreachable_store_is_a_transport_error() {
        let config = ScraperConfig {
            search_url: "http://127.0.0.1:9/store/search".to_string(),
            timeout_secs: 2,
            ..ScraperConfig::default()
        };
        let scraper = PlayStoreScraper::new(&config).unwrap();
        let err = scraper.search("study planner", 5).await.unwrap_err();
        assert!(matches!(err, ScrapeError::Transport(_)), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn error_status_on_search_is_reported() {
        let base = serve_once("500 Internal Server Error", "<html>oops</html>").await;
        let err = scraper_at(&base).search("study planner", 5).await.unwrap_err();
        match err {
            ScrapeError::Status { status, url } => {
                assert_eq!(status, 500);
                assert!(url.contains("q=study+planner"), "unexpected url: {url}");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn error_status_on_details_is_reported() {
        let base = serve_once("404 Not Found", "").await;
        let err = scraper_at(&base).fetch_details("com.gone").await.unwrap_err();
        assert!(matches!(err, ScrapeError::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn search_results_are_extracted_from_the_page() {
        let base = serve_once(
            "200 OK",
            r#"<html><body>
                <a href="/store/apps/details?id=com.focus">Focus</a>
                <a href="/store/apps/details?id=com.focus&amp;pcampaignid=x">Focus again</a>
                <a href="/store/apps/details?id=org.plan">Plan</a>
            </body></html>"#,
        )
        .await;
        let ids = scraper_at(&base).search("study planner", 5).await.unwrap();
        assert_eq!(ids, vec!["com.focus", "org.plan"]);
    }
}
