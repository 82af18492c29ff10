use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub mod catalog;
pub mod secrets;

pub use catalog::{CatalogConfig, Niche};
pub use secrets::{SecretError, Secrets, mask};

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL of the Gemini REST API.
    pub api_base: String,
    /// Model for the real-data `research` report.
    pub research_model: String,
    /// Model for the prompt-only `analysis` report.
    pub analysis_model: String,
    /// Model for the daily `idea` message.
    pub idea_model: String,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com".to_string(),
            research_model: "gemini-2.5-flash".to_string(),
            analysis_model: "gemini-2.5-flash".to_string(),
            idea_model: "gemini-2.5-pro".to_string(),
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub search_url: String,
    pub detail_url: String,
    /// `hl` query parameter.
    pub language: String,
    /// `gl` query parameter.
    pub region: String,
    pub user_agent: String,
    pub accept_language: String,
    pub timeout_secs: u64,
    /// Upper bound on listings gathered per run.
    pub max_listings: usize,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            search_url: "https://play.google.com/store/search".to_string(),
            detail_url: "https://play.google.com/store/apps/details".to_string(),
            language: "en".to_string(),
            region: "us".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
                .to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            timeout_secs: 20,
            max_listings: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Language the generated text is requested in.
    pub language: String,
    /// Per-listing summary cap inside the research prompt (chars).
    pub summary_max_chars: usize,
    /// Cap on the whole rendered listing block (chars).
    pub listings_max_chars: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            language: "English".to_string(),
            summary_max_chars: 220,
            listings_max_chars: 2500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub api_base: String,
    /// Chunk size in chars; Telegram rejects messages over 4096.
    pub chunk_size: usize,
    pub timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.telegram.org".to_string(),
            chunk_size: 3500,
            timeout_secs: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub log_level: String,
    /// Forces the `debug` level regardless of `log_level` and `RUST_LOG`.
    pub debug: bool,
    /// When set, logs are mirrored to this file.
    pub log_file: Option<String>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            debug: false,
            log_file: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LlmConfig,
    pub scraper: ScraperConfig,
    pub report: ReportConfig,
    pub telegram: TelegramConfig,
    pub telemetry: TelemetryConfig,
    pub catalog: CatalogConfig,
}

impl AppConfig {
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = Self::default();
        if let Ok(raw) = fs::read_to_string(path) {
            config = toml::from_str(&raw)
                .with_context(|| format!("invalid config file {}", path.display()))?;
        }

        config.apply_env_overrides(|name| env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides.  `lookup` is `std::env::var` in production.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // One env var pins every command to the same model (handy for quota issues).
        if let Some(model) = lookup("GEMINI_MODEL") {
            let model = model.trim();
            if !model.is_empty() {
                self.llm.research_model = model.to_string();
                self.llm.analysis_model = model.to_string();
                self.llm.idea_model = model.to_string();
            }
        }

        if let Some(flag) = lookup("APPSCOUT_DEBUG") {
            if matches!(flag.trim(), "1" | "true" | "yes") {
                self.telemetry.debug = true;
            }
        }
    }

    /// Reject values that would make a run meaningless rather than failing
    /// half-way through it.
    pub fn validate(&self) -> Result<()> {
        if self.telegram.chunk_size == 0 {
            anyhow::bail!("telegram.chunk_size must be greater than zero");
        }
        if self.telegram.chunk_size > 4096 {
            anyhow::bail!(
                "telegram.chunk_size {} exceeds the 4096 char message limit",
                self.telegram.chunk_size
            );
        }
        if self.scraper.max_listings == 0 {
            anyhow::bail!("scraper.max_listings must be greater than zero");
        }
        if self.catalog.niches.is_empty() {
            anyhow::bail!("catalog.niches must contain at least one niche");
        }
        if self.catalog.fallback_ideas.is_empty() {
            anyhow::bail!("catalog.fallback_ideas must not be empty");
        }
        Ok(())
    }

    /// Filter directive for the tracing subscriber: debug wins, then `log_level`.
    pub fn log_filter(&self) -> &str {
        if self.telemetry.debug {
            "debug"
        } else {
            &self.telemetry.log_level
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
