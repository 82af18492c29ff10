//! The three report pipelines.
//!
//! Each run is strictly sequential: select → (gather) → generate → assemble →
//! deliver.  Generation failures fall back to canned text; everything else
//! aborts the run.

use anyhow::{Context, Result, anyhow, bail};
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use appscout_config::{AppConfig, CatalogConfig, Niche};
use appscout_llm::TextGenerator;
use appscout_store::{ListingSource, gather_listings};
use appscout_telegram::{ChatSink, deliver};

use crate::message::{self, Generated, Message};

/// Summary of a delivered run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub niche_id: Option<String>,
    pub listings: usize,
    pub generated: bool,
    pub chunks: usize,
}

/// Collaborators of a run, borrowed for its duration.
pub struct Pipeline<'a> {
    pub config: &'a AppConfig,
    pub source: &'a dyn ListingSource,
    pub generator: &'a dyn TextGenerator,
    pub sink: &'a dyn ChatSink,
}

impl Pipeline<'_> {
    /// Real-data market report: scrape listings, then analyze them.
    pub async fn research<R: Rng + Send>(
        &self,
        requested_niche: Option<&str>,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<RunReport> {
        let niche = select_niche(&self.config.catalog, requested_niche, rng)?;
        info!(niche = %niche.id, label = %niche.label, "research: niche selected");

        let records =
            gather_listings(self.source, niche, self.config.scraper.max_listings).await;
        info!(count = records.len(), "research: listings gathered");
        if records.is_empty() {
            bail!(
                "no store listings could be gathered for niche '{}'; check the scraper",
                niche.id
            );
        }

        let prompt = appscout_prompt::research_prompt(&niche.label, &records, &self.config.report)?;
        let generated = self
            .generate(&self.config.llm.research_model, &prompt)
            .await;
        let fallback_idea = pick(&self.config.catalog.fallback_ideas, rng)?;

        let message = message::research_message(&niche.label, &generated, fallback_idea, now);
        let chunks = self.send(&message).await?;
        Ok(RunReport {
            niche_id: Some(niche.id.clone()),
            listings: records.len(),
            generated: message.generated,
            chunks,
        })
    }

    /// Prompt-only market report for a niche.
    pub async fn analysis<R: Rng + Send>(
        &self,
        requested_niche: Option<&str>,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Result<RunReport> {
        let niche = select_niche(&self.config.catalog, requested_niche, rng)?;
        info!(niche = %niche.id, label = %niche.label, "analysis: niche selected");

        let prompt = appscout_prompt::analysis_prompt(niche, &self.config.report);
        let generated = self
            .generate(&self.config.llm.analysis_model, &prompt)
            .await;

        let catalog = &self.config.catalog;
        let message = message::analysis_message(
            &niche.label,
            &generated,
            &catalog.fallback_niche_label,
            &catalog.fallback_strategy,
            now,
        );
        let chunks = self.send(&message).await?;
        Ok(RunReport {
            niche_id: Some(niche.id.clone()),
            listings: 0,
            generated: message.generated,
            chunks,
        })
    }

    /// Daily app idea with a motivation quote.
    pub async fn idea<R: Rng + Send>(&self, rng: &mut R, now: DateTime<Utc>) -> Result<RunReport> {
        let prompt = appscout_prompt::idea_prompt(&self.config.report);
        let generated = self.generate(&self.config.llm.idea_model, &prompt).await;

        let catalog = &self.config.catalog;
        let fallback_idea = pick(&catalog.fallback_ideas, rng)?;
        let quote = pick(&catalog.motivation_quotes, rng).map(String::as_str).unwrap_or_default();

        let message = message::idea_message(&generated, fallback_idea, quote, now);
        let chunks = self.send(&message).await?;
        Ok(RunReport {
            niche_id: None,
            listings: 0,
            generated: message.generated,
            chunks,
        })
    }

    /// One generation attempt.  Failures are logged and turned into
    /// [`Generated::Failed`] so the run can continue with a fallback.
    async fn generate(&self, model: &str, prompt: &str) -> Generated {
        debug!(model, prompt_chars = prompt.chars().count(), "requesting generation");
        match self.generator.generate(model, prompt).await {
            Ok(text) => {
                info!(model, chars = text.chars().count(), "generation succeeded");
                Generated::Text(text)
            }
            Err(err) => {
                warn!(model, error = %err, "generation failed; using fallback text");
                Generated::Failed(err.to_string())
            }
        }
    }

    async fn send(&self, message: &Message) -> Result<usize> {
        debug!(text = %message.text, "assembled message");
        deliver(
            self.sink,
            &message.text,
            self.config.telegram.chunk_size,
            message.parse_mode,
        )
        .await
        .context("message delivery failed")
    }
}

/// The requested niche by id, or a uniformly random one.
pub fn select_niche<'a, R: Rng + ?Sized>(
    catalog: &'a CatalogConfig,
    requested: Option<&str>,
    rng: &mut R,
) -> Result<&'a Niche> {
    match requested {
        Some(id) => catalog.niche(id).ok_or_else(|| {
            let known = catalog.niches.iter().map(|n| n.id.as_str()).collect::<Vec<_>>();
            anyhow!("unknown niche '{id}' (known: {})", known.join(", "))
        }),
        None => catalog
            .niches
            .choose(rng)
            .ok_or_else(|| anyhow!("the niche catalog is empty")),
    }
}

fn pick<'a, R: Rng + ?Sized>(items: &'a [String], rng: &mut R) -> Result<&'a String> {
    items
        .choose(rng)
        .ok_or_else(|| anyhow!("catalog list is empty"))
}
