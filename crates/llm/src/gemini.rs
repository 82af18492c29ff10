use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use appscout_config::{LlmConfig, SecretError, Secrets, mask};

use crate::{GenerationError, TextGenerator};

/// Client for the Gemini `generateContent` REST endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_base: String,
    api_key: Result<String, SecretError>,
}

impl GeminiClient {
    pub fn new(config: &LlmConfig, secrets: &Secrets) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key: secrets.gemini_api_key().map(str::to_string),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.api_base)
    }
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_deref().map(mask))
            .finish()
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError> {
        let api_key = self.api_key.clone()?;
        debug!(
            model,
            prompt_chars = prompt.chars().count(),
            key_preview = %mask(&api_key),
            "gemini: sending generateContent"
        );

        let payload = json!({
            "contents": [
                { "role": "user", "parts": [{ "text": prompt }] }
            ]
        });

        let response = self
            .client
            .post(self.endpoint(model))
            .header("x-goog-api-key", api_key)
            .json(&payload)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        let raw = response.text().await.map_err(reqwest::Error::without_url)?;
        debug!(%status, body = %raw, "gemini: response");

        if !status.is_success() {
            let message = serde_json::from_str::<serde_json::Value>(&raw)
                .ok()
                .and_then(|body| {
                    body.get("error")?
                        .get("message")?
                        .as_str()
                        .map(ToString::to_string)
                })
                .unwrap_or(raw);
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: serde_json::Value = serde_json::from_str(&raw)?;

        if let Some(reason) = body
            .get("promptFeedback")
            .and_then(|feedback| feedback.get("blockReason"))
            .and_then(|reason| reason.as_str())
        {
            return Err(GenerationError::Blocked(reason.to_string()));
        }

        extract_candidate_text(&body).ok_or(GenerationError::EmptyResponse)
    }
}

/// Joins the text parts of the first candidate.  `None` when there is no
/// non-blank text.
pub fn extract_candidate_text(body: &serde_json::Value) -> Option<String> {
    let parts = body
        .get("candidates")
        .and_then(|candidates| candidates.get(0))
        .and_then(|candidate| candidate.get("content"))
        .and_then(|content| content.get("parts"))
        .and_then(|parts| parts.as_array())?;

    let text = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(|text| text.as_str()))
        .collect::<String>();
    let text = text.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
