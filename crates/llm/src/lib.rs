//! Text generation: the [`TextGenerator`] seam and its Gemini implementation.

use async_trait::async_trait;
use thiserror::Error;

use appscout_config::SecretError;

mod gemini;

pub use gemini::{GeminiClient, extract_candidate_text};

#[derive(Debug, Error)]
pub enum GenerationError {
    /// The API key is missing; no request was sent.
    #[error(transparent)]
    MissingApiKey(#[from] SecretError),
    #[error("generation request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("generation API error ({status}): {message}")]
    Api { status: u16, message: String },
    #[error("prompt was blocked: {0}")]
    Blocked(String),
    #[error("unreadable generation response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("generation response contained no text")]
    EmptyResponse,
}

/// Anything that turns a prompt into free text with a single request.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, GenerationError>;
}
