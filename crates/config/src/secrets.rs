//! Process secrets read from the environment.
//!
//! Secrets are captured once at start and passed into the components that
//! need them.  A missing secret is only an error at the point of use, so a
//! command that never talks to Telegram does not need a bot token.

use std::env;

use thiserror::Error;

pub const TELEGRAM_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";
pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SecretError {
    #[error("{0} is not set")]
    Missing(&'static str),
    #[error("{0} is empty")]
    Empty(&'static str),
}

#[derive(Clone, Default)]
pub struct Secrets {
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,
    pub gemini_api_key: Option<String>,
}

impl Secrets {
    pub fn from_env() -> Self {
        Self {
            telegram_bot_token: env::var(TELEGRAM_BOT_TOKEN).ok(),
            telegram_chat_id: env::var(TELEGRAM_CHAT_ID).ok(),
            gemini_api_key: env::var(GEMINI_API_KEY).ok(),
        }
    }

    pub fn telegram_bot_token(&self) -> Result<&str, SecretError> {
        require(TELEGRAM_BOT_TOKEN, self.telegram_bot_token.as_deref())
    }

    pub fn telegram_chat_id(&self) -> Result<&str, SecretError> {
        require(TELEGRAM_CHAT_ID, self.telegram_chat_id.as_deref())
    }

    pub fn gemini_api_key(&self) -> Result<&str, SecretError> {
        require(GEMINI_API_KEY, self.gemini_api_key.as_deref())
    }

    /// One `(name, is_set)` row per secret, for `doctor` output.
    pub fn presence(&self) -> [(&'static str, bool); 3] {
        [
            (TELEGRAM_BOT_TOKEN, self.telegram_bot_token().is_ok()),
            (TELEGRAM_CHAT_ID, self.telegram_chat_id().is_ok()),
            (GEMINI_API_KEY, self.gemini_api_key().is_ok()),
        ]
    }
}

// Never print secret values, not even in debug builds.
impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("telegram_bot_token", &self.telegram_bot_token.as_deref().map(mask))
            .field("telegram_chat_id", &self.telegram_chat_id)
            .field("gemini_api_key", &self.gemini_api_key.as_deref().map(mask))
            .finish()
    }
}

fn require<'a>(name: &'static str, value: Option<&'a str>) -> Result<&'a str, SecretError> {
    let value = value.ok_or(SecretError::Missing(name))?;
    let value = value.trim();
    if value.is_empty() {
        return Err(SecretError::Empty(name));
    }
    Ok(value)
}

/// Short preview of a secret for debug logs: the first 8 chars and `...`.
pub fn mask(secret: &str) -> String {
    let preview: String = secret.chars().take(8).collect();
    format!("{preview}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> Secrets {
        Secrets {
            telegram_bot_token: Some("123456789:ABCDEF".to_string()),
            telegram_chat_id: Some("-1001234".to_string()),
            gemini_api_key: Some("AIzaSyExample".to_string()),
        }
    }

    #[test]
    fn present_secrets_are_returned_trimmed() {
        let mut secrets = full();
        secrets.telegram_chat_id = Some("  -1001234\n".to_string());
        assert_eq!(secrets.telegram_chat_id().unwrap(), "-1001234");
        assert_eq!(secrets.gemini_api_key().unwrap(), "AIzaSyExample");
    }

    #[test]
    fn missing_and_blank_secrets_are_distinct_errors() {
        let mut secrets = full();
        secrets.gemini_api_key = None;
        secrets.telegram_bot_token = Some("   ".to_string());
        assert_eq!(
            secrets.gemini_api_key(),
            Err(SecretError::Missing(GEMINI_API_KEY))
        );
        assert_eq!(
            secrets.telegram_bot_token(),
            Err(SecretError::Empty(TELEGRAM_BOT_TOKEN))
        );
        assert_eq!(
            SecretError::Missing(GEMINI_API_KEY).to_string(),
            "GEMINI_API_KEY is not set"
        );
    }

    #[test]
    fn presence_reports_each_secret() {
        let mut secrets = full();
        secrets.telegram_chat_id = None;
        let rows = secrets.presence();
        assert_eq!(rows[0], (TELEGRAM_BOT_TOKEN, true));
        assert_eq!(rows[1], (TELEGRAM_CHAT_ID, false));
        assert_eq!(rows[2], (GEMINI_API_KEY, true));
    }

    #[test]
    fn debug_output_masks_tokens() {
        let rendered = format!("{:?}", full());
        assert!(rendered.contains("12345678..."));
        assert!(!rendered.contains("ABCDEF"));
        assert!(!rendered.contains("AIzaSyExample"));
    }

    #[test]
    fn mask_handles_short_and_multibyte_values() {
        assert_eq!(mask("abc"), "abc...");
        assert_eq!(mask("ğüşiöçĞÜŞ"), "ğüşiöçĞÜ...");
    }
}
