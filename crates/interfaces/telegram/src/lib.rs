use std::time::Duration;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use appscout_config::{SecretError, Secrets, TelegramConfig, mask};

/// Telegram's legacy Markdown mode, the only formatting the reports use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParseMode {
    Markdown,
}

/// Destination for finished messages.
#[async_trait]
pub trait ChatSink: Send + Sync {
    /// Post one message.  Must fail on any non-success acknowledgement.
    async fn send_chunk(&self, text: &str, parse_mode: Option<ParseMode>) -> Result<()>;
}

/// Split `text` into consecutive slices of `max_chars` chars (the last one
/// may be shorter).  Concatenating the slices yields `text` again.
pub fn chunk_message(text: &str, max_chars: usize) -> Vec<&str> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut taken = 0;

    for (index, _) in text.char_indices() {
        if taken == max_chars {
            chunks.push(&text[start..index]);
            start = index;
            taken = 0;
        }
        taken += 1;
    }
    if start < text.len() {
        chunks.push(&text[start..]);
    }

    chunks
}

/// Post `text` to `sink` in order, one chunk at a time.  The first failed
/// chunk aborts the rest.  Returns the number of chunks sent.
///
/// `parse_mode` only applies when the text fits in one chunk.  A fixed-size
/// cut can split a Markdown entity, which Telegram rejects, so split
/// messages go out as plain text.
pub async fn deliver(
    sink: &dyn ChatSink,
    text: &str,
    chunk_size: usize,
    parse_mode: Option<ParseMode>,
) -> Result<usize> {
    let chunks = chunk_message(text, chunk_size);
    let total = chunks.len();
    let parse_mode = if total > 1 { None } else { parse_mode };
    debug!(chars = text.chars().count(), chunk_size, total, ?parse_mode, "delivering message");

    for (index, chunk) in chunks.into_iter().enumerate() {
        let part = index + 1;
        debug!(part, total, chars = chunk.chars().count(), "sending chunk");
        sink.send_chunk(chunk, parse_mode)
            .await
            .with_context(|| format!("delivery aborted at chunk {part}/{total}"))?;
    }

    info!(chunks = total, "message delivered");
    Ok(total)
}

/// Telegram Bot API `sendMessage` sink.
#[derive(Clone)]
pub struct TelegramBot {
    client: Client,
    api_base: String,
    token: Result<String, SecretError>,
    chat_id: Result<String, SecretError>,
}

impl TelegramBot {
    pub fn new(config: &TelegramConfig, secrets: &Secrets) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            token: secrets.telegram_bot_token().map(str::to_string),
            chat_id: secrets.telegram_chat_id().map(str::to_string),
        })
    }
}

// The token is part of every request URL; keep it out of debug output.
impl std::fmt::Debug for TelegramBot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramBot")
            .field("api_base", &self.api_base)
            .field("token", &self.token.as_deref().map(mask))
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

#[async_trait]
impl ChatSink for TelegramBot {
    async fn send_chunk(&self, text: &str, parse_mode: Option<ParseMode>) -> Result<()> {
        let token = self.token.clone()?;
        let chat_id = self.chat_id.clone()?;
        debug!(token_preview = %mask(&token), chat_id = %chat_id, "telegram: sendMessage");

        let url = format!("{}/bot{token}/sendMessage", self.api_base);
        let body = SendMessageRequest {
            chat_id: &chat_id,
            text,
            parse_mode,
            disable_web_page_preview: true,
        };

        // reqwest errors render the request URL, which embeds the token.
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let status = response.status();
        let raw = response.text().await.map_err(reqwest::Error::without_url)?;
        debug!(%status, body = %raw, "telegram: response");

        let payload: Option<TelegramResponse<serde_json::Value>> = serde_json::from_str(&raw).ok();
        if !status.is_success() {
            let description = payload
                .and_then(|payload| payload.description)
                .unwrap_or(raw);
            bail!("telegram sendMessage failed ({status}): {description}");
        }

        let Some(payload) = payload else {
            bail!("telegram sendMessage returned an unreadable acknowledgement");
        };
        if !payload.ok {
            let description = payload
                .description
                .unwrap_or_else(|| "telegram sendMessage failed".to_string());
            bail!(description);
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct TelegramResponse<T> {
    ok: bool,
    #[allow(dead_code)]
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<ParseMode>,
    disable_web_page_preview: bool,
}
