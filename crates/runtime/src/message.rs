//! Final message layouts.  One function per report kind, each with a
//! generated and a fallback variant.

use chrono::{DateTime, Utc};

use appscout_telegram::ParseMode;

pub const RESEARCH_HEADER: &str = "📊 Play Store Market Analysis of the Day (Real Data + Gemini)";
pub const RESEARCH_FALLBACK_HEADER: &str = "📊 Play Store Market Analysis of the Day (Fallback)";
pub const ANALYSIS_HEADER: &str = "📊 *Play Store Market Analysis of the Day (Gemini)*";
pub const ANALYSIS_FALLBACK_HEADER: &str = "📊 *Play Store Market Analysis of the Day (Fallback)*";
pub const IDEA_HEADER: &str = "🧠 *App Idea of the Day (Gemini)*";
pub const IDEA_FALLBACK_HEADER: &str = "🧠 *App Idea of the Day (Fallback)*";

/// Result of the generation step: the model's text, or the reason it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Generated {
    Text(String),
    Failed(String),
}

impl Generated {
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub parse_mode: Option<ParseMode>,
    /// `false` when a fallback text stands in for generated content.
    pub generated: bool,
}

pub fn timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Real-data report.  Plain text: generated reports are not valid Markdown
/// often enough to risk a rejected message.
pub fn research_message(
    niche_label: &str,
    generated: &Generated,
    fallback_idea: &str,
    now: DateTime<Utc>,
) -> Message {
    let (header, body) = match generated {
        Generated::Text(analysis) => (RESEARCH_HEADER, analysis.clone()),
        Generated::Failed(reason) => (
            RESEARCH_FALLBACK_HEADER,
            format!("{fallback_idea}\n\n(ℹ️ Generation failed, showing a fallback idea: {reason})"),
        ),
    };
    Message {
        text: [
            header.to_string(),
            format!("Niche: {niche_label}"),
            body,
            format!("Time: {}", timestamp(now)),
        ]
        .join("\n\n"),
        parse_mode: None,
        generated: generated.is_text(),
    }
}

/// Prompt-only report.  The fallback swaps the niche for a generic label.
pub fn analysis_message(
    niche_label: &str,
    generated: &Generated,
    fallback_niche_label: &str,
    fallback_strategy: &str,
    now: DateTime<Utc>,
) -> Message {
    let (header, label, body) = match generated {
        Generated::Text(analysis) => (ANALYSIS_HEADER, niche_label, analysis.clone()),
        Generated::Failed(reason) => (
            ANALYSIS_FALLBACK_HEADER,
            fallback_niche_label,
            format!("{fallback_strategy}\n\n(Error detail: {})", escape_markdown(reason)),
        ),
    };
    Message {
        text: [
            header.to_string(),
            format!("🎯 Niche: *{}*", escape_markdown(label)),
            body,
            format!("⏰ {}", timestamp(now)),
        ]
        .join("\n\n"),
        parse_mode: Some(ParseMode::Markdown),
        generated: generated.is_text(),
    }
}

pub fn idea_message(
    generated: &Generated,
    fallback_idea: &str,
    quote: &str,
    now: DateTime<Utc>,
) -> Message {
    let (header, body) = match generated {
        Generated::Text(idea) => (IDEA_HEADER, idea.clone()),
        Generated::Failed(reason) => (
            IDEA_FALLBACK_HEADER,
            format!(
                "{fallback_idea}\n\n(ℹ️ Generation failed, showing a fallback idea: {})",
                escape_markdown(reason)
            ),
        ),
    };
    Message {
        text: [
            header.to_string(),
            body,
            format!("💬 {quote}"),
            format!("⏰ {}", timestamp(now)),
        ]
        .join("\n\n"),
        parse_mode: Some(ParseMode::Markdown),
        generated: generated.is_text(),
    }
}

/// Escape the entity characters of Telegram's legacy Markdown mode.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}
