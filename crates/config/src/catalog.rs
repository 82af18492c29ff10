//! Static report data: the niche catalog and the canned fallback texts.
//!
//! The built-in values are only defaults.  Any of them can be replaced from
//! the `[catalog]` section of the config file (e.g. to localize the bot).

use serde::{Deserialize, Serialize};

/// A subject category used to pick store search keywords and frame a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Niche {
    pub id: String,
    pub label: String,
    /// Store search keywords, tried in order.
    pub keywords: Vec<String>,
}

impl Niche {
    pub fn new(id: &str, label: &str, keywords: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub niches: Vec<Niche>,
    /// Shown in place of a generated idea or report when generation fails.
    pub fallback_ideas: Vec<String>,
    /// One of these closes every `idea` message.
    pub motivation_quotes: Vec<String>,
    /// Body of the `analysis` message when generation fails.
    pub fallback_strategy: String,
    /// Niche line used by the `analysis` fallback message.
    pub fallback_niche_label: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            niches: default_niches(),
            fallback_ideas: strings(&[
                "📚 Exam study tracker: daily targets, streak-based stats and a tiny reminder notification.",
                "💸 Spend-vs-save coach: one question a day (\"should I buy this or not?\") that nudges you towards a savings goal.",
                "🍎 Daily calories + steps, but as an ultra-plain single screen that just says \"do it\" or \"skip it\".",
                "📈 Minimal market dashboard: today's 3 most important stock/crypto headlines plus one chart.",
                "🧠 Micro quiz app: three questions a day with solution and a short note, done in five minutes.",
            ]),
            motivation_quotes: strings(&[
                "The small step you take today is a rehearsal for tomorrow's big leap. 🚀",
                "It doesn't have to be perfect, just move one notch forward today. 💪",
                "You never run out of ideas, you only run out of the patience to write them down. 😊",
                "Small but consistent projects change lives. 🔁",
                "Every app starts with \"what if there were something that...\". ✨",
            ]),
            fallback_strategy: "No detailed analysis today, but the general playbook still holds:\n\
                • Keep it simple\n\
                • Pick a clear target audience\n\
                • Listen to store reviews and iterate fast."
                .to_string(),
            fallback_niche_label: "General app market".to_string(),
        }
    }
}

impl CatalogConfig {
    pub fn niche(&self, id: &str) -> Option<&Niche> {
        self.niches.iter().find(|niche| niche.id == id)
    }
}

fn default_niches() -> Vec<Niche> {
    vec![
        Niche::new(
            "exam_calculator",
            "Exam grade calculator (high school / civil service / university)",
            &["exam grade calculator", "not hesaplama", "sinav ortalama hesaplama"],
        ),
        Niche::new(
            "habit_tracker_students",
            "Habit tracker for students",
            &["habit tracker", "study habit tracker", "öğrenci çalışma takibi"],
        ),
        Niche::new(
            "study_planner",
            "Study planner / Pomodoro",
            &["study planner", "pomodoro study timer", "ders çalışma planı"],
        ),
        Niche::new(
            "personal_finance",
            "Personal budget / expense tracking",
            &["expense tracker", "budget manager", "harcama takip"],
        ),
        Niche::new(
            "market_prices",
            "Grocery and market price tracking",
            &["grocery price tracker", "market prices", "fiyat karşılaştırma"],
        ),
    ]
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}
