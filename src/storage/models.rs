//! Data models for storage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A saved meeting summary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    /// Unique identifier (UUID)
    pub id: String,

    /// Meeting text that was summarized
    pub original_text: String,

    /// Instruction the summary was generated with
    pub custom_prompt: String,

    /// Text produced by the provider or the fallback
    pub generated_summary: String,

    /// User's edited version, if any
    pub edited_summary: Option<String>,

    /// User-provided title
    pub title: String,

    /// Tags for categorization
    pub tags: Vec<String>,

    /// Whether the summary has been emailed at least once
    pub is_shared: bool,

    /// Every address the summary was sent to
    pub shared_with: Vec<ShareRecord>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Summary {
    /// Create a new summary record
    pub fn new(
        title: String,
        original_text: String,
        custom_prompt: String,
        generated_summary: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            original_text,
            custom_prompt,
            generated_summary,
            edited_summary: None,
            title,
            tags: Vec::new(),
            is_shared: false,
            shared_with: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Set tags, dropping blank entries
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = clean_tags(tags);
        self
    }

    /// The edited text when present, otherwise the generated text
    pub fn final_summary(&self) -> &str {
        self.edited_summary
            .as_deref()
            .unwrap_or(&self.generated_summary)
    }

    /// Number of distinct recipient addresses
    pub fn unique_recipients(&self) -> usize {
        let mut emails: Vec<&str> = self.shared_with.iter().map(|s| s.email.as_str()).collect();
        emails.sort_unstable();
        emails.dedup();
        emails.len()
    }
}

/// Drop tags that are empty after trimming
pub fn clean_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .filter(|tag| !tag.trim().is_empty())
        .collect()
}

/// One delivery of a summary to one address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRecord {
    pub email: String,
    pub shared_at: DateTime<Utc>,
}

/// Lightweight row for history listings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryListItem {
    pub id: String,
    pub title: String,
    pub tags: Vec<String>,
    pub is_shared: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Changes applied when a user edits a summary
#[derive(Debug, Clone, Default)]
pub struct SummaryEdit {
    pub edited_summary: String,
    pub title: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Sharing totals across all summaries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShareTotals {
    pub total_summaries: usize,
    pub shared_summaries: usize,
    pub total_shares: usize,
    pub unique_recipients: usize,
}

impl ShareTotals {
    pub fn unshared_summaries(&self) -> usize {
        self.total_summaries - self.shared_summaries
    }

    /// Percentage of summaries shared, rounded to one decimal
    pub fn share_rate(&self) -> f64 {
        if self.total_summaries == 0 {
            return 0.0;
        }
        round_one(self.shared_summaries as f64 * 100.0 / self.total_summaries as f64)
    }

    /// Mean deliveries per shared summary, rounded to one decimal
    pub fn average_shares_per_summary(&self) -> f64 {
        if self.shared_summaries == 0 {
            return 0.0;
        }
        round_one(self.total_shares as f64 / self.shared_summaries as f64)
    }
}

fn round_one(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn final_summary_prefers_edit() {
        let mut summary = Summary::new(
            "Standup".to_string(),
            "text".to_string(),
            "prompt".to_string(),
            "generated".to_string(),
        );
        assert_eq!(summary.final_summary(), "generated");

        summary.edited_summary = Some("edited".to_string());
        assert_eq!(summary.final_summary(), "edited");
    }

    #[test]
    fn blank_tags_are_dropped() {
        let summary = Summary::new(String::new(), String::new(), String::new(), String::new())
            .with_tags(vec!["q3".to_string(), "  ".to_string(), String::new()]);
        assert_eq!(summary.tags, vec!["q3".to_string()]);
    }

    #[test]
    fn totals_compute_rates() {
        let totals = ShareTotals {
            total_summaries: 3,
            shared_summaries: 2,
            total_shares: 5,
            unique_recipients: 4,
        };
        assert_eq!(totals.unshared_summaries(), 1);
        assert_eq!(totals.share_rate(), 66.7);
        assert_eq!(totals.average_shares_per_summary(), 2.5);
        assert_eq!(ShareTotals::default().share_rate(), 0.0);
    }

    #[test]
    fn serializes_camel_case() {
        let summary = Summary::new(
            "Standup".to_string(),
            "text".to_string(),
            "prompt".to_string(),
            "generated".to_string(),
        );
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["generatedSummary"], "generated");
        assert_eq!(json["isShared"], false);
    }
}
