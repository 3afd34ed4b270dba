//! Boundary types delivered by the acquisition layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Number of body characters fed into the embedding input.
pub const EMBEDDING_BODY_CHARS: usize = 200;

fn default_window_hours() -> i64 {
    24
}

/// The time range bounding which articles are considered for one run.
///
/// Carried through to the response unchanged; the pipeline never recomputes
/// membership from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeWindow {
    #[serde(default = "default_window_hours")]
    pub hours: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
}

impl Default for TimeWindow {
    fn default() -> Self {
        TimeWindow {
            hours: default_window_hours(),
            start_time: None,
            end_time: None,
        }
    }
}

/// A single financial news article.
///
/// Immutable once produced by acquisition. Entity and sentiment extraction
/// happen upstream; the pipeline only consumes their outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    /// Source-provided identifier, if any. See [`Article::identity`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub summary: String,
    pub published_at: DateTime<Utc>,
    pub url: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default)]
    pub entities: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Article {
    /// Stable identity for this article.
    ///
    /// Uses the source-provided id when present, otherwise a content hash
    /// over url, title and publication time.
    pub fn identity(&self) -> String {
        if let Some(id) = &self.id {
            if !id.is_empty() {
                return id.clone();
            }
        }

        let mut hasher = Sha256::new();
        hasher.update(self.url.as_bytes());
        hasher.update(self.title.as_bytes());
        hasher.update(self.published_at.to_rfc3339().as_bytes());
        let digest = hasher.finalize();
        digest.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Text handed to the embedding provider: title, summary and the start
    /// of the body.
    pub fn embedding_text(&self) -> String {
        let body: String = self.content.chars().take(EMBEDDING_BODY_CHARS).collect();
        format!("{} {} {}", self.title, self.summary, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn article(id: Option<&str>) -> Article {
        Article {
            id: id.map(String::from),
            title: "Fed raises rates".to_string(),
            content: "The Federal Reserve raised interest rates today.".to_string(),
            summary: "Rate hike".to_string(),
            published_at: Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap(),
            url: "https://example.com/fed".to_string(),
            source: "Example Wire".to_string(),
            language: Some("en".to_string()),
            entities: vec!["FED".to_string()],
            sentiment: Some(-0.2),
            category: None,
        }
    }

    #[test]
    fn identity_prefers_source_id() {
        assert_eq!(article(Some("abc-123")).identity(), "abc-123");
    }

    #[test]
    fn identity_falls_back_to_stable_content_hash() {
        let first = article(None).identity();
        let second = article(None).identity();
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);

        let mut other = article(None);
        other.url = "https://example.com/other".to_string();
        assert_ne!(first, other.identity());
    }

    #[test]
    fn empty_source_id_is_treated_as_missing() {
        assert_eq!(article(Some("")).identity(), article(None).identity());
    }

    #[test]
    fn embedding_text_truncates_long_bodies() {
        let mut long = article(None);
        long.content = "x".repeat(1000);
        let text = long.embedding_text();
        assert!(text.len() < 1000);
        assert!(text.starts_with("Fed raises rates"));
    }
}
