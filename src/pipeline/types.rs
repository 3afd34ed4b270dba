use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::article::TimeWindow;

/// Where a synthesized event was reported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSource {
    pub url: String,
    pub source_name: String,
    pub published_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub source_type: String,
}

/// Publication timeline of an event across its cluster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timeline {
    pub first_mention: DateTime<Utc>,
    /// Second independent report, when the cluster has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation: Option<DateTime<Utc>>,
    pub last_update: DateTime<Utc>,
}

/// A synthesized, ranked news event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsEvent {
    pub headline: String,
    pub hotness: f64,
    pub why_now: String,
    pub entities: Vec<String>,
    pub sources: Vec<EventSource>,
    pub timeline: Timeline,
    /// Raw drafting payload, kept for downstream editors.
    pub draft: serde_json::Value,
    /// Originating cluster id; stable for correlation across runs.
    pub dedup_group: String,
}

/// Final response returned to the calling layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RadarResponse {
    pub time_window: TimeWindow,
    pub top_events: Vec<NewsEvent>,
    /// Wall-clock processing duration in seconds.
    pub processing_time: f64,
}
