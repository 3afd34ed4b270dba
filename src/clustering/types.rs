use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::article::Article;

/// A group of articles judged to report the same underlying event.
///
/// Never mutated after creation. Member order is acquisition order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    /// Stable label: `cluster_<n>` for dense groups in discovery order,
    /// `singleton_<idx>` for unmatched articles by input position.
    pub id: String,
    pub articles: Vec<Article>,
    /// Union of member entities, first-seen order, duplicates removed.
    pub entities: Vec<String>,
}

impl Cluster {
    pub fn size(&self) -> usize {
        self.articles.len()
    }

    /// Earliest publication time among members.
    pub fn first_published(&self) -> Option<DateTime<Utc>> {
        self.articles.iter().map(|a| a.published_at).min()
    }

    /// Latest publication time among members.
    pub fn last_published(&self) -> Option<DateTime<Utc>> {
        self.articles.iter().map(|a| a.published_at).max()
    }
}
