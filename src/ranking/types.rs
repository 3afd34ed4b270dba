use serde::{Deserialize, Serialize};

use crate::clustering::Cluster;

/// A cluster together with its newsworthiness score.
///
/// Immutable; the score is the ordering key for the pipeline output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedCluster {
    pub cluster: Cluster,
    /// Hotness in [0, 1].
    pub hotness: f64,
}
