use futures::future::join_all;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

use super::types::RankedCluster;
use super::{IMPACT_WEIGHT, SENTIMENT_WEIGHT, VELOCITY_NORMALIZER, VELOCITY_WEIGHT};
use crate::clustering::Cluster;
use crate::market::MarketDataProvider;
use crate::TARGET_MARKET_DATA;

/// Score clusters and sort them descending by hotness.
///
/// Market lookups for independent clusters run concurrently, each behind its
/// own deadline, and are reassembled in input order before scoring, so
/// completion order never affects the result. The sort is stable: equal
/// scores keep their input order.
///
/// # Arguments
/// * `clusters` - Clusters to score, in clustering output order
/// * `market` - Price-change source for the impact term
/// * `deadline` - Per-lookup timeout
pub async fn rank_clusters<M: MarketDataProvider>(
    clusters: Vec<Cluster>,
    market: &M,
    deadline: Duration,
) -> Vec<RankedCluster> {
    let impacts = join_all(
        clusters
            .iter()
            .map(|cluster| cluster_impact(cluster, market, deadline)),
    )
    .await;

    let mut ranked: Vec<RankedCluster> = clusters
        .into_iter()
        .zip(impacts)
        .map(|(cluster, impact)| {
            let hotness = calculate_hotness(&cluster, impact);
            debug!(
                target: TARGET_MARKET_DATA,
                "Cluster {} scored {:.3} (impact {:.4})", cluster.id, hotness, impact
            );
            RankedCluster { cluster, hotness }
        })
        .collect();

    ranked.sort_by(|a, b| b.hotness.total_cmp(&a.hotness));
    ranked
}

/// Absolute recent price change for the cluster's first-listed entity.
///
/// Any lookup problem (no entities, unknown ticker, transport error,
/// timeout) degrades to zero impact; it never aborts the batch.
async fn cluster_impact<M: MarketDataProvider>(
    cluster: &Cluster,
    market: &M,
    deadline: Duration,
) -> f64 {
    let Some(ticker) = cluster.entities.first() else {
        return 0.0;
    };

    match timeout(deadline, market.recent_change(ticker)).await {
        Ok(Ok(Some(change))) => change.abs(),
        Ok(Ok(None)) => {
            debug!(target: TARGET_MARKET_DATA, "No market data for {}", ticker);
            0.0
        }
        Ok(Err(e)) => {
            warn!(target: TARGET_MARKET_DATA, "Market lookup failed for {}: {}", ticker, e);
            0.0
        }
        Err(_) => {
            warn!(
                target: TARGET_MARKET_DATA,
                "Market lookup for {} timed out after {:?}", ticker, deadline
            );
            0.0
        }
    }
}

/// Combine publication velocity, average sentiment and market impact into a
/// bounded [0, 1] score.
///
/// Velocity is member count over the publish-time spread in hours, with the
/// spread clamped to a 1-hour floor so single-article clusters don't divide
/// by zero. Sentiment is averaged over members (missing values count as
/// neutral) and shifted from [-1, 1] into [0, 1].
pub fn calculate_hotness(cluster: &Cluster, impact: f64) -> f64 {
    if cluster.articles.is_empty() {
        return 0.0;
    }

    let span_hours = match (cluster.first_published(), cluster.last_published()) {
        (Some(first), Some(last)) => (last - first).num_seconds() as f64 / 3600.0,
        _ => 0.0,
    };
    let velocity = cluster.articles.len() as f64 / span_hours.max(1.0);

    let avg_sentiment = cluster
        .articles
        .iter()
        .map(|a| a.sentiment.unwrap_or(0.0))
        .sum::<f64>()
        / cluster.articles.len() as f64;
    let sentiment_norm = (avg_sentiment + 1.0) / 2.0;

    let hotness = VELOCITY_WEIGHT * (velocity / VELOCITY_NORMALIZER)
        + SENTIMENT_WEIGHT * sentiment_norm
        + IMPACT_WEIGHT * impact;

    hotness.min(1.0)
}
