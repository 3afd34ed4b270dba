use futures::future::join_all;
use tokio::time::{timeout, Duration};
use tracing::{debug, warn};

use super::types::NewsEvent;
use crate::ranking::RankedCluster;
use crate::synthesis::{fallback_event, EventSynthesizer};
use crate::TARGET_PIPELINE;

/// Apply the hotness threshold and top-K cap, then synthesize the survivors.
///
/// Synthesis calls run concurrently, each behind its own deadline, and are
/// reassembled in rank order. A failed or timed-out draft is replaced by the
/// deterministic fallback event; one failure never aborts the rest. Clusters
/// below the threshold are dropped silently (expected filtering).
///
/// # Arguments
/// * `ranked` - Clusters sorted descending by hotness
/// * `synthesizer` - Drafting collaborator
/// * `top_k` - Cap on events produced
/// * `hotness_threshold` - Minimum hotness for synthesis
/// * `deadline` - Per-call synthesis timeout
pub async fn select_and_synthesize<S: EventSynthesizer>(
    ranked: Vec<RankedCluster>,
    synthesizer: &S,
    top_k: usize,
    hotness_threshold: f64,
    deadline: Duration,
) -> Vec<NewsEvent> {
    let survivors: Vec<RankedCluster> = ranked
        .into_iter()
        .take(top_k)
        .filter(|rc| {
            if rc.hotness >= hotness_threshold {
                true
            } else {
                debug!(
                    target: TARGET_PIPELINE,
                    "Dropping cluster {} below hotness threshold ({:.3} < {:.3})",
                    rc.cluster.id,
                    rc.hotness,
                    hotness_threshold
                );
                false
            }
        })
        .collect();

    join_all(
        survivors
            .iter()
            .map(|rc| synthesize_one(rc, synthesizer, deadline)),
    )
    .await
}

/// Synthesize a single cluster behind its own deadline.
async fn synthesize_one<S: EventSynthesizer>(
    ranked: &RankedCluster,
    synthesizer: &S,
    deadline: Duration,
) -> NewsEvent {
    match timeout(deadline, synthesizer.synthesize(ranked)).await {
        Ok(Ok(event)) => event,
        Ok(Err(e)) => {
            warn!(
                target: TARGET_PIPELINE,
                "Synthesis failed for cluster {}: {}; using fallback", ranked.cluster.id, e
            );
            fallback_event(ranked)
        }
        Err(_) => {
            warn!(
                target: TARGET_PIPELINE,
                "Synthesis for cluster {} timed out after {:?}; using fallback",
                ranked.cluster.id,
                deadline
            );
            fallback_event(ranked)
        }
    }
}
