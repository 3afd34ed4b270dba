//! The deduplication-and-ranking pipeline.
//!
//! One batch computation per time-window request: embed the articles,
//! cluster near-duplicates, score and rank the clusters, then synthesize
//! the hottest into events. No state survives across requests.

mod selection;
mod types;

pub use selection::select_and_synthesize;
pub use types::{EventSource, NewsEvent, RadarResponse, Timeline};

use anyhow::Result;
use std::time::Instant;
use tracing::info;

use crate::article::{Article, TimeWindow};
use crate::clustering::{cluster_articles, ClusterParams};
use crate::config::Settings;
use crate::embedding::EmbeddingProvider;
use crate::market::MarketDataProvider;
use crate::ranking::rank_clusters;
use crate::synthesis::EventSynthesizer;
use crate::TARGET_PIPELINE;

/// One-shot batch pipeline over a time window of articles.
///
/// Collaborators are constructor-injected so tests can substitute
/// deterministic stubs for every external dependency.
pub struct RadarPipeline<E, M, S> {
    embedding: E,
    market: M,
    synthesizer: S,
    settings: Settings,
}

impl<E, M, S> RadarPipeline<E, M, S>
where
    E: EmbeddingProvider,
    M: MarketDataProvider,
    S: EventSynthesizer,
{
    pub fn new(embedding: E, market: M, synthesizer: S, settings: Settings) -> Self {
        RadarPipeline {
            embedding,
            market,
            synthesizer,
            settings,
        }
    }

    /// Run the full pipeline for one window.
    ///
    /// Only an embedding/article count mismatch is fatal; market and
    /// drafting failures degrade per cluster and never abort the batch.
    pub async fn process_window(
        &self,
        articles: Vec<Article>,
        window: TimeWindow,
    ) -> Result<RadarResponse> {
        let start = Instant::now();
        info!(
            target: TARGET_PIPELINE,
            "Processing window of {} articles", articles.len()
        );

        let texts: Vec<String> = articles.iter().map(|a| a.embedding_text()).collect();
        let embeddings = if texts.is_empty() {
            Vec::new()
        } else {
            self.embedding.embed_batch(&texts).await?
        };
        if embeddings.len() != articles.len() {
            anyhow::bail!(
                "Embedding provider returned {} vectors for {} articles",
                embeddings.len(),
                articles.len()
            );
        }

        let params = ClusterParams {
            eps: self.settings.cluster_eps,
            min_samples: self.settings.cluster_min_samples,
        };
        let clusters = cluster_articles(&articles, &embeddings, params)?;

        let ranked = rank_clusters(clusters, &self.market, self.settings.market_timeout).await;

        let top_events = select_and_synthesize(
            ranked,
            &self.synthesizer,
            self.settings.top_k_events,
            self.settings.hotness_threshold,
            self.settings.synthesis_timeout,
        )
        .await;

        let processing_time = start.elapsed().as_secs_f64();
        info!(
            target: TARGET_PIPELINE,
            "Produced {} events in {:.3}s",
            top_events.len(),
            processing_time
        );

        Ok(RadarResponse {
            time_window: window,
            top_events,
            processing_time,
        })
    }
}
