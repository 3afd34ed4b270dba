use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::article::{Article, TimeWindow};
use crate::embedding::EmbeddingProvider;
use crate::market::MarketDataProvider;
use crate::pipeline::{RadarPipeline, RadarResponse};
use crate::synthesis::EventSynthesizer;
use crate::TARGET_WEB_REQUEST;

/// Request payload for `/analyze`: the time window plus the acquisition
/// layer's article batch for that window.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub time_window: TimeWindow,
    pub articles: Vec<Article>,
}

/// Build the API router around a shared pipeline.
pub fn radar_router<E, M, S>(pipeline: Arc<RadarPipeline<E, M, S>>) -> Router
where
    E: EmbeddingProvider + 'static,
    M: MarketDataProvider + 'static,
    S: EventSynthesizer + 'static,
{
    Router::new()
        .route("/analyze", post(analyze::<E, M, S>))
        .route("/health", get(health_check))
        .with_state(pipeline)
}

/// Bind the listener and run the API server.
pub async fn serve<E, M, S>(pipeline: Arc<RadarPipeline<E, M, S>>, port: u16) -> Result<()>
where
    E: EmbeddingProvider + 'static,
    M: MarketDataProvider + 'static,
    S: EventSynthesizer + 'static,
{
    let app = radar_router(pipeline);
    let addr = format!("0.0.0.0:{}", port);

    let listener = TcpListener::bind(&addr).await?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}

/// Run one pipeline batch for the posted window.
async fn analyze<E, M, S>(
    State(pipeline): State<Arc<RadarPipeline<E, M, S>>>,
    Json(payload): Json<AnalyzeRequest>,
) -> Result<Json<RadarResponse>, StatusCode>
where
    E: EmbeddingProvider + 'static,
    M: MarketDataProvider + 'static,
    S: EventSynthesizer + 'static,
{
    info!(
        target: TARGET_WEB_REQUEST,
        "Analyze request with {} articles",
        payload.articles.len()
    );

    match pipeline
        .process_window(payload.articles, payload.time_window)
        .await
    {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            error!(target: TARGET_WEB_REQUEST, "Pipeline failed: {:#}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "newsradar",
        "build_timestamp": env!("BUILD_TIMESTAMP"),
        "rustc": option_env!("RUST_VERSION"),
    }))
}
