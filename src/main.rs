use std::sync::Arc;

use anyhow::Result;
use async_openai::{config::OpenAIConfig, Client as OpenAIClient};
use ollama_rs::Ollama;
use tracing::info;

use newsradar::app::serve;
use newsradar::config::Settings;
use newsradar::embedding::OpenAiEmbeddingProvider;
use newsradar::logging::configure_logging;
use newsradar::market::HttpMarketDataProvider;
use newsradar::pipeline::RadarPipeline;
use newsradar::synthesis::LlmSynthesizer;
use newsradar::{LLMClient, LLMParams};

#[tokio::main]
async fn main() -> Result<()> {
    configure_logging();

    let settings = Settings::from_env();
    info!(
        "Starting newsradar: hotness threshold {}, top_k {}, clustering eps {} / min_samples {}",
        settings.hotness_threshold,
        settings.top_k_events,
        settings.cluster_eps,
        settings.cluster_min_samples
    );

    let llm_client = build_llm_client(&settings);
    let synthesizer = LlmSynthesizer::new(
        LLMParams {
            llm_client,
            model: settings.llm_model.clone(),
            temperature: settings.llm_temperature,
        },
        settings.synthesis_timeout,
    );

    let embedding_key = settings
        .embedding_api_key
        .clone()
        .or_else(|| settings.openai_api_key.clone())
        .unwrap_or_default();
    let embedding = OpenAiEmbeddingProvider::new(
        &embedding_key,
        settings.embedding_api_base.as_deref(),
        &settings.embedding_model,
    );

    let market = HttpMarketDataProvider::new(&settings.market_api_url)?;

    let port = settings.port;
    let pipeline = Arc::new(RadarPipeline::new(embedding, market, synthesizer, settings));

    serve(pipeline, port).await
}

fn build_llm_client(settings: &Settings) -> LLMClient {
    match &settings.openai_api_key {
        Some(api_key) => {
            info!("Using OpenAI-compatible endpoint for drafting");
            let config = OpenAIConfig::new().with_api_key(api_key);
            LLMClient::OpenAI(OpenAIClient::with_config(config))
        }
        None => {
            info!(
                "Connecting to Ollama at {}:{}",
                settings.ollama_host, settings.ollama_port
            );
            LLMClient::Ollama(Ollama::new(settings.ollama_host.clone(), settings.ollama_port))
        }
    }
}
