pub mod app;
pub mod article;
pub mod clustering;
pub mod config;
pub mod embedding;
pub mod logging;
pub mod market;
pub mod pipeline;
pub mod ranking;
pub mod synthesis;

use async_openai::{config::OpenAIConfig, Client as OpenAIClient};
use ollama_rs::Ollama;

pub const TARGET_WEB_REQUEST: &str = "web_request";
pub const TARGET_LLM_REQUEST: &str = "llm_request";
pub const TARGET_MARKET_DATA: &str = "market_data";
pub const TARGET_PIPELINE: &str = "pipeline";

#[derive(Clone, Debug)]
pub enum LLMClient {
    Ollama(Ollama),
    OpenAI(OpenAIClient<OpenAIConfig>),
}

#[derive(Clone)]
pub struct LLMParams {
    pub llm_client: LLMClient,
    pub model: String,
    pub temperature: f32,
}
