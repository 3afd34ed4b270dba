use std::env;
use tokio::time::Duration;

/// Minimum hotness a cluster needs to be synthesized into an event.
pub const DEFAULT_HOTNESS_THRESHOLD: f64 = 0.3;

/// Maximum number of events returned for one time window.
pub const DEFAULT_TOP_K_EVENTS: usize = 10;

/// Runtime configuration for the pipeline and its providers.
///
/// All values are read from the environment with sensible defaults so the
/// binary can start with nothing but provider endpoints configured.
#[derive(Clone, Debug)]
pub struct Settings {
    pub hotness_threshold: f64,
    pub top_k_events: usize,
    pub cluster_eps: f32,
    pub cluster_min_samples: usize,
    pub embedding_model: String,
    pub embedding_api_base: Option<String>,
    pub embedding_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub ollama_host: String,
    pub ollama_port: u16,
    pub llm_model: String,
    pub llm_temperature: f32,
    pub market_api_url: String,
    pub synthesis_timeout: Duration,
    pub market_timeout: Duration,
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            hotness_threshold: DEFAULT_HOTNESS_THRESHOLD,
            top_k_events: DEFAULT_TOP_K_EVENTS,
            cluster_eps: crate::clustering::DEFAULT_EPS,
            cluster_min_samples: crate::clustering::DEFAULT_MIN_SAMPLES,
            embedding_model: "text-embedding-3-small".to_string(),
            embedding_api_base: None,
            embedding_api_key: None,
            openai_api_key: None,
            ollama_host: "http://localhost".to_string(),
            ollama_port: 11434,
            llm_model: "gpt-3.5-turbo".to_string(),
            llm_temperature: 0.0,
            market_api_url: "http://localhost:8600/quotes".to_string(),
            synthesis_timeout: Duration::from_secs(30),
            market_timeout: Duration::from_secs(10),
            port: 8080,
        }
    }
}

impl Settings {
    /// Builds the configuration from environment variables, falling back to
    /// the defaults above for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Settings::default();

        Settings {
            hotness_threshold: env::var("HOTNESS_THRESHOLD")
                .ok()
                .and_then(|v| v.parse::<f64>().ok())
                .unwrap_or(defaults.hotness_threshold),
            top_k_events: env::var("TOP_K_EVENTS")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(defaults.top_k_events),
            cluster_eps: env::var("CLUSTER_EPS")
                .ok()
                .and_then(|v| v.parse::<f32>().ok())
                .unwrap_or(defaults.cluster_eps),
            cluster_min_samples: env::var("CLUSTER_MIN_SAMPLES")
                .ok()
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(defaults.cluster_min_samples),
            embedding_model: env::var("EMBEDDING_MODEL").unwrap_or(defaults.embedding_model),
            embedding_api_base: env::var("EMBEDDING_API_BASE").ok(),
            embedding_api_key: env::var("EMBEDDING_API_KEY").ok(),
            openai_api_key: env::var("OPENAI_API_KEY").ok(),
            ollama_host: env::var("OLLAMA_HOST").unwrap_or(defaults.ollama_host),
            ollama_port: env::var("OLLAMA_PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(defaults.ollama_port),
            llm_model: env::var("LLM_MODEL").unwrap_or(defaults.llm_model),
            llm_temperature: env::var("LLM_TEMPERATURE")
                .ok()
                .and_then(|v| v.parse::<f32>().ok())
                .unwrap_or(defaults.llm_temperature),
            market_api_url: env::var("MARKET_API_URL").unwrap_or(defaults.market_api_url),
            synthesis_timeout: env::var("SYNTHESIS_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.synthesis_timeout),
            market_timeout: env::var("MARKET_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.market_timeout),
            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(defaults.port),
        }
    }
}
