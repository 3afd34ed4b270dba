//! Batch embedding lookups for article text.
//!
//! Embedding computation is an external collaborator; the pipeline makes one
//! call per article batch and requires the result to be index-aligned.

use anyhow::Result;
use async_openai::types::CreateEmbeddingRequestArgs;
use async_openai::{config::OpenAIConfig, Client};
use async_trait::async_trait;
use tracing::debug;

use crate::TARGET_LLM_REQUEST;

/// Computes one embedding vector per input text, index-aligned.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Provider backed by an OpenAI-compatible embeddings endpoint.
pub struct OpenAiEmbeddingProvider {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiEmbeddingProvider {
    pub fn new(api_key: &str, api_base: Option<&str>, model: &str) -> Self {
        let mut config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(base) = api_base {
            config = config.with_api_base(base);
        }

        OpenAiEmbeddingProvider {
            client: Client::with_config(config),
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        debug!(
            target: TARGET_LLM_REQUEST,
            "Requesting {} embeddings from {}",
            texts.len(),
            self.model
        );

        let request = CreateEmbeddingRequestArgs::default()
            .model(self.model.clone())
            .input(texts.to_vec())
            .build()?;

        let response = self.client.embeddings().create(request).await?;

        // The API reports each vector's position explicitly; place by index
        // rather than trusting response order.
        let mut vectors = vec![Vec::new(); texts.len()];
        for item in response.data {
            let index = item.index as usize;
            if index >= vectors.len() {
                return Err(anyhow::anyhow!(
                    "Embedding index {} out of range for batch of {}",
                    index,
                    texts.len()
                ));
            }
            vectors[index] = item.embedding;
        }

        Ok(vectors)
    }
}
