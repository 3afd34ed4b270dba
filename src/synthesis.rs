//! Drafting of headlines and rationales for ranked clusters.
//!
//! The LLM is asked for a strict-JSON draft; everything else about the event
//! (sources, timeline, dedup group) is assembled locally so the fallback
//! path produces structurally identical events.

use anyhow::Result;
use async_openai::types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ollama_rs::generation::completion::request::GenerationRequest;
use ollama_rs::generation::options::GenerationOptions;
use serde::Deserialize;
use tokio::time::{sleep, timeout, Duration};
use tracing::{debug, error, warn};

use crate::pipeline::{EventSource, NewsEvent, Timeline};
use crate::ranking::RankedCluster;
use crate::{LLMClient, LLMParams, TARGET_LLM_REQUEST};

/// Rationale attached to fallback events.
pub const FALLBACK_WHY_NOW: &str = "Hot event detected";

/// How many member titles the draft prompt includes.
const PROMPT_TITLES: usize = 3;

/// How many entities the draft prompt includes.
const PROMPT_ENTITIES: usize = 5;

/// Turns a ranked cluster into a publishable event.
#[async_trait]
pub trait EventSynthesizer: Send + Sync {
    async fn synthesize(&self, ranked: &RankedCluster) -> Result<NewsEvent>;
}

/// Headline/rationale pair the LLM must return.
#[derive(Debug, Deserialize)]
struct Draft {
    headline: String,
    why_now: String,
}

/// LLM-backed synthesizer, driving Ollama or an OpenAI-compatible endpoint.
pub struct LlmSynthesizer {
    params: LLMParams,
    attempt_timeout: Duration,
}

impl LlmSynthesizer {
    pub fn new(params: LLMParams, attempt_timeout: Duration) -> Self {
        LlmSynthesizer {
            params,
            attempt_timeout,
        }
    }

    fn draft_prompt(ranked: &RankedCluster) -> String {
        let titles: Vec<&str> = ranked
            .cluster
            .articles
            .iter()
            .take(PROMPT_TITLES)
            .map(|a| a.title.as_str())
            .collect();
        let entities: Vec<&str> = ranked
            .cluster
            .entities
            .iter()
            .take(PROMPT_ENTITIES)
            .map(String::as_str)
            .collect();

        format!(
            "Draft a financial news event from these reports:\n{}\nEntities: {}\n\n\
             Write an engaging headline and a one-to-two sentence explanation of why \
             this matters right now.\n\
             Reply with strict JSON: {{\"headline\": \"...\", \"why_now\": \"...\"}}",
            titles.join("\n"),
            entities.join(", ")
        )
    }

    async fn generate_once(&self, prompt: &str) -> Result<String> {
        match &self.params.llm_client {
            LLMClient::Ollama(ollama) => {
                let mut request =
                    GenerationRequest::new(self.params.model.clone(), prompt.to_string());
                request.options =
                    Some(GenerationOptions::default().temperature(self.params.temperature));

                let response = ollama
                    .generate(request)
                    .await
                    .map_err(|e| anyhow::anyhow!("Ollama generation failed: {}", e))?;
                Ok(response.response)
            }
            LLMClient::OpenAI(client) => {
                let message = ChatCompletionRequestUserMessageArgs::default()
                    .content(prompt.to_string())
                    .build()?
                    .into();
                let request = CreateChatCompletionRequestArgs::default()
                    .model(self.params.model.clone())
                    .temperature(self.params.temperature)
                    .messages([message])
                    .build()?;

                let response = client.chat().create(request).await?;
                response
                    .choices
                    .first()
                    .and_then(|choice| choice.message.content.clone())
                    .ok_or_else(|| anyhow::anyhow!("Empty completion response"))
            }
        }
    }

    /// Retry loop with exponential backoff around a single draft request.
    async fn generate(&self, prompt: &str) -> Option<String> {
        let max_retries = 3;
        let mut backoff = 2;

        for retry_count in 0..max_retries {
            debug!(
                target: TARGET_LLM_REQUEST,
                "Sending draft request (attempt {}/{})",
                retry_count + 1,
                max_retries
            );

            match timeout(self.attempt_timeout, self.generate_once(prompt)).await {
                Ok(Ok(response)) => return Some(response),
                Ok(Err(e)) => {
                    warn!(target: TARGET_LLM_REQUEST, "Error generating draft: {}", e);
                }
                Err(_) => {
                    warn!(
                        target: TARGET_LLM_REQUEST,
                        "Draft request timed out after {:?}", self.attempt_timeout
                    );
                }
            }

            if retry_count < max_retries - 1 {
                debug!(
                    target: TARGET_LLM_REQUEST,
                    "Backing off for {} seconds before retry", backoff
                );
                sleep(Duration::from_secs(backoff)).await;
                backoff *= 2;
            }
        }

        error!(
            target: TARGET_LLM_REQUEST,
            "No draft generated after {} retries", max_retries
        );
        None
    }
}

#[async_trait]
impl EventSynthesizer for LlmSynthesizer {
    async fn synthesize(&self, ranked: &RankedCluster) -> Result<NewsEvent> {
        let prompt = Self::draft_prompt(ranked);
        let response = self
            .generate(&prompt)
            .await
            .ok_or_else(|| anyhow::anyhow!("No draft generated after retries"))?;

        let draft: Draft = serde_json::from_str(extract_json(&response))
            .map_err(|e| anyhow::anyhow!("Draft response was not valid JSON: {}", e))?;

        Ok(assemble_event(ranked, draft.headline, draft.why_now))
    }
}

/// Strips chatter around the first JSON object in an LLM response.
fn extract_json(response: &str) -> &str {
    match (response.find('{'), response.rfind('}')) {
        (Some(start), Some(end)) if start < end => &response[start..=end],
        _ => response,
    }
}

/// Build the event scaffolding every synthesis path shares: sources in
/// member order, timeline from publication times, dedup group = cluster id.
pub fn assemble_event(ranked: &RankedCluster, headline: String, why_now: String) -> NewsEvent {
    let cluster = &ranked.cluster;

    let sources: Vec<EventSource> = cluster
        .articles
        .iter()
        .map(|a| EventSource {
            url: a.url.clone(),
            source_name: a.source.clone(),
            published_at: a.published_at,
            source_type: "original".to_string(),
        })
        .collect();

    let mut times: Vec<DateTime<Utc>> = cluster.articles.iter().map(|a| a.published_at).collect();
    times.sort();
    let first_mention = times.first().copied().unwrap_or_else(Utc::now);
    let last_update = times.last().copied().unwrap_or_else(Utc::now);
    let confirmation = if times.len() >= 2 { Some(times[1]) } else { None };

    let draft = serde_json::json!({
        "headline": headline.as_str(),
        "why_now": why_now.as_str(),
    });

    NewsEvent {
        headline,
        hotness: ranked.hotness,
        why_now,
        entities: cluster.entities.clone(),
        sources,
        timeline: Timeline {
            first_mention,
            confirmation,
            last_update,
        },
        draft,
        dedup_group: cluster.id.clone(),
    }
}

/// Deterministic fallback used when drafting fails, built from local data
/// only: first article's title as the headline, fixed rationale.
pub fn fallback_event(ranked: &RankedCluster) -> NewsEvent {
    let headline = ranked
        .cluster
        .articles
        .first()
        .map(|a| a.title.clone())
        .unwrap_or_else(|| "Untitled event".to_string());

    assemble_event(ranked, headline, FALLBACK_WHY_NOW.to_string())
}
