//! Market impact lookups keyed by ticker symbol.
//!
//! The quote service is an external collaborator: given a symbol it returns
//! recent closing prices. "No data for this symbol" is a valid response and
//! is kept distinct from a transport failure so the two can be told apart in
//! logs; both score as zero impact downstream.

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use tokio::time::Duration;
use tracing::debug;
use url::Url;

use crate::TARGET_MARKET_DATA;

/// Per-request timeout for the quote service.
pub const QUOTE_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Source of recent price movement for a ticker symbol.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Relative price change across the two most recent closes, or `None`
    /// when the service has no usable data for the symbol.
    async fn recent_change(&self, ticker: &str) -> Result<Option<f64>>;
}

/// Quote-service response: closes ordered oldest to newest.
#[derive(Debug, Deserialize)]
struct QuoteHistory {
    symbol: String,
    closes: Vec<f64>,
}

/// HTTP-backed provider querying a quote-history endpoint.
pub struct HttpMarketDataProvider {
    client: reqwest::Client,
    base_url: String,
}

impl HttpMarketDataProvider {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(QUOTE_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(HttpMarketDataProvider {
            client,
            base_url: base_url.to_string(),
        })
    }
}

#[async_trait]
impl MarketDataProvider for HttpMarketDataProvider {
    async fn recent_change(&self, ticker: &str) -> Result<Option<f64>> {
        let url = Url::parse_with_params(&self.base_url, &[("symbol", ticker)])?;
        debug!(target: TARGET_MARKET_DATA, "Requesting quote history for {} from {}", ticker, url);

        let response = self.client.get(url).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(anyhow::anyhow!(
                "Quote service returned status {}",
                response.status()
            ));
        }

        let history: QuoteHistory = response.json().await?;
        if history.closes.len() < 2 {
            debug!(
                target: TARGET_MARKET_DATA,
                "Fewer than two closes for {}", history.symbol
            );
            return Ok(None);
        }

        let last = history.closes[history.closes.len() - 1];
        let prev = history.closes[history.closes.len() - 2];
        if prev == 0.0 {
            return Ok(None);
        }

        Ok(Some((last - prev) / prev))
    }
}
