use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::traits::PriceProvider;
use crate::errors::CoreError;

const BASE_URL: &str = "https://api.gateio.ws/api/v4";

/// Gate.io spot ticker provider. Last in the fallback chain.
///
/// - **Endpoint**: `/spot/tickers?currency_pair={PAIR}`
/// - **Pair format**: underscore-separated (`BTC_USDT`), unlike the other
///   exchanges, so the normalized pair is rewritten before the request.
/// - **Envelope**: a bare JSON array; success = non-empty array whose
///   first element carries a parseable `last` price.
pub struct GateIoProvider {
    client: Client,
}

impl GateIoProvider {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    /// Rewrite a concatenated pair ("BTCUSDT") into Gate.io's underscore
    /// form ("BTC_USDT"). Pairs already containing an underscore pass
    /// through untouched.
    pub fn currency_pair(pair: &str) -> String {
        if !pair.contains('_') && pair.len() > 4 {
            if let Some(base) = pair.strip_suffix("USDT") {
                return format!("{base}_USDT");
            }
        }
        pair.to_string()
    }

    /// Parse the response body, applying Gate.io's non-empty-array rule.
    pub fn parse_body(body: &str) -> Result<f64, CoreError> {
        let tickers: Vec<SpotTicker> = serde_json::from_str(body).map_err(|e| CoreError::Api {
            provider: "Gate.io".into(),
            message: format!("Unrecognized tickers payload: {e}"),
        })?;

        let first = tickers.into_iter().next().ok_or_else(|| CoreError::Api {
            provider: "Gate.io".into(),
            message: "Empty ticker list".into(),
        })?;

        first.last.trim().parse().map_err(|e| CoreError::Api {
            provider: "Gate.io".into(),
            message: format!("Invalid price '{}': {e}", first.last),
        })
    }
}

impl Default for GateIoProvider {
    fn default() -> Self {
        Self::new()
    }
}

// ── Gate.io API response types ──────────────────────────────────────

#[derive(Deserialize)]
struct SpotTicker {
    last: String,
}

#[async_trait]
impl PriceProvider for GateIoProvider {
    fn name(&self) -> &str {
        "Gate.io"
    }

    async fn fetch_quote(&self, pair: &str) -> Result<f64, CoreError> {
        let gate_pair = Self::currency_pair(pair);
        let url = format!("{BASE_URL}/spot/tickers?currency_pair={gate_pair}");

        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(CoreError::Api {
                provider: "Gate.io".into(),
                message: format!("HTTP {} for {gate_pair}", resp.status()),
            });
        }

        let body = resp.text().await?;
        Self::parse_body(&body)
    }
}
