use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::traits::PriceProvider;
use crate::errors::CoreError;

const BASE_URL: &str = "https://api.binance.com/api/v3";

/// Binance spot ticker provider. First in the fallback chain.
///
/// - **Free**: no API key for public market data.
/// - **Endpoint**: `/ticker/price?symbol={PAIR}`
/// - **Envelope**: flat `{"symbol": ..., "price": "..."}`; an unknown
///   symbol comes back as a non-2xx status, not a payload variant.
pub struct BinanceProvider {
    client: Client,
}

impl BinanceProvider {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    /// Parse the response body into a price. Public so the envelope rule
    /// is testable without a live endpoint.
    pub fn parse_body(body: &str) -> Result<f64, CoreError> {
        let resp: TickerResponse = serde_json::from_str(body).map_err(|e| CoreError::Api {
            provider: "Binance".into(),
            message: format!("Unrecognized ticker payload: {e}"),
        })?;
        resp.price.trim().parse().map_err(|e| CoreError::Api {
            provider: "Binance".into(),
            message: format!("Invalid price '{}': {e}", resp.price),
        })
    }
}

impl Default for BinanceProvider {
    fn default() -> Self {
        Self::new()
    }
}

// ── Binance API response types ──────────────────────────────────────

#[derive(Deserialize)]
struct TickerResponse {
    price: String,
}

#[async_trait]
impl PriceProvider for BinanceProvider {
    fn name(&self) -> &str {
        "Binance"
    }

    async fn fetch_quote(&self, pair: &str) -> Result<f64, CoreError> {
        let url = format!("{BASE_URL}/ticker/price?symbol={pair}");

        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(CoreError::Api {
                provider: "Binance".into(),
                message: format!("HTTP {} for {pair}", resp.status()),
            });
        }

        let body = resp.text().await?;
        Self::parse_body(&body)
    }
}
