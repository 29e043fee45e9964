use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::traits::PriceProvider;
use crate::errors::CoreError;

const BASE_URL: &str = "https://api.bybit.com/v5";

/// Bybit spot ticker provider. Second in the fallback chain.
///
/// - **Endpoint**: `/market/tickers?category=spot&symbol={PAIR}`
/// - **Envelope**: `{"retCode": 0, "result": {"list": [{"lastPrice": ...}]}}`.
///   Transport success is not enough: `retCode` must be 0 AND the result
///   list non-empty, otherwise the symbol is unknown to Bybit.
pub struct BybitProvider {
    client: Client,
}

impl BybitProvider {
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    /// Parse the response body, applying Bybit's success-envelope rule.
    pub fn parse_body(body: &str) -> Result<f64, CoreError> {
        let resp: TickersResponse = serde_json::from_str(body).map_err(|e| CoreError::Api {
            provider: "Bybit".into(),
            message: format!("Unrecognized tickers payload: {e}"),
        })?;

        if resp.ret_code != 0 {
            return Err(CoreError::Api {
                provider: "Bybit".into(),
                message: format!("retCode {}", resp.ret_code),
            });
        }

        let entry = resp
            .result
            .and_then(|r| r.list.into_iter().next())
            .ok_or_else(|| CoreError::Api {
                provider: "Bybit".into(),
                message: "Empty ticker list".into(),
            })?;

        entry.last_price.trim().parse().map_err(|e| CoreError::Api {
            provider: "Bybit".into(),
            message: format!("Invalid price '{}': {e}", entry.last_price),
        })
    }
}

impl Default for BybitProvider {
    fn default() -> Self {
        Self::new()
    }
}

// ── Bybit API response types ────────────────────────────────────────

#[derive(Deserialize)]
struct TickersResponse {
    #[serde(rename = "retCode")]
    ret_code: i64,
    result: Option<TickerList>,
}

#[derive(Deserialize)]
struct TickerList {
    #[serde(default)]
    list: Vec<TickerEntry>,
}

#[derive(Deserialize)]
struct TickerEntry {
    #[serde(rename = "lastPrice")]
    last_price: String,
}

#[async_trait]
impl PriceProvider for BybitProvider {
    fn name(&self) -> &str {
        "Bybit"
    }

    async fn fetch_quote(&self, pair: &str) -> Result<f64, CoreError> {
        let url = format!("{BASE_URL}/market/tickers?category=spot&symbol={pair}");

        let resp = self.client.get(&url).send().await?;
        if !resp.status().is_success() {
            return Err(CoreError::Api {
                provider: "Bybit".into(),
                message: format!("HTTP {} for {pair}", resp.status()),
            });
        }

        let body = resp.text().await?;
        Self::parse_body(&body)
    }
}
