use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::CoreError;

const BASE_URL: &str = "https://api.exchangerate-api.com/v4";

/// Client for the remote USD exchange-rate table.
///
/// One endpoint, one shape: `/latest/USD` returns a table of USD-to-X
/// multipliers keyed by currency code. Caching and fallback live in
/// `CurrencyService`; this type only does the network call.
pub struct ExchangeRateClient {
    client: Client,
    base_url: String,
}

impl ExchangeRateClient {
    pub fn new() -> Self {
        Self::with_base_url(BASE_URL)
    }

    /// Point the client at a different host. Used by tests to exercise
    /// the unreachable-remote path deterministically.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: base_url.into(),
        }
    }

    /// Fetch the full USD rate table.
    pub async fn fetch_usd_table(&self) -> Result<HashMap<String, f64>, CoreError> {
        let url = format!("{}/latest/USD", self.base_url);

        let resp: RatesResponse = self
            .client
            .get(&url)
            .send()
            .await?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "ExchangeRate-API".into(),
                message: format!("Failed to parse rate table: {e}"),
            })?;

        Ok(resp.rates)
    }
}

impl Default for ExchangeRateClient {
    fn default() -> Self {
        Self::new()
    }
}

// ── ExchangeRate-API response types ─────────────────────────────────

#[derive(Deserialize)]
struct RatesResponse {
    rates: HashMap<String, f64>,
}
