use tracing::{debug, warn};

use crate::errors::CoreError;
use crate::providers::registry::PriceProviderRegistry;

/// A price together with the name of the provider that supplied it.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuote {
    pub price: f64,
    pub source: String,
}

/// Fetches spot prices through the provider fallback chain.
///
/// A single provider's failure is never surfaced — only exhaustion of the
/// whole chain is. No retries here either: retry cadence belongs entirely
/// to the refresh loop.
pub struct PriceService {
    registry: PriceProviderRegistry,
}

impl PriceService {
    pub fn new(registry: PriceProviderRegistry) -> Self {
        Self { registry }
    }

    pub fn with_defaults() -> Self {
        Self::new(PriceProviderRegistry::with_defaults())
    }

    /// The names of all registered providers in priority order.
    pub fn provider_names(&self) -> Vec<String> {
        self.registry.names()
    }

    /// Normalize a user-entered ticker into a tradable pair: trim,
    /// uppercase, append the USDT quote suffix unless already present.
    /// Returns `None` for empty input.
    pub fn normalize_ticker(ticker: &str) -> Option<String> {
        let upper = ticker.trim().to_uppercase();
        if upper.is_empty() {
            return None;
        }
        if upper.ends_with("USDT") {
            Some(upper)
        } else {
            Some(format!("{upper}USDT"))
        }
    }

    /// Fetch a current price for a ticker, trying providers in strict
    /// priority order. First usable (finite, positive) quote wins.
    pub async fn fetch_price(&self, ticker: &str) -> Result<PriceQuote, CoreError> {
        let pair = Self::normalize_ticker(ticker).ok_or(CoreError::EmptyTicker)?;

        let mut last_error = None;
        for provider in self.registry.providers() {
            match provider.fetch_quote(&pair).await {
                Ok(price) if price.is_finite() && price > 0.0 => {
                    return Ok(PriceQuote {
                        price,
                        source: provider.name().to_string(),
                    });
                }
                Ok(price) => {
                    debug!(provider = provider.name(), %pair, price, "unusable price, trying next provider");
                    last_error = Some(CoreError::Api {
                        provider: provider.name().to_string(),
                        message: format!("Unusable price {price} for {pair}"),
                    });
                }
                Err(e) => {
                    debug!(provider = provider.name(), %pair, error = %e, "provider failed, trying next");
                    last_error = Some(e);
                }
            }
        }

        warn!(%pair, "all price providers failed");
        Err(last_error.unwrap_or(CoreError::AllProvidersFailed(pair)))
    }
}
