use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::models::settings::Currency;
use crate::providers::exchange_rate::ExchangeRateClient;

/// How long a fetched rate stays fresh. Display-currency rates don't
/// move fast enough to justify hammering the free rate API.
const CACHE_TTL: Duration = Duration::from_secs(60 * 60);

struct CachedRate {
    rate: f64,
    fetched_at: Instant,
}

/// Supplies the USD-to-display-currency multiplier.
///
/// Degrades, never fails: the base currency short-circuits to 1.0, cached
/// values are served for an hour, and when the remote table is
/// unreachable a small static table of approximate rates steps in. The
/// static fallback is deliberately not cached so every later call retries
/// the network until it recovers.
pub struct CurrencyService {
    client: ExchangeRateClient,
    cache: Mutex<HashMap<Currency, CachedRate>>,
}

impl CurrencyService {
    pub fn new() -> Self {
        Self::with_client(ExchangeRateClient::new())
    }

    pub fn with_client(client: ExchangeRateClient) -> Self {
        Self {
            client,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// The USD-to-`currency` multiplier.
    pub async fn fetch_rate(&self, currency: Currency) -> f64 {
        // Base currency never touches cache or network
        if currency == Currency::Usd {
            return 1.0;
        }

        {
            let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(cached) = cache.get(&currency) {
                if cached.fetched_at.elapsed() < CACHE_TTL {
                    return cached.rate;
                }
            }
        }

        match self.client.fetch_usd_table().await {
            Ok(table) => {
                if let Some(&rate) = table.get(currency.code()) {
                    let mut cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
                    cache.insert(
                        currency,
                        CachedRate {
                            rate,
                            fetched_at: Instant::now(),
                        },
                    );
                    return rate;
                }
                warn!(currency = currency.code(), "rate table is missing currency, using static fallback");
            }
            Err(e) => {
                warn!(currency = currency.code(), error = %e, "rate fetch failed, using static fallback");
            }
        }

        let fallback = currency.fallback_rate();
        debug!(currency = currency.code(), rate = fallback, "serving static fallback rate");
        fallback
    }
}

impl Default for CurrencyService {
    fn default() -> Self {
        Self::new()
    }
}
