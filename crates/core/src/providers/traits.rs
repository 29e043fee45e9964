use async_trait::async_trait;

use crate::errors::CoreError;

/// Trait abstraction for spot price providers.
///
/// Each exchange API (Binance, Bybit, Gate.io) implements this trait with
/// its own request shape and success envelope. If an API stops working or
/// changes, we replace only that one implementation — the fallback chain
/// and the rest of the codebase are untouched.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Human-readable name of this provider, surfaced as the asset's
    /// price source label.
    fn name(&self) -> &str;

    /// Fetch the last traded price for a normalized pair like "BTCUSDT".
    ///
    /// An `Err` means anything from a transport failure to a non-success
    /// envelope — the caller treats them all as "try the next provider".
    async fn fetch_quote(&self, pair: &str) -> Result<f64, CoreError>;
}
