use serde::{Deserialize, Serialize};

/// Derived statistics for a single asset. Never stored — recomputed from
/// the asset's lots and current price on every read.
///
/// All monetary fields are expressed in the display currency (the
/// exchange-rate multiplier is applied at computation time). `total_tokens`
/// is a quantity and `pnl_percent` a ratio; neither is currency-scaled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetStats {
    pub total_cost: f64,
    pub total_tokens: f64,
    pub average_price: f64,
    pub current_value: f64,
    pub pnl: f64,
    pub pnl_percent: f64,
}

/// Portfolio-wide aggregate. Assets without a usable live price are
/// valued at their cost basis so the total is never understated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalStats {
    pub total_invested: f64,
    pub total_portfolio_value: f64,
    pub total_pnl: f64,
    pub total_pnl_percent: f64,
    /// True if at least one asset has a parseable positive current price.
    pub has_price_data: bool,
}
