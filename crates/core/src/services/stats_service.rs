//! Pure statistics engine: lots + a live price + an exchange-rate
//! multiplier in, cost basis / holdings / PnL out. No I/O, no state.
//!
//! Malformed numeric strings are treated as absent data (zero
//! contribution), never as errors — lot fields mirror in-progress user
//! input and are expected to be transiently invalid.
//!
//! All arithmetic is `f64` (~15-17 significant digits). Fine for
//! display-grade portfolio figures; not an accounting ledger.

use crate::models::asset::Asset;
use crate::models::stats::{AssetStats, GlobalStats};

/// Parse a user-entered decimal string. Empty, unparsable, and
/// non-finite inputs are all `None`.
fn parse_decimal(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Compute per-asset statistics at the given exchange-rate multiplier.
///
/// A lot contributes only if both price and cost parse and price > 0.
/// The multiplier scales every monetary field; `total_tokens` (a
/// quantity) and `pnl_percent` (a ratio of same-currency values) are
/// rate-invariant.
pub fn compute_asset_stats(asset: &Asset, rate: f64) -> AssetStats {
    let mut total_cost = 0.0;
    let mut total_tokens = 0.0;

    for lot in &asset.lots {
        let (Some(price), Some(cost)) = (parse_decimal(&lot.price), parse_decimal(&lot.cost))
        else {
            continue;
        };
        if price <= 0.0 {
            continue;
        }
        total_cost += cost;
        total_tokens += cost / price;
    }

    let average_price = if total_tokens > 0.0 {
        total_cost / total_tokens
    } else {
        0.0
    };

    let mut current_value = 0.0;
    let mut pnl = 0.0;
    let mut pnl_percent = 0.0;

    if let Some(current_price) = parse_decimal(&asset.current_price) {
        if total_tokens > 0.0 {
            current_value = current_price * total_tokens;
            pnl = current_value - total_cost;
            // Degenerate zero-cost holdings (offsetting lot costs) report
            // 0% rather than a division-by-zero infinity.
            if total_cost > 0.0 {
                pnl_percent = pnl / total_cost * 100.0;
            }
        }
    }

    AssetStats {
        total_cost: total_cost * rate,
        total_tokens,
        average_price: average_price * rate,
        current_value: current_value * rate,
        pnl: pnl * rate,
        pnl_percent,
    }
}

/// Aggregate statistics across the whole portfolio.
///
/// Assets whose raw current price parses to a positive number contribute
/// their converted current value and set `has_price_data`; assets without
/// a usable price are valued at cost so the portfolio total is never
/// understated by missing feeds.
pub fn compute_global_stats(assets: &[Asset], rate: f64) -> GlobalStats {
    let mut global = GlobalStats::default();

    for asset in assets {
        let stats = compute_asset_stats(asset, rate);
        global.total_invested += stats.total_cost;

        if parse_decimal(&asset.current_price).is_some_and(|p| p > 0.0) {
            global.total_portfolio_value += stats.current_value;
            global.has_price_data = true;
        } else {
            global.total_portfolio_value += stats.total_cost;
        }
    }

    global.total_pnl = global.total_portfolio_value - global.total_invested;
    global.total_pnl_percent = if global.total_invested > 0.0 {
        global.total_pnl / global.total_invested * 100.0
    } else {
        0.0
    };

    global
}
