// ═══════════════════════════════════════════════════════════════════
// Stats Engine Tests — compute_asset_stats / compute_global_stats
// ═══════════════════════════════════════════════════════════════════

use coinfolio_core::models::asset::{next_lot_id, Asset, ConnectionStatus, Lot};
use coinfolio_core::services::stats_service::{compute_asset_stats, compute_global_stats};

fn lot(price: &str, cost: &str) -> Lot {
    Lot {
        id: next_lot_id(),
        price: price.to_string(),
        cost: cost.to_string(),
    }
}

fn asset(ticker: &str, lots: Vec<Lot>, current_price: &str) -> Asset {
    Asset {
        id: format!("test-{ticker}"),
        ticker: ticker.to_string(),
        lots,
        current_price: current_price.to_string(),
        source: String::new(),
        connection_status: ConnectionStatus::Idle,
    }
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

// ═══════════════════════════════════════════════════════════════════
//  Per-asset statistics
// ═══════════════════════════════════════════════════════════════════

mod asset_stats {
    use super::*;

    #[test]
    fn totals_from_two_lots() {
        let a = asset("BTC", vec![lot("100", "1000"), lot("200", "2000")], "");
        let stats = compute_asset_stats(&a, 1.0);

        assert!(close(stats.total_tokens, 20.0)); // 10 + 10
        assert!(close(stats.total_cost, 3000.0));
        assert!(close(stats.average_price, 150.0));
    }

    #[test]
    fn pnl_with_current_price() {
        let a = asset("BTC", vec![lot("100", "1000"), lot("200", "2000")], "180");
        let stats = compute_asset_stats(&a, 1.0);

        assert!(close(stats.current_value, 3600.0));
        assert!(close(stats.pnl, 600.0));
        assert!(close(stats.pnl_percent, 20.0));
    }

    #[test]
    fn unparsable_lots_contribute_nothing() {
        let a = asset(
            "BTC",
            vec![
                lot("100", "1000"),
                lot("", "5000"),        // empty price
                lot("abc", "5000"),     // garbage price
                lot("100", ""),         // empty cost
                lot("100", "xyz"),      // garbage cost
                lot("  ", "  "),        // whitespace
            ],
            "",
        );
        let stats = compute_asset_stats(&a, 1.0);

        assert!(close(stats.total_cost, 1000.0));
        assert!(close(stats.total_tokens, 10.0));
    }

    #[test]
    fn non_positive_price_lots_excluded() {
        let a = asset("BTC", vec![lot("0", "1000"), lot("-50", "1000")], "");
        let stats = compute_asset_stats(&a, 1.0);

        assert_eq!(stats.total_cost, 0.0);
        assert_eq!(stats.total_tokens, 0.0);
        assert_eq!(stats.average_price, 0.0);
    }

    #[test]
    fn whitespace_around_numbers_is_tolerated() {
        let a = asset("BTC", vec![lot(" 100 ", " 1000 ")], " 180 ");
        let stats = compute_asset_stats(&a, 1.0);

        assert!(close(stats.total_tokens, 10.0));
        assert!(close(stats.current_value, 1800.0));
    }

    #[test]
    fn no_current_price_means_zero_value_and_pnl() {
        let a = asset("BTC", vec![lot("100", "1000")], "");
        let stats = compute_asset_stats(&a, 1.0);

        assert_eq!(stats.current_value, 0.0);
        assert_eq!(stats.pnl, 0.0);
        assert_eq!(stats.pnl_percent, 0.0);
    }

    #[test]
    fn garbage_current_price_means_zero_value_and_pnl() {
        let a = asset("BTC", vec![lot("100", "1000")], "not a number");
        let stats = compute_asset_stats(&a, 1.0);

        assert_eq!(stats.current_value, 0.0);
        assert_eq!(stats.pnl, 0.0);
    }

    #[test]
    fn no_lots_with_price_means_no_pnl_even_with_current_price() {
        let a = asset("BTC", vec![lot("", "")], "180");
        let stats = compute_asset_stats(&a, 1.0);

        assert_eq!(stats.current_value, 0.0);
        assert_eq!(stats.pnl, 0.0);
        assert_eq!(stats.pnl_percent, 0.0);
    }

    #[test]
    fn zero_total_cost_reports_zero_pnl_percent() {
        // Offsetting lot costs: totalCost == 0 while totalTokens > 0.
        // The percent must clamp to 0, never NaN or infinity.
        let a = asset("BTC", vec![lot("10", "5"), lot("1000", "-5")], "100");
        let stats = compute_asset_stats(&a, 1.0);

        assert!(stats.total_tokens > 0.0);
        assert!(close(stats.total_cost, 0.0));
        assert_eq!(stats.pnl_percent, 0.0);
        assert!(stats.pnl.is_finite());
    }

    #[test]
    fn rate_scales_monetary_fields_only() {
        let a = asset("BTC", vec![lot("100", "1000"), lot("200", "2000")], "180");
        let base = compute_asset_stats(&a, 1.0);
        let scaled = compute_asset_stats(&a, 4.05);

        assert!(close(scaled.total_cost, base.total_cost * 4.05));
        assert!(close(scaled.average_price, base.average_price * 4.05));
        assert!(close(scaled.current_value, base.current_value * 4.05));
        assert!(close(scaled.pnl, base.pnl * 4.05));
        // quantity and ratio are rate-invariant
        assert!(close(scaled.total_tokens, base.total_tokens));
        assert!(close(scaled.pnl_percent, base.pnl_percent));
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Global statistics
// ═══════════════════════════════════════════════════════════════════

mod global_stats {
    use super::*;

    #[test]
    fn sums_across_assets() {
        let assets = vec![
            asset("BTC", vec![lot("100", "1000")], "120"),
            asset("ETH", vec![lot("10", "500")], "8"),
        ];
        let g = compute_global_stats(&assets, 1.0);

        assert!(close(g.total_invested, 1500.0));
        // BTC: 10 tokens * 120 = 1200; ETH: 50 tokens * 8 = 400
        assert!(close(g.total_portfolio_value, 1600.0));
        assert!(close(g.total_pnl, 100.0));
        assert!(g.has_price_data);
    }

    #[test]
    fn priceless_assets_valued_at_cost() {
        let assets = vec![
            asset("BTC", vec![lot("100", "1000")], ""),
            asset("ETH", vec![lot("10", "500")], "garbage"),
        ];
        let g = compute_global_stats(&assets, 1.0);

        assert!(close(g.total_invested, 1500.0));
        assert!(close(g.total_portfolio_value, 1500.0));
        assert!(close(g.total_pnl, 0.0));
        assert_eq!(g.total_pnl_percent, 0.0);
        assert!(!g.has_price_data);
    }

    #[test]
    fn mixed_priced_and_priceless() {
        let assets = vec![
            asset("BTC", vec![lot("100", "1000")], "150"),
            asset("ETH", vec![lot("10", "500")], ""),
        ];
        let g = compute_global_stats(&assets, 1.0);

        // priced asset at current value, priceless at cost
        assert!(close(g.total_portfolio_value, 1500.0 + 500.0));
        assert!(close(g.total_pnl, 500.0));
        assert!(g.has_price_data);
    }

    #[test]
    fn empty_portfolio_is_all_zero() {
        let g = compute_global_stats(&[], 1.0);

        assert_eq!(g.total_invested, 0.0);
        assert_eq!(g.total_portfolio_value, 0.0);
        assert_eq!(g.total_pnl_percent, 0.0);
        assert!(!g.has_price_data);
    }

    #[test]
    fn rate_does_not_change_pnl_percent() {
        let assets = vec![
            asset("BTC", vec![lot("100", "1000")], "150"),
            asset("ETH", vec![lot("10", "500")], "12"),
        ];
        let base = compute_global_stats(&assets, 1.0);
        let scaled = compute_global_stats(&assets, 41.5);

        assert!(close(base.total_pnl_percent, scaled.total_pnl_percent));
        assert!(close(scaled.total_invested, base.total_invested * 41.5));
        assert!(close(scaled.total_pnl, base.total_pnl * 41.5));
    }

    #[test]
    fn negative_current_price_counts_as_priceless() {
        let assets = vec![asset("BTC", vec![lot("100", "1000")], "-5")];
        let g = compute_global_stats(&assets, 1.0);

        // the aggregate treats a non-positive price as no price data
        assert!(!g.has_price_data);
        assert!(close(g.total_portfolio_value, 1000.0));
    }
}
