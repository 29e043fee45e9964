// ═══════════════════════════════════════════════════════════════════
// Provider Tests — registry order, fallback chain, envelope parsing,
// exchange-rate fallback
// ═══════════════════════════════════════════════════════════════════

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use coinfolio_core::errors::CoreError;
use coinfolio_core::models::settings::Currency;
use coinfolio_core::providers::binance::BinanceProvider;
use coinfolio_core::providers::bybit::BybitProvider;
use coinfolio_core::providers::exchange_rate::ExchangeRateClient;
use coinfolio_core::providers::gateio::GateIoProvider;
use coinfolio_core::providers::registry::PriceProviderRegistry;
use coinfolio_core::providers::traits::PriceProvider;
use coinfolio_core::services::currency_service::CurrencyService;
use coinfolio_core::services::price_service::PriceService;

// ═══════════════════════════════════════════════════════════════════
// Test Helpers — Mock Providers
// ═══════════════════════════════════════════════════════════════════

/// A mock provider that answers with a fixed outcome and counts calls.
struct MockProvider {
    name: &'static str,
    price: Option<f64>,
    calls: Arc<AtomicUsize>,
}

impl MockProvider {
    fn up(name: &'static str, price: f64) -> (Box<Self>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Box::new(Self {
                name,
                price: Some(price),
                calls: Arc::clone(&calls),
            }),
            calls,
        )
    }

    fn down(name: &'static str) -> (Box<Self>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Box::new(Self {
                name,
                price: None,
                calls: Arc::clone(&calls),
            }),
            calls,
        )
    }
}

#[async_trait]
impl PriceProvider for MockProvider {
    fn name(&self) -> &str {
        self.name
    }

    async fn fetch_quote(&self, pair: &str) -> Result<f64, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.price {
            Some(price) => Ok(price),
            None => Err(CoreError::Api {
                provider: self.name.to_string(),
                message: format!("unreachable for {pair}"),
            }),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Registry
// ═══════════════════════════════════════════════════════════════════

#[test]
fn default_chain_is_binance_bybit_gateio() {
    let registry = PriceProviderRegistry::with_defaults();
    assert_eq!(registry.names(), vec!["Binance", "Bybit", "Gate.io"]);
}

#[test]
fn registration_order_is_priority_order() {
    let mut registry = PriceProviderRegistry::new();
    assert!(registry.is_empty());
    registry.register(MockProvider::up("First", 1.0).0);
    registry.register(MockProvider::up("Second", 2.0).0);
    assert_eq!(registry.names(), vec!["First", "Second"]);
}

// ═══════════════════════════════════════════════════════════════════
//  Ticker normalization
// ═══════════════════════════════════════════════════════════════════

#[test]
fn normalize_appends_quote_suffix() {
    assert_eq!(PriceService::normalize_ticker("btc").as_deref(), Some("BTCUSDT"));
    assert_eq!(PriceService::normalize_ticker(" eth  ").as_deref(), Some("ETHUSDT"));
}

#[test]
fn normalize_keeps_existing_suffix() {
    assert_eq!(
        PriceService::normalize_ticker("BTCUSDT").as_deref(),
        Some("BTCUSDT")
    );
    assert_eq!(
        PriceService::normalize_ticker("solusdt").as_deref(),
        Some("SOLUSDT")
    );
}

#[test]
fn normalize_rejects_empty() {
    assert_eq!(PriceService::normalize_ticker(""), None);
    assert_eq!(PriceService::normalize_ticker("   "), None);
}

// ═══════════════════════════════════════════════════════════════════
//  Fallback chain
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn first_success_wins_and_short_circuits() {
    let (a, a_calls) = MockProvider::up("A", 100.0);
    let (b, b_calls) = MockProvider::up("B", 200.0);
    let mut registry = PriceProviderRegistry::new();
    registry.register(a);
    registry.register(b);

    let service = PriceService::new(registry);
    let quote = service.fetch_price("BTC").await.unwrap();

    assert_eq!(quote.price, 100.0);
    assert_eq!(quote.source, "A");
    assert_eq!(a_calls.load(Ordering::SeqCst), 1);
    assert_eq!(b_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn falls_through_to_last_provider() {
    let (a, _) = MockProvider::down("A");
    let (b, _) = MockProvider::down("B");
    let (c, _) = MockProvider::up("C", 42.5);
    let mut registry = PriceProviderRegistry::new();
    registry.register(a);
    registry.register(b);
    registry.register(c);

    let quote = PriceService::new(registry).fetch_price("ETH").await.unwrap();
    assert_eq!(quote.price, 42.5);
    assert_eq!(quote.source, "C");
}

#[tokio::test]
async fn exhausted_chain_is_an_error() {
    let (a, _) = MockProvider::down("A");
    let (b, _) = MockProvider::down("B");
    let mut registry = PriceProviderRegistry::new();
    registry.register(a);
    registry.register(b);

    let result = PriceService::new(registry).fetch_price("BTC").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn non_positive_price_falls_through() {
    let (a, _) = MockProvider::up("A", 0.0);
    let (b, _) = MockProvider::up("B", -3.0);
    let (c, _) = MockProvider::up("C", 7.0);
    let mut registry = PriceProviderRegistry::new();
    registry.register(a);
    registry.register(b);
    registry.register(c);

    let quote = PriceService::new(registry).fetch_price("BTC").await.unwrap();
    assert_eq!(quote.source, "C");
}

#[tokio::test]
async fn empty_ticker_never_hits_providers() {
    let (a, a_calls) = MockProvider::up("A", 1.0);
    let mut registry = PriceProviderRegistry::new();
    registry.register(a);

    let result = PriceService::new(registry).fetch_price("  ").await;
    assert!(matches!(result, Err(CoreError::EmptyTicker)));
    assert_eq!(a_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_registry_reports_all_failed() {
    let result = PriceService::new(PriceProviderRegistry::new())
        .fetch_price("BTC")
        .await;
    assert!(matches!(result, Err(CoreError::AllProvidersFailed(_))));
}

// ═══════════════════════════════════════════════════════════════════
//  Envelope parsing
// ═══════════════════════════════════════════════════════════════════

mod binance_envelope {
    use super::*;

    #[test]
    fn flat_price_payload() {
        let price =
            BinanceProvider::parse_body(r#"{"symbol":"BTCUSDT","price":"64250.10"}"#).unwrap();
        assert_eq!(price, 64250.10);
    }

    #[test]
    fn garbage_price_is_an_error() {
        assert!(BinanceProvider::parse_body(r#"{"symbol":"X","price":"nope"}"#).is_err());
    }

    #[test]
    fn unexpected_shape_is_an_error() {
        assert!(BinanceProvider::parse_body(r#"{"code":-1121,"msg":"Invalid symbol."}"#).is_err());
    }
}

mod bybit_envelope {
    use super::*;

    #[test]
    fn success_envelope() {
        let body = r#"{"retCode":0,"retMsg":"OK","result":{"category":"spot","list":[{"symbol":"BTCUSDT","lastPrice":"64300.5"}]}}"#;
        assert_eq!(BybitProvider::parse_body(body).unwrap(), 64300.5);
    }

    #[test]
    fn nonzero_ret_code_is_an_error() {
        let body = r#"{"retCode":10001,"retMsg":"params error","result":{}}"#;
        assert!(BybitProvider::parse_body(body).is_err());
    }

    #[test]
    fn empty_list_is_an_error() {
        // transport success with an empty result list = unknown symbol
        let body = r#"{"retCode":0,"retMsg":"OK","result":{"category":"spot","list":[]}}"#;
        assert!(BybitProvider::parse_body(body).is_err());
    }
}

mod gateio_envelope {
    use super::*;

    #[test]
    fn pair_rewrite_inserts_underscore() {
        assert_eq!(GateIoProvider::currency_pair("BTCUSDT"), "BTC_USDT");
        assert_eq!(GateIoProvider::currency_pair("SOLUSDT"), "SOL_USDT");
    }

    #[test]
    fn pair_rewrite_leaves_underscored_pairs() {
        assert_eq!(GateIoProvider::currency_pair("BTC_USDT"), "BTC_USDT");
    }

    #[test]
    fn array_envelope() {
        let body = r#"[{"currency_pair":"BTC_USDT","last":"64100.2","lowest_ask":"64101"}]"#;
        assert_eq!(GateIoProvider::parse_body(body).unwrap(), 64100.2);
    }

    #[test]
    fn empty_array_is_an_error() {
        assert!(GateIoProvider::parse_body("[]").is_err());
    }
}

// ═══════════════════════════════════════════════════════════════════
//  Exchange rates
// ═══════════════════════════════════════════════════════════════════

#[tokio::test]
async fn usd_rate_is_always_one() {
    // base currency bypasses cache and network entirely — an
    // unreachable client must not matter
    let service = CurrencyService::with_client(ExchangeRateClient::with_base_url(
        "http://127.0.0.1:9",
    ));
    assert_eq!(service.fetch_rate(Currency::Usd).await, 1.0);
}

#[tokio::test]
async fn unreachable_remote_serves_static_fallback() {
    let service = CurrencyService::with_client(ExchangeRateClient::with_base_url(
        "http://127.0.0.1:9",
    ));
    assert_eq!(service.fetch_rate(Currency::Eur).await, 0.92);
    assert_eq!(service.fetch_rate(Currency::Uah).await, 41.5);
    assert_eq!(service.fetch_rate(Currency::Rub).await, 92.0);
}

#[tokio::test]
async fn fallback_is_not_cached() {
    let service = CurrencyService::with_client(ExchangeRateClient::with_base_url(
        "http://127.0.0.1:9",
    ));
    // two consecutive calls both end in the fallback; neither poisons
    // the cache with an approximate value
    assert_eq!(service.fetch_rate(Currency::Eur).await, 0.92);
    assert_eq!(service.fetch_rate(Currency::Eur).await, 0.92);
}
