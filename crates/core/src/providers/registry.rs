use super::binance::BinanceProvider;
use super::bybit::BybitProvider;
use super::gateio::GateIoProvider;
use super::traits::PriceProvider;

/// Ordered registry of price providers.
///
/// Registration order is priority order: a fetch walks the list front to
/// back and the first usable quote wins. New providers can be added
/// without modifying existing code.
pub struct PriceProviderRegistry {
    providers: Vec<Box<dyn PriceProvider>>,
}

impl PriceProviderRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// The default chain: Binance, then Bybit, then Gate.io.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(BinanceProvider::new()));
        registry.register(Box::new(BybitProvider::new()));
        registry.register(Box::new(GateIoProvider::new()));
        registry
    }

    /// Append a provider at the lowest priority position.
    pub fn register(&mut self, provider: Box<dyn PriceProvider>) {
        self.providers.push(provider);
    }

    /// All registered providers in priority order.
    pub fn providers(&self) -> &[Box<dyn PriceProvider>] {
        &self.providers
    }

    pub fn names(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for PriceProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}
