pub mod registry;
pub mod traits;

// API provider implementations
pub mod binance;
pub mod bybit;
pub mod exchange_rate;
pub mod gateio;
