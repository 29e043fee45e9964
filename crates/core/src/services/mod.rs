pub mod currency_service;
pub mod price_service;
pub mod refresh_service;
pub mod stats_service;
pub mod store;
