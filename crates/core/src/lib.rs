pub mod errors;
pub mod models;
pub mod providers;
pub mod services;
pub mod storage;

use std::sync::Arc;

use chrono::Utc;

use errors::CoreError;
use models::{
    asset::Asset,
    settings::{AppSettings, Currency, RefreshInterval, Theme},
    stats::{AssetStats, GlobalStats},
};
use providers::registry::PriceProviderRegistry;
use services::{
    currency_service::CurrencyService,
    price_service::PriceService,
    refresh_service::RefreshService,
    stats_service,
    store::{AssetField, LotField, PortfolioStore},
};
use storage::format;

/// Main entry point for the Coinfolio core library.
///
/// Holds the portfolio store and every service needed to operate on it.
/// A frontend calls into this facade; all state is in-memory and
/// session-only, persisted nowhere except through explicit export.
///
/// Live mode (`set_live_mode(true)`) spawns the recurring refresh
/// schedule and therefore must run inside a tokio runtime.
#[must_use]
pub struct Coinfolio {
    store: Arc<PortfolioStore>,
    prices: Arc<PriceService>,
    currency_service: CurrencyService,
    refresh_service: RefreshService,
    settings: AppSettings,
}

impl std::fmt::Debug for Coinfolio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coinfolio")
            .field("assets", &self.store.asset_count())
            .field("settings", &self.settings)
            .field("live", &self.refresh_service.is_live())
            .finish()
    }
}

impl Coinfolio {
    /// A fresh portfolio (one starter asset) with the default provider
    /// chain and settings.
    pub fn new() -> Self {
        Self::with_registry(PriceProviderRegistry::with_defaults())
    }

    /// Build against a custom provider registry. The seam tests use to
    /// substitute mock providers.
    pub fn with_registry(registry: PriceProviderRegistry) -> Self {
        let store = Arc::new(PortfolioStore::new());
        let prices = Arc::new(PriceService::new(registry));
        let refresh_service = RefreshService::new(Arc::clone(&store), Arc::clone(&prices));
        Self {
            store,
            prices,
            currency_service: CurrencyService::new(),
            refresh_service,
            settings: AppSettings::default(),
        }
    }

    // ── Assets & Lots ───────────────────────────────────────────────

    /// Snapshot of all tracked assets in display order.
    #[must_use]
    pub fn assets(&self) -> Vec<Asset> {
        self.store.snapshot()
    }

    #[must_use]
    pub fn asset(&self, asset_id: &str) -> Option<Asset> {
        self.store.get(asset_id)
    }

    #[must_use]
    pub fn active_asset(&self) -> Asset {
        self.store.active_asset()
    }

    #[must_use]
    pub fn active_asset_id(&self) -> String {
        self.store.active_asset_id()
    }

    /// Add a new asset and make it active. Returns its id.
    pub fn add_asset(&self) -> String {
        self.store.add_asset()
    }

    /// Remove an asset. Removing the last remaining asset is a no-op and
    /// returns false.
    pub fn remove_asset(&self, asset_id: &str) -> bool {
        self.store.remove_asset(asset_id)
    }

    pub fn set_active_asset(&self, asset_id: &str) {
        self.store.set_active(asset_id);
    }

    pub fn update_asset_field(&self, asset_id: &str, field: AssetField, value: &str) {
        self.store.update_asset_field(asset_id, field, value);
    }

    /// Append an empty lot. Returns the new lot id, or `None` for an
    /// unknown asset.
    pub fn add_lot(&self, asset_id: &str) -> Option<i64> {
        self.store.add_lot(asset_id)
    }

    /// Remove a lot. Removing an asset's only lot is a no-op and returns
    /// false.
    pub fn remove_lot(&self, asset_id: &str, lot_id: i64) -> bool {
        self.store.remove_lot(asset_id, lot_id)
    }

    pub fn update_lot(&self, asset_id: &str, lot_id: i64, field: LotField, value: &str) {
        self.store.update_lot(asset_id, lot_id, field, value);
    }

    /// Discard everything: one fresh default asset, live mode off.
    pub fn reset(&self) {
        if self.refresh_service.is_live() {
            self.refresh_service.disable();
        }
        self.store.reset();
    }

    // ── Statistics ──────────────────────────────────────────────────

    /// Per-asset statistics at the given exchange-rate multiplier.
    #[must_use]
    pub fn asset_stats(&self, asset_id: &str, rate: f64) -> Option<AssetStats> {
        self.store
            .get(asset_id)
            .map(|asset| stats_service::compute_asset_stats(&asset, rate))
    }

    /// Portfolio-wide statistics at the given exchange-rate multiplier.
    #[must_use]
    pub fn global_stats(&self, rate: f64) -> GlobalStats {
        stats_service::compute_global_stats(&self.store.snapshot(), rate)
    }

    /// The USD-to-display-currency multiplier for the configured
    /// currency. Cached for an hour; degrades to static approximations
    /// when the rate API is unreachable.
    pub async fn display_rate(&self) -> f64 {
        self.currency_service.fetch_rate(self.settings.currency).await
    }

    // ── Live mode ───────────────────────────────────────────────────

    /// Turn the recurring price refresh on or off. Enabling triggers an
    /// immediate fetch cycle; disabling stops future cycles but lets an
    /// in-flight cycle finish and merge.
    pub fn set_live_mode(&self, live: bool) {
        if live {
            self.refresh_service.enable();
        } else {
            self.refresh_service.disable();
        }
    }

    #[must_use]
    pub fn is_live_mode(&self) -> bool {
        self.refresh_service.is_live()
    }

    #[must_use]
    pub fn is_updating(&self) -> bool {
        self.refresh_service.is_updating()
    }

    /// True if any asset failed to fetch during the most recent cycle.
    #[must_use]
    pub fn has_fetch_error(&self) -> bool {
        self.refresh_service.has_fetch_error()
    }

    /// Fetch a price for one asset right now, outside the polling loop.
    pub async fn refresh_asset(&self, asset_id: &str) -> Result<(), CoreError> {
        self.refresh_service.refresh_one(asset_id).await
    }

    // ── Settings ────────────────────────────────────────────────────

    #[must_use]
    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.settings.theme = theme;
    }

    pub fn set_currency(&mut self, currency: Currency) {
        self.settings.currency = currency;
    }

    /// Change the refresh cadence. If live mode is on, the schedule
    /// restarts at the new interval immediately.
    pub fn set_refresh_interval(&mut self, interval: RefreshInterval) {
        self.settings.refresh_interval = interval;
        self.refresh_service.set_interval(interval);
    }

    // ── Export / Import ─────────────────────────────────────────────

    /// Export the portfolio as version-2 JSON.
    pub fn export_json(&self) -> Result<String, CoreError> {
        format::to_export_json(self.store.snapshot(), self.refresh_service.is_live())
    }

    /// Suggested file name for an export taken now.
    #[must_use]
    pub fn export_file_name(&self) -> String {
        format::export_file_name(Utc::now())
    }

    /// Import a portfolio from JSON (current or legacy schema).
    ///
    /// On success the store is replaced atomically and the file's
    /// live-mode flag is returned so the caller can decide whether to
    /// re-enable live mode. On failure the store is left untouched.
    pub fn import_json(&self, json: &str) -> Result<bool, CoreError> {
        let data = format::parse_import(json)?;
        let live = data.is_live_mode;
        self.store.apply_import(data);
        Ok(live)
    }

    // ── Providers ───────────────────────────────────────────────────

    /// Names of the configured price providers in priority order.
    #[must_use]
    pub fn provider_names(&self) -> Vec<String> {
        self.prices.provider_names()
    }
}

impl Default for Coinfolio {
    fn default() -> Self {
        Self::new()
    }
}

// Re-exports so frontends don't need deep module paths for everyday types.
pub use models::asset::{ConnectionStatus, Lot};
pub use services::price_service::PriceQuote;
