use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::errors::CoreError;
use crate::models::asset::ConnectionStatus;
use crate::models::settings::RefreshInterval;
use crate::services::price_service::{PriceQuote, PriceService};
use crate::services::store::{AssetField, PortfolioStore};

/// How long the updating flag lingers after a cycle merges. Purely
/// cosmetic: a fast round-trip would otherwise make the loading
/// indicator invisible.
const UPDATING_CLEAR_DELAY: Duration = Duration::from_millis(500);

/// Flags shared between the facade, the schedule task, and in-flight
/// cycle tasks.
#[derive(Default)]
struct RefreshState {
    live: AtomicBool,
    updating: AtomicBool,
    fetch_error: AtomicBool,
}

/// Owns the live-refresh polling loop.
///
/// Two modes: disabled (initial) and enabled. Enabling fires one fetch
/// cycle immediately and then recurs at the configured interval; at most
/// one schedule exists at any moment (cancel-before-replace). Disabling
/// is advisory — it stops future cycles, but an in-flight cycle is
/// allowed to complete and merge its results.
pub struct RefreshService {
    store: Arc<PortfolioStore>,
    prices: Arc<PriceService>,
    state: Arc<RefreshState>,
    schedule: Mutex<Option<JoinHandle<()>>>,
    interval: Mutex<RefreshInterval>,
}

impl RefreshService {
    pub fn new(store: Arc<PortfolioStore>, prices: Arc<PriceService>) -> Self {
        Self {
            store,
            prices,
            state: Arc::new(RefreshState::default()),
            schedule: Mutex::new(None),
            interval: Mutex::new(RefreshInterval::default()),
        }
    }

    // ── Flags ───────────────────────────────────────────────────────

    pub fn is_live(&self) -> bool {
        self.state.live.load(Ordering::SeqCst)
    }

    /// True while a fetch cycle is in flight (plus a short cosmetic
    /// tail).
    pub fn is_updating(&self) -> bool {
        self.state.updating.load(Ordering::SeqCst)
    }

    /// True if any asset failed during the most recent cycle.
    pub fn has_fetch_error(&self) -> bool {
        self.state.fetch_error.load(Ordering::SeqCst)
    }

    pub fn interval(&self) -> RefreshInterval {
        *self.interval.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ── Mode transitions ────────────────────────────────────────────

    /// Enable live mode: one immediate fetch cycle, then recurring
    /// cycles at the configured interval. Must be called from within a
    /// tokio runtime.
    pub fn enable(&self) {
        self.state.live.store(true, Ordering::SeqCst);
        self.restart_schedule();
        info!(interval = self.interval().label(), "live mode enabled");
    }

    /// Disable live mode: cancel the schedule, clear transient flags,
    /// and reset every asset's connection status and source label so
    /// stale markers never outlive live mode. In-flight cycles still
    /// merge.
    pub fn disable(&self) {
        self.state.live.store(false, Ordering::SeqCst);
        let mut slot = self.schedule.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = slot.take() {
            handle.abort();
        }
        drop(slot);

        self.state.updating.store(false, Ordering::SeqCst);
        self.state.fetch_error.store(false, Ordering::SeqCst);

        self.store.bulk_update(|assets| {
            assets
                .into_iter()
                .map(|mut asset| {
                    asset.connection_status = ConnectionStatus::Idle;
                    asset.source.clear();
                    asset
                })
                .collect()
        });
        info!("live mode disabled");
    }

    /// Change the polling interval. If live, the schedule restarts at
    /// the new cadence (with a fresh immediate cycle); the old timer is
    /// always cancelled first, so two timers never coexist.
    pub fn set_interval(&self, interval: RefreshInterval) {
        *self.interval.lock().unwrap_or_else(|e| e.into_inner()) = interval;
        if self.is_live() {
            self.restart_schedule();
            info!(interval = interval.label(), "refresh schedule restarted");
        }
    }

    /// Replace the schedule task, cancelling any previous one first.
    fn restart_schedule(&self) {
        let period = Duration::from_millis(self.interval().as_millis());
        let store = Arc::clone(&self.store);
        let prices = Arc::clone(&self.prices);
        let state = Arc::clone(&self.state);

        let mut slot = self.schedule.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = slot.take() {
            handle.abort();
        }

        *slot = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                // First tick completes immediately: the initial fetch
                ticker.tick().await;
                // Cycles run detached so aborting the schedule never
                // kills a cycle that is already fetching
                tokio::spawn(run_cycle(
                    Arc::clone(&store),
                    Arc::clone(&prices),
                    Arc::clone(&state),
                ));
            }
        }));
    }

    // ── Manual refresh ──────────────────────────────────────────────

    /// Fetch a price for a single asset outside the polling loop, e.g.
    /// from an explicit per-asset refresh button. Same status semantics
    /// as a cycle, plus a transient loading status while in flight.
    pub async fn refresh_one(&self, asset_id: &str) -> Result<(), CoreError> {
        let Some(asset) = self.store.get(asset_id) else {
            return Ok(());
        };
        self.store
            .set_connection_status(asset_id, ConnectionStatus::Loading);

        match self.prices.fetch_price(&asset.ticker).await {
            Ok(quote) => {
                self.store.update_asset_field(
                    asset_id,
                    AssetField::CurrentPrice,
                    &quote.price.to_string(),
                );
                self.store
                    .update_asset_field(asset_id, AssetField::Source, &quote.source);
                self.store
                    .set_connection_status(asset_id, ConnectionStatus::Success);
                Ok(())
            }
            Err(e) => {
                self.store
                    .set_connection_status(asset_id, ConnectionStatus::Error);
                Err(e)
            }
        }
    }
}

impl Drop for RefreshService {
    fn drop(&mut self) {
        let mut slot = self.schedule.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = slot.take() {
            handle.abort();
        }
    }
}

/// One fetch cycle: snapshot tickers, fan out one fetch per asset, wait
/// for all to settle, merge everything back in a single atomic bulk
/// update.
///
/// Per-asset outcome: success overwrites price/source and marks the
/// asset `success`; failure marks it `error` and leaves the last known
/// price and source untouched. The cycle-level error flag is set if any
/// asset failed.
async fn run_cycle(
    store: Arc<PortfolioStore>,
    prices: Arc<PriceService>,
    state: Arc<RefreshState>,
) {
    state.updating.store(true, Ordering::SeqCst);

    // Snapshot at cycle start: tickers are not re-read mid-cycle. The
    // merge below keys on asset id and overwrites only price, source,
    // and status, so concurrent manual edits survive — a mid-cycle
    // ticker edit just gets the price fetched for the old ticker.
    let targets: Vec<(String, String)> = store
        .snapshot()
        .into_iter()
        .map(|a| (a.id, a.ticker))
        .collect();

    let fetches = targets.into_iter().map(|(id, ticker)| {
        let prices = Arc::clone(&prices);
        async move { (id, prices.fetch_price(&ticker).await) }
    });
    let settled = join_all(fetches).await;

    let mut any_failed = false;
    let mut outcomes: HashMap<String, Option<PriceQuote>> = HashMap::new();
    for (id, result) in settled {
        match result {
            Ok(quote) => {
                outcomes.insert(id, Some(quote));
            }
            Err(e) => {
                debug!(asset_id = %id, error = %e, "asset fetch failed this cycle");
                any_failed = true;
                outcomes.insert(id, None);
            }
        }
    }

    store.bulk_update(move |assets| {
        let mut outcomes = outcomes;
        assets
            .into_iter()
            .map(|mut asset| {
                match outcomes.remove(&asset.id) {
                    Some(Some(quote)) => {
                        asset.current_price = quote.price.to_string();
                        asset.source = quote.source;
                        asset.connection_status = ConnectionStatus::Success;
                    }
                    Some(None) => {
                        asset.connection_status = ConnectionStatus::Error;
                    }
                    // Asset added after the snapshot: leave it alone
                    None => {}
                }
                asset
            })
            .collect()
    });

    state.fetch_error.store(any_failed, Ordering::SeqCst);

    tokio::spawn(async move {
        tokio::time::sleep(UPDATING_CLEAR_DELAY).await;
        state.updating.store(false, Ordering::SeqCst);
    });
}
