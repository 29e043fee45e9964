use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::models::asset::{Asset, ConnectionStatus, Lot};
use crate::models::portfolio::Portfolio;
use crate::storage::format::ImportData;

/// Mutable asset fields addressable by the single-field update operation.
/// Connection status has its own setter since it is an enum, not text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetField {
    Ticker,
    CurrentPrice,
    Source,
}

/// Mutable lot fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LotField {
    Price,
    Cost,
}

/// The in-memory portfolio collection, shared between the facade and the
/// refresh loop behind an `Arc`.
///
/// Invariants enforced here: the portfolio always holds at least one
/// asset, every asset at least one lot, and the active id always names an
/// existing asset. Invariant-violating removals are silent no-ops.
///
/// All updates are last-write-wins. Field updates do no validation —
/// numeric validation happens in the stats engine at read time.
///
/// Critical sections are synchronous and short; nothing awaits while
/// holding a lock.
pub struct PortfolioStore {
    inner: RwLock<Portfolio>,
}

impl PortfolioStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Portfolio::default()),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Portfolio> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Portfolio> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }

    // ── Reads ───────────────────────────────────────────────────────

    /// Cloned view of the full asset list, taken under the read lock.
    /// Refresh cycles snapshot through this at cycle start.
    pub fn snapshot(&self) -> Vec<Asset> {
        self.read().assets.clone()
    }

    pub fn asset_count(&self) -> usize {
        self.read().assets.len()
    }

    pub fn get(&self, asset_id: &str) -> Option<Asset> {
        self.read().assets.iter().find(|a| a.id == asset_id).cloned()
    }

    pub fn active_asset_id(&self) -> String {
        self.read().active_asset_id.clone()
    }

    /// The active asset, falling back to the first one if the active id
    /// has somehow gone stale.
    pub fn active_asset(&self) -> Asset {
        let portfolio = self.read();
        portfolio
            .assets
            .iter()
            .find(|a| a.id == portfolio.active_asset_id)
            .unwrap_or(&portfolio.assets[0])
            .clone()
    }

    // ── Asset operations ────────────────────────────────────────────

    /// Append a new asset with one empty lot and make it active.
    /// Never fails. Returns the new asset's id.
    pub fn add_asset(&self) -> String {
        let asset = Asset::new("ETH");
        let id = asset.id.clone();
        let mut portfolio = self.write();
        portfolio.assets.push(asset);
        portfolio.active_asset_id = id.clone();
        id
    }

    /// Remove an asset. No-op (returns false) when it is the only one
    /// left. If the removed asset was active, activation moves to the
    /// first remaining asset.
    pub fn remove_asset(&self, asset_id: &str) -> bool {
        let mut portfolio = self.write();
        if portfolio.assets.len() == 1 {
            return false;
        }
        let Some(idx) = portfolio.assets.iter().position(|a| a.id == asset_id) else {
            return false;
        };
        portfolio.assets.remove(idx);
        if portfolio.active_asset_id == asset_id {
            portfolio.active_asset_id = portfolio.assets[0].id.clone();
        }
        true
    }

    /// Activate an existing asset; unknown ids are ignored.
    pub fn set_active(&self, asset_id: &str) {
        let mut portfolio = self.write();
        if portfolio.assets.iter().any(|a| a.id == asset_id) {
            portfolio.active_asset_id = asset_id.to_string();
        }
    }

    /// Replace one text field of the named asset, last-write-wins.
    pub fn update_asset_field(&self, asset_id: &str, field: AssetField, value: &str) {
        let mut portfolio = self.write();
        if let Some(asset) = portfolio.assets.iter_mut().find(|a| a.id == asset_id) {
            match field {
                AssetField::Ticker => asset.ticker = value.to_string(),
                AssetField::CurrentPrice => asset.current_price = value.to_string(),
                AssetField::Source => asset.source = value.to_string(),
            }
        }
    }

    pub fn set_connection_status(&self, asset_id: &str, status: ConnectionStatus) {
        let mut portfolio = self.write();
        if let Some(asset) = portfolio.assets.iter_mut().find(|a| a.id == asset_id) {
            asset.connection_status = status;
        }
    }

    // ── Lot operations ──────────────────────────────────────────────

    /// Append an empty lot to the named asset. Returns the new lot's id,
    /// or `None` if the asset doesn't exist.
    pub fn add_lot(&self, asset_id: &str) -> Option<i64> {
        let mut portfolio = self.write();
        let asset = portfolio.assets.iter_mut().find(|a| a.id == asset_id)?;
        let lot = Lot::new();
        let id = lot.id;
        asset.lots.push(lot);
        Some(id)
    }

    /// Remove a lot. No-op (returns false) when it is the asset's only
    /// remaining lot.
    pub fn remove_lot(&self, asset_id: &str, lot_id: i64) -> bool {
        let mut portfolio = self.write();
        let Some(asset) = portfolio.assets.iter_mut().find(|a| a.id == asset_id) else {
            return false;
        };
        if asset.lots.len() == 1 {
            return false;
        }
        let Some(idx) = asset.lots.iter().position(|l| l.id == lot_id) else {
            return false;
        };
        asset.lots.remove(idx);
        true
    }

    /// Replace one field of a lot by identity match, last-write-wins.
    pub fn update_lot(&self, asset_id: &str, lot_id: i64, field: LotField, value: &str) {
        let mut portfolio = self.write();
        if let Some(asset) = portfolio.assets.iter_mut().find(|a| a.id == asset_id) {
            if let Some(lot) = asset.lots.iter_mut().find(|l| l.id == lot_id) {
                match field {
                    LotField::Price => lot.price = value.to_string(),
                    LotField::Cost => lot.cost = value.to_string(),
                }
            }
        }
    }

    // ── Whole-collection operations ─────────────────────────────────

    /// Apply a transform to the whole asset list in one atomic
    /// replacement, under the write lock.
    ///
    /// Used by the refresh loop to merge a cycle's fetch results without
    /// interleaving with other mutations. The transform sees the
    /// collection as it is now, not as it was when a cycle snapshotted:
    /// the merge walks current assets and touches only the fields it
    /// owns, so an edit landing between snapshot and merge survives —
    /// though a mid-cycle ticker edit still receives the price fetched
    /// for the old ticker. Callers must preserve the at-least-one-asset
    /// invariant.
    pub fn bulk_update<F>(&self, transform: F)
    where
        F: FnOnce(Vec<Asset>) -> Vec<Asset>,
    {
        let mut portfolio = self.write();
        let current = std::mem::take(&mut portfolio.assets);
        let next = transform(current);
        debug_assert!(!next.is_empty(), "bulk_update must keep at least one asset");
        portfolio.assets = next;
    }

    /// Discard everything and start over with a single default asset.
    pub fn reset(&self) {
        *self.write() = Portfolio::default();
    }

    /// Replace the portfolio with an already-validated import. Malformed
    /// payloads are rejected during parsing and never reach this point.
    pub fn apply_import(&self, data: ImportData) {
        debug!(assets = data.assets.len(), "applying imported portfolio");
        let mut portfolio = self.write();
        portfolio.assets = data.assets;
        portfolio.active_asset_id = data.active_asset_id;
    }
}

impl Default for PortfolioStore {
    fn default() -> Self {
        Self::new()
    }
}
