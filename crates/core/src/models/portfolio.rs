use serde::{Deserialize, Serialize};

use super::asset::Asset;

/// The mutable collection of tracked assets plus which one is currently
/// selected for editing.
///
/// Invariant: `assets` is never empty, and removal of the last asset is
/// rejected upstream. `active_asset_id` always names an existing asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Portfolio {
    pub assets: Vec<Asset>,
    pub active_asset_id: String,
}

impl Default for Portfolio {
    fn default() -> Self {
        let starter = Asset::starter();
        let active_asset_id = starter.id.clone();
        Self {
            assets: vec![starter],
            active_asset_id,
        }
    }
}
