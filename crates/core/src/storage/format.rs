use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::errors::CoreError;
use crate::models::asset::{Asset, ConnectionStatus, Lot};

/// Current export file version.
pub const EXPORT_VERSION: u16 = 2;

/// The version-2 export file: full asset records plus the live-mode flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    pub version: u16,
    pub assets: Vec<Asset>,
    pub is_live_mode: bool,
    pub export_date: DateTime<Utc>,
}

/// The normalized result of a successful import, whichever schema the
/// file carried.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportData {
    pub assets: Vec<Asset>,
    pub active_asset_id: String,
    pub is_live_mode: bool,
}

/// Serialize a portfolio snapshot into the version-2 export format.
pub fn to_export_json(assets: Vec<Asset>, is_live_mode: bool) -> Result<String, CoreError> {
    let data = ExportData {
        version: EXPORT_VERSION,
        assets,
        is_live_mode,
        export_date: Utc::now(),
    };
    serde_json::to_string_pretty(&data)
        .map_err(|e| CoreError::Serialization(format!("Failed to serialize export: {e}")))
}

/// The suggested file name for an export taken at `date`.
pub fn export_file_name(date: DateTime<Utc>) -> String {
    format!("crypto_portfolio_{}.json", date.format("%Y-%m-%d"))
}

// ── Import schemas ──────────────────────────────────────────────────
//
// Two shapes are accepted, discriminated structurally rather than by a
// version tag (the legacy format predates versioning): the current shape
// carries an `assets` array, the legacy single-asset shape a `purchases`
// array. Anything matching neither is rejected without touching state.

#[derive(Deserialize)]
#[serde(untagged)]
enum ImportFile {
    Current(CurrentImport),
    Legacy(LegacyImport),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrentImport {
    assets: Vec<Asset>,
    #[serde(default)]
    is_live_mode: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyImport {
    #[serde(default)]
    ticker: String,
    purchases: Vec<Lot>,
    #[serde(default)]
    current_market_price: String,
}

/// Parse an import payload into a normalized `ImportData`.
///
/// Legacy files are upgraded on load: a fresh asset id is synthesized,
/// a trailing quote-currency suffix is stripped from the ticker, and
/// missing lot ids are generated. Legacy imports never enable live mode.
pub fn parse_import(json: &str) -> Result<ImportData, CoreError> {
    let file: ImportFile = serde_json::from_str(json).map_err(|e| {
        warn!(error = %e, "import payload matches neither known schema");
        CoreError::InvalidImport(e.to_string())
    })?;

    match file {
        ImportFile::Current(current) => {
            if current.assets.is_empty() {
                warn!("import rejected: empty asset list");
                return Err(CoreError::InvalidImport("asset list is empty".into()));
            }
            let active_asset_id = current.assets[0].id.clone();
            Ok(ImportData {
                assets: current.assets,
                active_asset_id,
                is_live_mode: current.is_live_mode,
            })
        }
        ImportFile::Legacy(legacy) => {
            let asset = upgrade_legacy(legacy);
            let active_asset_id = asset.id.clone();
            Ok(ImportData {
                assets: vec![asset],
                active_asset_id,
                is_live_mode: false,
            })
        }
    }
}

/// Upgrade a legacy single-asset export into a full asset record.
fn upgrade_legacy(legacy: LegacyImport) -> Asset {
    let trimmed = legacy.ticker.trim();
    // The legacy app stored the full trading pair; strip the quote suffix.
    // `get` refuses a cut point inside a multibyte char, so tickers with
    // non-ASCII text near the tail pass through unchanged instead of
    // panicking. When it matches, the cut is a char boundary and the
    // prefix slice is safe.
    let base = if trimmed.len() > 4
        && trimmed
            .get(trimmed.len() - 4..)
            .is_some_and(|tail| tail.eq_ignore_ascii_case("USDT"))
    {
        &trimmed[..trimmed.len() - 4]
    } else {
        trimmed
    };
    let ticker = if base.is_empty() {
        "IMPORTED".to_string()
    } else {
        base.to_uppercase()
    };

    let mut lots = legacy.purchases;
    if lots.is_empty() {
        lots.push(Lot::new());
    }

    Asset {
        id: Uuid::new_v4().to_string(),
        ticker,
        lots,
        current_price: legacy.current_market_price,
        source: String::new(),
        connection_status: ConnectionStatus::Idle,
    }
}
