use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Connection state of an asset's live price feed.
/// Serialized lowercase for wire compatibility with existing export files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionStatus::Idle => write!(f, "idle"),
            ConnectionStatus::Loading => write!(f, "loading"),
            ConnectionStatus::Success => write!(f, "success"),
            ConnectionStatus::Error => write!(f, "error"),
        }
    }
}

/// High-water mark for lot id generation. Lot ids are millisecond
/// timestamps, bumped past the last issued id so two lots created within
/// the same millisecond still get distinct ids.
static LAST_LOT_ID: AtomicI64 = AtomicI64::new(0);

/// Generate a fresh lot id: unique within the process, monotonically
/// increasing, roughly a creation timestamp.
pub fn next_lot_id() -> i64 {
    let now = Utc::now().timestamp_millis();
    match LAST_LOT_ID.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
        Some(last.max(now - 1) + 1)
    }) {
        Ok(prev) => prev.max(now - 1) + 1,
        Err(_) => now,
    }
}

/// One purchase record: entry price and cost paid, both kept as raw
/// decimal strings because they mirror pending user input. Parsing and
/// validation happen at computation time, not here.
///
/// Wire name for `cost` is `amount` — the export format predates the
/// cost/quantity terminology split and we stay compatible with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lot {
    #[serde(default = "next_lot_id", deserialize_with = "lot_id_compat")]
    pub id: i64,

    #[serde(default)]
    pub price: String,

    #[serde(rename = "amount", default)]
    pub cost: String,
}

impl Lot {
    /// A fresh empty lot with a newly generated id.
    pub fn new() -> Self {
        Self {
            id: next_lot_id(),
            price: String::new(),
            cost: String::new(),
        }
    }
}

impl Default for Lot {
    fn default() -> Self {
        Self::new()
    }
}

/// Accept lot ids as integers, floats, or numeric strings. Legacy export
/// files carried whatever id the frontend happened to produce.
fn lot_id_compat<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    struct LotIdVisitor;

    impl Visitor<'_> for LotIdVisitor {
        type Value = i64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a numeric lot id")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
            i64::try_from(v).map_err(|_| E::custom(format!("lot id {v} out of range")))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
            Ok(v as i64)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
            v.trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid lot id '{v}'")))
        }
    }

    deserializer.deserialize_any(LotIdVisitor)
}

/// A tracked ticker with its purchase lots and latest market price.
///
/// `current_price` is a raw decimal string for the same reason lot fields
/// are: it may be user-entered and incomplete. `source` names the provider
/// that last supplied the price, empty if none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub id: String,

    #[serde(default)]
    pub ticker: String,

    /// Insertion-ordered purchase lots. Invariant: never empty.
    #[serde(rename = "purchases")]
    pub lots: Vec<Lot>,

    #[serde(default)]
    pub current_price: String,

    #[serde(default)]
    pub source: String,

    #[serde(default)]
    pub connection_status: ConnectionStatus,
}

impl Asset {
    /// A new asset with a fresh uuid and one empty lot.
    pub fn new(ticker: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            ticker: ticker.into().trim().to_uppercase(),
            lots: vec![Lot::new()],
            current_price: String::new(),
            source: String::new(),
            connection_status: ConnectionStatus::Idle,
        }
    }

    /// The starter asset a fresh portfolio begins with: BTC with two
    /// empty lots ready for input.
    pub fn starter() -> Self {
        let mut asset = Self::new("BTC");
        asset.lots.push(Lot::new());
        asset
    }
}
