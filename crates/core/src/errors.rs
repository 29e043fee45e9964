use thiserror::Error;

/// Unified error type for the entire coinfolio-core library.
/// Every fallible public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("No price for {0} from any provider")]
    AllProvidersFailed(String),

    #[error("Ticker symbol is empty")]
    EmptyTicker,

    // ── Import / Export ─────────────────────────────────────────────
    #[error("Unrecognized import format: {0}")]
    InvalidImport(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Sanitize error message: strip query parameters from URLs so a
        // provider's request parameters never end up in logs verbatim.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::InvalidImport(e.to_string())
    }
}
