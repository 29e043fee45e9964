use serde::{Deserialize, Serialize};

/// Display theme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// Supported display currencies. Monetary values are stored in USD and
/// converted for display only, so this set is closed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[default]
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "UAH")]
    Uah,
    #[serde(rename = "RUB")]
    Rub,
}

impl Currency {
    pub const ALL: [Currency; 4] = [Currency::Usd, Currency::Eur, Currency::Uah, Currency::Rub];

    /// ISO 4217 code, used as the key into remote rate tables.
    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Uah => "UAH",
            Currency::Rub => "RUB",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Usd => "$",
            Currency::Eur => "€",
            Currency::Uah => "₴",
            Currency::Rub => "₽",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Currency::Usd => "US Dollar",
            Currency::Eur => "Euro",
            Currency::Uah => "Ukrainian Hryvnia",
            Currency::Rub => "Russian Ruble",
        }
    }

    /// Approximate USD rate used when the remote rate table is
    /// unreachable. Never cached, so the next call retries the network.
    pub fn fallback_rate(&self) -> f64 {
        match self {
            Currency::Usd => 1.0,
            Currency::Eur => 0.92,
            Currency::Uah => 41.5,
            Currency::Rub => 92.0,
        }
    }
}

impl std::fmt::Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Allowed auto-refresh cadences. A closed set — arbitrary intervals
/// would invite rate limiting from the public price APIs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefreshInterval {
    #[default]
    Seconds5,
    Seconds10,
    Seconds30,
    Minute1,
}

impl RefreshInterval {
    pub const ALL: [RefreshInterval; 4] = [
        RefreshInterval::Seconds5,
        RefreshInterval::Seconds10,
        RefreshInterval::Seconds30,
        RefreshInterval::Minute1,
    ];

    pub fn as_millis(&self) -> u64 {
        match self {
            RefreshInterval::Seconds5 => 5_000,
            RefreshInterval::Seconds10 => 10_000,
            RefreshInterval::Seconds30 => 30_000,
            RefreshInterval::Minute1 => 60_000,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RefreshInterval::Seconds5 => "5 Seconds",
            RefreshInterval::Seconds10 => "10 Seconds",
            RefreshInterval::Seconds30 => "30 Seconds",
            RefreshInterval::Minute1 => "1 Minute",
        }
    }
}

/// User-configurable settings. Process-wide, session-only — persisted
/// nowhere except through explicit portfolio export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    pub theme: Theme,
    pub currency: Currency,
    pub refresh_interval: RefreshInterval,
}
