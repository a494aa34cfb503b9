//! Projector configuration
//!
//! Loaded from JSON by the embedding application or built from defaults.

use serde::{Deserialize, Serialize};
use types::numeric::DEFAULT_PRICE_SCALE;

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(String),

    #[error("pending retention must not be negative: {0}")]
    NegativeRetention(i64),

    #[error("max_pending must be at least 1")]
    ZeroPendingCapacity,

    #[error("price scale {0} exceeds decimal precision (max 28)")]
    PriceScaleTooLarge(u32),

    #[error("token decimals {0} exceed decimal precision (max 28)")]
    DecimalsTooLarge(u32),

    #[error("market base and quote must differ: {0}")]
    SameMarketTokens(String),
}

/// How raw amount strings are encoded by the event source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AmountFormat {
    /// Decimal strings in whole units, e.g. `"1.5"`.
    #[default]
    Decimal,
    /// Integer strings in base units, scaled down by `decimals` (18 for wei).
    BaseUnits { decimals: u32 },
}

/// Configuration for the event projector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectorConfig {
    /// Ledger seconds a terminal event may wait for its creation event.
    pub pending_retention_secs: i64,
    /// Maximum number of buffered terminal events.
    pub max_pending: usize,
    /// Decimal places used when displaying prices.
    pub price_scale: u32,
    /// Encoding of raw amounts.
    pub amount_format: AmountFormat,
}

impl Default for ProjectorConfig {
    fn default() -> Self {
        Self {
            pending_retention_secs: 3600,
            max_pending: 10_000,
            price_scale: DEFAULT_PRICE_SCALE,
            amount_format: AmountFormat::Decimal,
        }
    }
}

impl ProjectorConfig {
    /// Parse and validate a JSON configuration. Missing keys take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ProjectorConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pending_retention_secs < 0 {
            return Err(ConfigError::NegativeRetention(self.pending_retention_secs));
        }
        if self.max_pending == 0 {
            return Err(ConfigError::ZeroPendingCapacity);
        }
        if self.price_scale > 28 {
            return Err(ConfigError::PriceScaleTooLarge(self.price_scale));
        }
        if let AmountFormat::BaseUnits { decimals } = self.amount_format {
            if decimals > 28 {
                return Err(ConfigError::DecimalsTooLarge(decimals));
            }
        }
        Ok(())
    }
}
