//! Fixed-point decimal types for amounts and prices
//!
//! Uses rust_decimal for deterministic arithmetic (no floating-point errors).
//! Display rounding is HALF_UP (midpoint away from zero).

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::errors::NumericError;

/// Default number of decimal places used when displaying prices.
pub const DEFAULT_PRICE_SCALE: u32 = 5;

/// Smallest positive `Decimal`: 1e-28.
const MIN_POSITIVE: Decimal = Decimal::from_parts(1, 0, 0, false, 28);

/// A strictly positive asset quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    /// Create an amount, rejecting zero and negative values.
    pub fn try_new(value: Decimal) -> Result<Self, NumericError> {
        if value <= Decimal::ZERO {
            return Err(NumericError::NonPositive(value.to_string()));
        }
        Ok(Self(value.normalize()))
    }

    /// Parse a decimal string such as `"1.5"`.
    pub fn parse(s: &str) -> Result<Self, NumericError> {
        let value = Decimal::from_str(s.trim())
            .map_err(|_| NumericError::Unparsable(s.to_string()))?;
        Self::try_new(value)
    }

    /// Convert an integer amount of base units (e.g. wei) into whole units.
    ///
    /// `decimals` is the token's precision, 18 for ether-like assets.
    pub fn from_base_units(raw: &str, decimals: u32) -> Result<Self, NumericError> {
        let units = raw
            .trim()
            .parse::<i128>()
            .map_err(|_| NumericError::Unparsable(raw.to_string()))?;
        let value = Decimal::try_from_i128_with_scale(units, decimals)
            .map_err(|_| NumericError::Overflow(raw.to_string()))?;
        Self::try_new(value)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Exchange rate between two amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// `numerator / denominator`.
    ///
    /// Both sides are positive so the quotient always exists. Non-terminating
    /// quotients are carried at full `Decimal` precision (28 significant
    /// digits); rounding only happens through [`Price::rounded`]. Quotients
    /// outside the `Decimal` range clamp to `Decimal::MAX` or to the
    /// smallest positive value, so a price is always positive.
    pub fn ratio(numerator: Amount, denominator: Amount) -> Self {
        let quotient = numerator
            .as_decimal()
            .checked_div(denominator.as_decimal())
            .unwrap_or(Decimal::MAX)
            .max(MIN_POSITIVE);
        Self(quotient.normalize())
    }

    /// Create a price from an already computed decimal.
    pub fn try_new(value: Decimal) -> Result<Self, NumericError> {
        if value <= Decimal::ZERO {
            return Err(NumericError::NonPositive(value.to_string()));
        }
        Ok(Self(value.normalize()))
    }

    /// Parse a decimal string such as `"0.5"`.
    pub fn parse(s: &str) -> Result<Self, NumericError> {
        let value = Decimal::from_str(s.trim())
            .map_err(|_| NumericError::Unparsable(s.to_string()))?;
        Self::try_new(value)
    }

    /// Round half-up to `scale` decimal places for display.
    pub fn rounded(&self, scale: u32) -> Decimal {
        self.0
            .round_dp_with_strategy(scale, RoundingStrategy::MidpointAwayFromZero)
            .normalize()
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
