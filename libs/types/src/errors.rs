//! Error types for the exchange read model
//!
//! Error taxonomy using thiserror. Every error here describes bad input data
//! and is carried as a value, so all types are `Clone + PartialEq`.

use thiserror::Error;

/// Numeric construction errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NumericError {
    #[error("Value must be positive: {0}")]
    NonPositive(String),

    #[error("Unparsable decimal: {0}")]
    Unparsable(String),

    #[error("Value out of range: {0}")]
    Overflow(String),
}

/// A malformed event that cannot enter the projection
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("Amount must be positive: {field}={value}")]
    NonPositiveAmount { field: &'static str, value: String },

    #[error("Invalid amount: {field}={value}")]
    InvalidAmount { field: &'static str, value: String },

    #[error("Empty identity: {field}")]
    EmptyIdentity { field: &'static str },

    #[error("Order gives and gets the same token: {token}")]
    SameToken { token: String },

    #[error("Negative ledger timestamp: {value}")]
    NegativeTimestamp { value: i64 },

    #[error("Undecodable event: {reason}")]
    Undecodable { reason: String },
}

impl EventError {
    /// Attach the field name to an amount construction failure.
    pub fn from_amount(field: &'static str, err: NumericError) -> Self {
        match err {
            NumericError::NonPositive(value) => EventError::NonPositiveAmount { field, value },
            NumericError::Unparsable(value) | NumericError::Overflow(value) => {
                EventError::InvalidAmount { field, value }
            }
        }
    }
}
