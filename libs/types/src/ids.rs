//! Identifier types for exchange entities
//!
//! Order ids are assigned by the ledger and increase strictly with creation,
//! so `OrderId` orders chronologically. Accounts and tokens are identified by
//! their on-chain address strings.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::EventError;

/// Unique identifier for an order
///
/// Assigned by the exchange contract as a running counter, which makes
/// id order equal to creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(u64);

impl OrderId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl From<u64> for OrderId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of the account that created or filled an order
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Create an AccountId, rejecting empty identities.
    pub fn try_new(address: impl Into<String>) -> Result<Self, EventError> {
        let s = address.into();
        if s.trim().is_empty() {
            return Err(EventError::EmptyIdentity { field: "account" });
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Asset identifier (token contract address)
///
/// The zero address stands for the chain's native coin.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(String);

impl TokenId {
    pub const NATIVE_ADDRESS: &'static str = "0x0000000000000000000000000000000000000000";

    /// Create a TokenId, rejecting empty identities.
    pub fn try_new(address: impl Into<String>) -> Result<Self, EventError> {
        let s = address.into();
        if s.trim().is_empty() {
            return Err(EventError::EmptyIdentity { field: "token" });
        }
        Ok(Self(s))
    }

    /// The native coin of the chain.
    pub fn native() -> Self {
        Self(Self::NATIVE_ADDRESS.to_string())
    }

    pub fn is_native(&self) -> bool {
        self.0 == Self::NATIVE_ADDRESS
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
