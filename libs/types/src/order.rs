//! Order lifecycle types
//!
//! An order is created once by the exchange contract and never changes. Its
//! lifecycle ends with exactly one terminal record: a [`Fill`] or a
//! [`Cancellation`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::EventError;
use crate::ids::{AccountId, OrderId, TokenId};
use crate::numeric::{Amount, Price};

/// Order side relative to a base/quote market
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Gives quote, gets base (bid)
    Buy,
    /// Gives base, gets quote (ask)
    Sell,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Immutable order as recorded by the exchange contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub creator: AccountId,
    /// Asset the creator wants to receive
    pub token_get: TokenId,
    pub amount_get: Amount,
    /// Asset the creator offers
    pub token_give: TokenId,
    pub amount_give: Amount,
    /// Ledger creation time, Unix seconds
    pub timestamp: i64,
}

impl Order {
    /// Create an order, rejecting orders that trade a token for itself.
    pub fn new(
        id: OrderId,
        creator: AccountId,
        token_get: TokenId,
        amount_get: Amount,
        token_give: TokenId,
        amount_give: Amount,
        timestamp: i64,
    ) -> Result<Self, EventError> {
        if token_get == token_give {
            return Err(EventError::SameToken {
                token: token_get.to_string(),
            });
        }
        if timestamp < 0 {
            return Err(EventError::NegativeTimestamp { value: timestamp });
        }
        Ok(Self {
            id,
            creator,
            token_get,
            amount_get,
            token_give,
            amount_give,
            timestamp,
        })
    }

    /// `amount_give / amount_get`: what the creator pays per unit received.
    pub fn price(&self) -> Price {
        Price::ratio(self.amount_give, self.amount_get)
    }

    /// Creation time as a UTC datetime.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp, 0)
    }
}

/// Terminal record: the order was executed against a counterparty
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    pub order_id: OrderId,
    /// Account that took the order
    pub filler: AccountId,
    pub ledger_timestamp: i64,
}

/// Terminal record: the order was withdrawn without execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cancellation {
    pub order_id: OrderId,
    pub cancelled_by: Option<AccountId>,
    pub ledger_timestamp: i64,
}
