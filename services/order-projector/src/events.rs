//! Event definitions for the order projector
//!
//! Two layers:
//! - [`RawEvent`]: the loosely typed wire form delivered by the event source,
//!   every kind-specific field optional.
//! - [`DomainEvent`]: the closed, validated variant the projector folds over.
//!
//! Conversion between them lives in `validation`.

use serde::{Deserialize, Serialize};
use types::errors::EventError;
use types::ids::OrderId;
use types::order::{Cancellation, Fill, Order};

/// Kind of an order event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventKind {
    Created,
    Filled,
    Cancelled,
}

impl EventKind {
    /// Label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Created => "Created",
            EventKind::Filled => "Filled",
            EventKind::Cancelled => "Cancelled",
        }
    }
}

/// A validated order event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainEvent {
    /// An order was placed on the exchange contract
    Created(Order),
    /// An order was taken by a counterparty
    Filled(Fill),
    /// An order was withdrawn by its creator
    Cancelled(Cancellation),
}

impl DomainEvent {
    pub fn order_id(&self) -> OrderId {
        match self {
            DomainEvent::Created(order) => order.id,
            DomainEvent::Filled(fill) => fill.order_id,
            DomainEvent::Cancelled(cancel) => cancel.order_id,
        }
    }

    pub fn ledger_timestamp(&self) -> i64 {
        match self {
            DomainEvent::Created(order) => order.timestamp,
            DomainEvent::Filled(fill) => fill.ledger_timestamp,
            DomainEvent::Cancelled(cancel) => cancel.ledger_timestamp,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            DomainEvent::Created(_) => EventKind::Created,
            DomainEvent::Filled(_) => EventKind::Filled,
            DomainEvent::Cancelled(_) => EventKind::Cancelled,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, DomainEvent::Created(_))
    }
}

/// A fill or cancellation: the event that ends an order's life.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Terminal {
    Filled(Fill),
    Cancelled(Cancellation),
}

impl Terminal {
    pub fn order_id(&self) -> OrderId {
        match self {
            Terminal::Filled(fill) => fill.order_id,
            Terminal::Cancelled(cancel) => cancel.order_id,
        }
    }

    pub fn ledger_timestamp(&self) -> i64 {
        match self {
            Terminal::Filled(fill) => fill.ledger_timestamp,
            Terminal::Cancelled(cancel) => cancel.ledger_timestamp,
        }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Terminal::Filled(_) => EventKind::Filled,
            Terminal::Cancelled(_) => EventKind::Cancelled,
        }
    }
}

/// Wire form of an order event.
///
/// Field names follow the event source's JSON (`orderId`, `tokenGet`,
/// `ledgerTimestamp`, ...). The exchange contract's own event names
/// (`Order`, `Trade`, `Cancel`) and field names (`id`, `user`, `userFill`,
/// `timestamp`) are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum RawEvent {
    #[serde(alias = "Order", rename_all = "camelCase")]
    Created {
        #[serde(alias = "id")]
        order_id: Option<u64>,
        #[serde(alias = "user")]
        creator: Option<String>,
        token_get: Option<String>,
        amount_get: Option<String>,
        token_give: Option<String>,
        amount_give: Option<String>,
        #[serde(alias = "timestamp")]
        ledger_timestamp: Option<i64>,
    },

    #[serde(alias = "Trade", rename_all = "camelCase")]
    Filled {
        #[serde(alias = "id")]
        order_id: Option<u64>,
        #[serde(alias = "userFill")]
        filler: Option<String>,
        #[serde(alias = "timestamp")]
        ledger_timestamp: Option<i64>,
    },

    #[serde(alias = "Cancel", rename_all = "camelCase")]
    Cancelled {
        #[serde(alias = "id")]
        order_id: Option<u64>,
        #[serde(alias = "user")]
        cancelled_by: Option<String>,
        #[serde(alias = "timestamp")]
        ledger_timestamp: Option<i64>,
    },
}

impl RawEvent {
    /// Decode a single event.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Decode a JSON array of events, one result per element.
    ///
    /// Only a document that is not an array fails as a whole; an element
    /// that does not decode becomes `EventError::Undecodable` so the rest of
    /// the batch still reaches the projector.
    pub fn from_json_batch(
        json: &str,
    ) -> Result<Vec<Result<RawEvent, EventError>>, serde_json::Error> {
        let values: Vec<serde_json::Value> = serde_json::from_str(json)?;
        Ok(values
            .into_iter()
            .map(|value| {
                serde_json::from_value(value).map_err(|e| EventError::Undecodable {
                    reason: e.to_string(),
                })
            })
            .collect())
    }

    pub fn kind(&self) -> EventKind {
        match self {
            RawEvent::Created { .. } => EventKind::Created,
            RawEvent::Filled { .. } => EventKind::Filled,
            RawEvent::Cancelled { .. } => EventKind::Cancelled,
        }
    }

    /// Order id, if the event carries one.
    pub fn order_id(&self) -> Option<OrderId> {
        match self {
            RawEvent::Created { order_id, .. }
            | RawEvent::Filled { order_id, .. }
            | RawEvent::Cancelled { order_id, .. } => order_id.map(OrderId::new),
        }
    }
}
