//! Read-model snapshot
//!
//! The snapshot is a plain owned value: the caller holds it and passes it
//! back into the projector for incremental updates. Only the projector
//! mutates it; everything public here is read-only.
//!
//! Every order id lives in at most one of the open, filled and cancelled
//! buckets. Orders are never removed once seen.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use types::ids::OrderId;
use types::order::{Cancellation, Fill, Order};

use crate::candles::{self, BucketWidth, Candle, PriceSample};
use crate::diagnostics::Diagnostic;
use crate::events::Terminal;
use crate::pending::PendingTerminals;

/// An order together with the fill that consumed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilledOrder {
    pub order: Order,
    pub fill: Fill,
}

/// An order together with its cancellation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelledOrder {
    pub order: Order,
    pub cancellation: Cancellation,
}

/// Where an order id currently lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Open,
    Filled,
    Cancelled,
    /// Only a terminal event is known so far.
    Pending,
}

/// Derived read model of the exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    open: BTreeMap<OrderId, Order>,
    /// Fill application order.
    filled: Vec<FilledOrder>,
    /// Position of each id in `filled`.
    filled_index: BTreeMap<OrderId, usize>,
    cancelled: BTreeMap<OrderId, CancelledOrder>,
    pending: PendingTerminals,
    diagnostics: Vec<Diagnostic>,
    last_ledger_timestamp: Option<i64>,
}

impl Snapshot {
    /// An empty snapshot, the starting point of a full replay.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_orders(&self) -> &BTreeMap<OrderId, Order> {
        &self.open
    }

    /// Filled orders in the order their fills were applied.
    pub fn filled_orders(&self) -> &[FilledOrder] {
        &self.filled
    }

    pub fn cancelled_orders(&self) -> &BTreeMap<OrderId, CancelledOrder> {
        &self.cancelled
    }

    pub fn cancelled_ids(&self) -> impl Iterator<Item = OrderId> + '_ {
        self.cancelled.keys().copied()
    }

    pub fn pending_terminals(&self) -> &PendingTerminals {
        &self.pending
    }

    /// Problems recorded since the snapshot was created.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Highest ledger timestamp of any applied event.
    pub fn last_ledger_timestamp(&self) -> Option<i64> {
        self.last_ledger_timestamp
    }

    pub fn status_of(&self, id: OrderId) -> Option<OrderStatus> {
        if self.open.contains_key(&id) {
            Some(OrderStatus::Open)
        } else if self.filled_index.contains_key(&id) {
            Some(OrderStatus::Filled)
        } else if self.cancelled.contains_key(&id) {
            Some(OrderStatus::Cancelled)
        } else if self.pending.contains(id) {
            Some(OrderStatus::Pending)
        } else {
            None
        }
    }

    /// The stored order for `id`, whichever bucket it is in.
    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.open
            .get(&id)
            .or_else(|| self.filled_index.get(&id).map(|&i| &self.filled[i].order))
            .or_else(|| self.cancelled.get(&id).map(|c| &c.order))
    }

    /// Total number of orders whose creation has been seen.
    pub fn known_orders(&self) -> usize {
        self.open.len() + self.filled.len() + self.cancelled.len()
    }

    /// `(timestamp, price, volume)` samples, one per filled order, in fill
    /// order.
    ///
    /// `price = amount_give / amount_get` and `volume = amount_get`, stamped
    /// with the fill's ledger time.
    pub fn price_series(&self) -> Vec<PriceSample> {
        self.filled
            .iter()
            .map(|f| PriceSample {
                timestamp: f.fill.ledger_timestamp,
                price: f.order.price(),
                volume: f.order.amount_get.as_decimal(),
            })
            .collect()
    }

    /// Candles over [`Snapshot::price_series`].
    pub fn candles(&self, width: BucketWidth) -> Vec<Candle> {
        candles::aggregate(&self.price_series(), width)
    }

    /// First id found in more than one bucket, if any.
    pub fn partition_violation(&self) -> Option<OrderId> {
        let filled_or_cancelled_overlap = self
            .filled_index
            .keys()
            .find(|id| self.open.contains_key(id) || self.cancelled.contains_key(id));
        let cancelled_open_overlap = self.cancelled.keys().find(|id| self.open.contains_key(id));
        let pending_overlap = self
            .pending
            .iter()
            .map(Terminal::order_id)
            .find(|id| self.order(*id).is_some());

        filled_or_cancelled_overlap
            .or(cancelled_open_overlap)
            .copied()
            .or(pending_overlap)
    }

    pub fn is_partitioned(&self) -> bool {
        self.partition_violation().is_none()
    }

    /// SHA-256 over the canonical content, for comparing replays.
    ///
    /// Covers every field of the buckets and pending entries, the dropped
    /// ids and the ledger clock. Diagnostics are not included.
    pub fn checksum(&self) -> String {
        let mut hasher = Sha256::new();

        for order in self.open.values() {
            hash_order(&mut hasher, order);
        }
        hasher.update(b"---");

        for filled in &self.filled {
            hash_order(&mut hasher, &filled.order);
            hash_fill(&mut hasher, &filled.fill);
        }
        hasher.update(b"---");

        for cancelled in self.cancelled.values() {
            hash_order(&mut hasher, &cancelled.order);
            hash_cancellation(&mut hasher, &cancelled.cancellation);
        }
        hasher.update(b"---");

        for terminal in self.pending.iter() {
            match terminal {
                Terminal::Filled(fill) => {
                    hasher.update(b"F");
                    hash_fill(&mut hasher, fill);
                }
                Terminal::Cancelled(cancellation) => {
                    hasher.update(b"C");
                    hash_cancellation(&mut hasher, cancellation);
                }
            }
        }
        hasher.update(b"---");

        for id in self.pending.dropped_ids() {
            hasher.update(id.to_string().as_bytes());
            hasher.update(b",");
        }
        hasher.update(b"===");

        if let Some(ts) = self.last_ledger_timestamp {
            hasher.update(ts.to_string().as_bytes());
        }

        format!("{:x}", hasher.finalize())
    }

    // Mutations, reachable only through the projector.

    pub(crate) fn contains_order(&self, id: OrderId) -> bool {
        self.open.contains_key(&id)
            || self.filled_index.contains_key(&id)
            || self.cancelled.contains_key(&id)
    }

    pub(crate) fn insert_open(&mut self, order: Order) {
        self.open.insert(order.id, order);
    }

    /// Move an open order to the filled history. Returns `false` if the
    /// order is not open.
    pub(crate) fn fill_open(&mut self, fill: Fill) -> bool {
        let Some(order) = self.open.remove(&fill.order_id) else {
            return false;
        };
        self.filled_index.insert(order.id, self.filled.len());
        self.filled.push(FilledOrder { order, fill });
        true
    }

    /// Move an open order to the cancelled set. Returns `false` if the
    /// order is not open.
    pub(crate) fn cancel_open(&mut self, cancellation: Cancellation) -> bool {
        let Some(order) = self.open.remove(&cancellation.order_id) else {
            return false;
        };
        self.cancelled.insert(
            order.id,
            CancelledOrder {
                order,
                cancellation,
            },
        );
        true
    }

    pub(crate) fn pending_mut(&mut self) -> &mut PendingTerminals {
        &mut self.pending
    }

    pub(crate) fn record(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Advance the ledger clock; it never moves backwards.
    pub(crate) fn advance_clock(&mut self, timestamp: i64) {
        self.last_ledger_timestamp = Some(match self.last_ledger_timestamp {
            Some(current) => current.max(timestamp),
            None => timestamp,
        });
    }
}

fn hash_fill(hasher: &mut Sha256, fill: &Fill) {
    hasher.update(fill.order_id.to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(fill.filler.as_str().as_bytes());
    hasher.update(b"@");
    hasher.update(fill.ledger_timestamp.to_string().as_bytes());
    hasher.update(b";");
}

fn hash_cancellation(hasher: &mut Sha256, cancellation: &Cancellation) {
    hasher.update(cancellation.order_id.to_string().as_bytes());
    hasher.update(b"|");
    match &cancellation.cancelled_by {
        Some(account) => {
            hasher.update(b"+");
            hasher.update(account.as_str().as_bytes());
        }
        None => hasher.update(b"-"),
    }
    hasher.update(b"@");
    hasher.update(cancellation.ledger_timestamp.to_string().as_bytes());
    hasher.update(b";");
}

fn hash_order(hasher: &mut Sha256, order: &Order) {
    hasher.update(order.id.to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(order.creator.as_str().as_bytes());
    hasher.update(b"|");
    hasher.update(order.token_get.as_str().as_bytes());
    hasher.update(b":");
    hasher.update(order.amount_get.to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(order.token_give.as_str().as_bytes());
    hasher.update(b":");
    hasher.update(order.amount_give.to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(order.timestamp.to_string().as_bytes());
    hasher.update(b";");
}
