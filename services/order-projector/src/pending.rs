//! Buffer for terminal events that arrived before their order
//!
//! The event source delivers creation before terminal events within a batch,
//! so this path only triggers when that guarantee breaks. Entries wait for
//! the matching creation event, bounded by a ledger-time retention window
//! and a capacity. The first terminal event per id wins.
//!
//! Dropped ids are remembered for the life of the snapshot so a redelivered
//! terminal event stays a no-op. That set grows by one id per unresolved
//! terminal event, the same rate as the `Unresolved` diagnostics, and is
//! only reset by replaying into a fresh snapshot.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use types::ids::OrderId;

use crate::events::Terminal;

/// Pending terminal events keyed by order id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingTerminals {
    by_id: BTreeMap<OrderId, Terminal>,
    /// Arrival order, oldest first.
    arrival: VecDeque<OrderId>,
    /// Ids whose terminal event was dropped; redeliveries are ignored.
    dropped: BTreeSet<OrderId>,
}

impl PendingTerminals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer a terminal event.
    ///
    /// Returns `false` when the id already has a pending or dropped terminal
    /// event, in which case nothing changes.
    pub fn insert(&mut self, terminal: Terminal) -> bool {
        let id = terminal.order_id();
        if self.by_id.contains_key(&id) || self.dropped.contains(&id) {
            return false;
        }
        self.by_id.insert(id, terminal);
        self.arrival.push_back(id);
        true
    }

    /// Take the pending terminal event for `id`, if any.
    pub fn take(&mut self, id: OrderId) -> Option<Terminal> {
        let terminal = self.by_id.remove(&id)?;
        self.arrival.retain(|pending| *pending != id);
        Some(terminal)
    }

    /// Drop the oldest entry while above `capacity`.
    pub fn evict_over_capacity(&mut self, capacity: usize) -> Vec<Terminal> {
        let mut evicted = Vec::new();
        while self.by_id.len() > capacity {
            let Some(id) = self.arrival.pop_front() else {
                break;
            };
            if let Some(terminal) = self.by_id.remove(&id) {
                self.dropped.insert(id);
                evicted.push(terminal);
            }
        }
        evicted
    }

    /// Drop every entry whose ledger timestamp is before `cutoff`.
    ///
    /// Returned in arrival order.
    pub fn expire_before(&mut self, cutoff: i64) -> Vec<Terminal> {
        let expired_ids: Vec<OrderId> = self
            .arrival
            .iter()
            .copied()
            .filter(|id| {
                self.by_id
                    .get(id)
                    .is_some_and(|t| t.ledger_timestamp() < cutoff)
            })
            .collect();

        let mut expired = Vec::with_capacity(expired_ids.len());
        for id in expired_ids {
            if let Some(terminal) = self.take(id) {
                self.dropped.insert(id);
                expired.push(terminal);
            }
        }
        expired
    }

    pub fn contains(&self, id: OrderId) -> bool {
        self.by_id.contains_key(&id)
    }

    pub fn was_dropped(&self, id: OrderId) -> bool {
        self.dropped.contains(&id)
    }

    /// Ids whose terminal event was dropped, ascending.
    pub fn dropped_ids(&self) -> impl Iterator<Item = OrderId> + '_ {
        self.dropped.iter().copied()
    }

    pub fn get(&self, id: OrderId) -> Option<&Terminal> {
        self.by_id.get(&id)
    }

    /// Pending entries in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &Terminal> {
        self.arrival.iter().filter_map(|id| self.by_id.get(id))
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
