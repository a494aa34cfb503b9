//! Event projector
//!
//! Folds order events into a [`Snapshot`]. The projector holds only its
//! configuration; all state is in the snapshot the caller passes in and gets
//! back. Applying a batch in one call and applying the same events one at a
//! time produce identical snapshots.
//!
//! Per event:
//! - `Created` → open, unless the id is already known (duplicate, no-op).
//!   A terminal event buffered for the id is applied right away.
//! - `Filled` / `Cancelled` → move the open order to its terminal bucket.
//!   Already terminal: no-op, the first terminal event wins. Unknown id:
//!   buffered until the creation event arrives.
//! - Malformed input is skipped and recorded as a diagnostic.
//!
//! After every applied event the ledger clock advances and pending terminal
//! events older than the retention window are dropped as unresolved.

use tracing::{debug, info, warn};
use types::order::Order;

use crate::config::{ConfigError, ProjectorConfig};
use crate::diagnostics::{Diagnostic, UnresolvedReason};
use crate::events::{DomainEvent, Terminal};
use crate::snapshot::Snapshot;
use crate::validation::ProjectorInput;

/// Stateless fold of order events into snapshots.
#[derive(Debug, Clone, Default)]
pub struct Projector {
    config: ProjectorConfig,
}

impl Projector {
    /// Create a projector, rejecting configurations that would drop every
    /// buffered terminal event.
    pub fn new(config: ProjectorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        debug!(
            pending_retention_secs = config.pending_retention_secs,
            max_pending = config.max_pending,
            "Projector initialized"
        );
        Ok(Self { config })
    }

    /// Create a projector with default configuration.
    pub fn with_defaults() -> Self {
        Self::default()
    }

    pub fn config(&self) -> &ProjectorConfig {
        &self.config
    }

    /// Apply events in order to `snapshot` and return the result.
    ///
    /// Never fails: malformed events and unresolvable terminal events end up
    /// in [`Snapshot::diagnostics`].
    pub fn apply<I>(&self, mut snapshot: Snapshot, events: I) -> Snapshot
    where
        I: IntoIterator,
        I::Item: ProjectorInput,
    {
        for event in events {
            self.apply_one(&mut snapshot, event);
        }
        snapshot
    }

    /// Rebuild a snapshot from a full history.
    pub fn replay<I>(&self, events: I) -> Snapshot
    where
        I: IntoIterator,
        I::Item: ProjectorInput,
    {
        let snapshot = self.apply(Snapshot::new(), events);
        info!(
            open = snapshot.open_orders().len(),
            filled = snapshot.filled_orders().len(),
            cancelled = snapshot.cancelled_orders().len(),
            pending = snapshot.pending_terminals().len(),
            diagnostics = snapshot.diagnostics().len(),
            "Full replay projected"
        );
        snapshot
    }

    /// Advance the ledger clock to `now` without a new event, expiring stale
    /// pending terminal events.
    pub fn expire_pending(&self, mut snapshot: Snapshot, now: i64) -> Snapshot {
        snapshot.advance_clock(now);
        self.expire(&mut snapshot);
        snapshot
    }

    fn apply_one<E: ProjectorInput>(&self, snapshot: &mut Snapshot, input: E) {
        let order_id = input.order_hint();
        let kind = input.kind_hint();

        let event = match input.into_domain(self.config.amount_format) {
            Ok(event) => event,
            Err(error) => {
                warn!(
                    order_id = ?order_id,
                    kind = kind.map(|k| k.label()),
                    error = %error,
                    "Rejecting malformed event"
                );
                snapshot.record(Diagnostic::Rejected {
                    order_id,
                    kind,
                    error,
                });
                return;
            }
        };

        let timestamp = event.ledger_timestamp();
        if let Some(last) = snapshot.last_ledger_timestamp() {
            if timestamp < last {
                debug!(
                    order_id = %event.order_id(),
                    timestamp,
                    last,
                    "Event older than ledger clock"
                );
            }
        }

        match event {
            DomainEvent::Created(order) => self.on_created(snapshot, order),
            DomainEvent::Filled(fill) => self.on_terminal(snapshot, Terminal::Filled(fill)),
            DomainEvent::Cancelled(cancel) => {
                self.on_terminal(snapshot, Terminal::Cancelled(cancel))
            }
        }

        snapshot.advance_clock(timestamp);
        self.expire(snapshot);
    }

    fn on_created(&self, snapshot: &mut Snapshot, order: Order) {
        let id = order.id;

        if let Some(existing) = snapshot.order(id) {
            if existing == &order {
                debug!(order_id = %id, "Dropping duplicate creation");
            } else {
                warn!(order_id = %id, "Creation conflicts with known order, keeping first");
                let diagnostic = Diagnostic::ConflictingCreation { order_id: id };
                if !snapshot.diagnostics().contains(&diagnostic) {
                    snapshot.record(diagnostic);
                }
            }
            return;
        }

        debug!(order_id = %id, creator = %order.creator, "Order opened");
        snapshot.insert_open(order);

        if let Some(terminal) = snapshot.pending_mut().take(id) {
            debug!(
                order_id = %id,
                kind = terminal.kind().label(),
                "Applying buffered terminal event"
            );
            self.transition(snapshot, terminal);
        }
    }

    fn on_terminal(&self, snapshot: &mut Snapshot, terminal: Terminal) {
        let id = terminal.order_id();

        if snapshot.open_orders().contains_key(&id) {
            self.transition(snapshot, terminal);
            return;
        }

        if snapshot.contains_order(id) {
            debug!(
                order_id = %id,
                kind = terminal.kind().label(),
                "Order already terminal, ignoring"
            );
            return;
        }

        let kind = terminal.kind();
        if !snapshot.pending_mut().insert(terminal) {
            debug!(order_id = %id, kind = kind.label(), "Terminal event already pending");
            return;
        }

        debug!(order_id = %id, kind = kind.label(), "Buffering terminal event for unknown order");
        let evicted = snapshot
            .pending_mut()
            .evict_over_capacity(self.config.max_pending);
        for terminal in evicted {
            self.report_unresolved(snapshot, terminal, UnresolvedReason::CapacityExceeded);
        }
    }

    /// Move an open order into its terminal bucket.
    fn transition(&self, snapshot: &mut Snapshot, terminal: Terminal) {
        let id = terminal.order_id();
        let moved = match terminal {
            Terminal::Filled(fill) => snapshot.fill_open(fill),
            Terminal::Cancelled(cancel) => snapshot.cancel_open(cancel),
        };
        if moved {
            debug!(order_id = %id, "Order closed");
        }
    }

    fn expire(&self, snapshot: &mut Snapshot) {
        let Some(now) = snapshot.last_ledger_timestamp() else {
            return;
        };
        let cutoff = now.saturating_sub(self.config.pending_retention_secs);
        let expired = snapshot.pending_mut().expire_before(cutoff);
        for terminal in expired {
            self.report_unresolved(snapshot, terminal, UnresolvedReason::RetentionExpired);
        }
    }

    fn report_unresolved(&self, snapshot: &mut Snapshot, terminal: Terminal, reason: UnresolvedReason) {
        warn!(
            order_id = %terminal.order_id(),
            kind = terminal.kind().label(),
            reason = ?reason,
            "Dropping unresolved terminal event"
        );
        snapshot.record(Diagnostic::Unresolved {
            order_id: terminal.order_id(),
            kind: terminal.kind(),
            ledger_timestamp: terminal.ledger_timestamp(),
            reason,
        });
    }
}
