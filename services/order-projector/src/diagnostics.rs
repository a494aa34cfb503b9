//! Diagnostics recorded while projecting
//!
//! Bad input never aborts a projection. Each problem is recorded here as
//! data inside the snapshot, and the caller decides whether to surface it.

use std::fmt;

use types::errors::EventError;
use types::ids::OrderId;

use crate::events::EventKind;

/// Why a buffered terminal event was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// No creation event arrived within the retention window.
    RetentionExpired,
    /// The pending buffer was full and this was its oldest entry.
    CapacityExceeded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A malformed event was skipped.
    Rejected {
        order_id: Option<OrderId>,
        kind: Option<EventKind>,
        error: EventError,
    },

    /// A fill or cancellation never found its order.
    Unresolved {
        order_id: OrderId,
        kind: EventKind,
        ledger_timestamp: i64,
        reason: UnresolvedReason,
    },

    /// A second creation event for a known id carried different content.
    /// The first one is kept.
    ConflictingCreation { order_id: OrderId },
}

impl Diagnostic {
    /// Order id concerned, if known.
    pub fn order_id(&self) -> Option<OrderId> {
        match self {
            Diagnostic::Rejected { order_id, .. } => *order_id,
            Diagnostic::Unresolved { order_id, .. } => Some(*order_id),
            Diagnostic::ConflictingCreation { order_id } => Some(*order_id),
        }
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, Diagnostic::Unresolved { .. })
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, Diagnostic::Rejected { .. })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::Rejected {
                order_id, error, ..
            } => match order_id {
                Some(id) => write!(f, "rejected event for order {}: {}", id, error),
                None => write!(f, "rejected event: {}", error),
            },
            Diagnostic::Unresolved {
                order_id,
                kind,
                reason,
                ..
            } => write!(
                f,
                "unresolved {} for unknown order {} ({:?})",
                kind.label(),
                order_id,
                reason
            ),
            Diagnostic::ConflictingCreation { order_id } => {
                write!(f, "conflicting creation for order {}", order_id)
            }
        }
    }
}
