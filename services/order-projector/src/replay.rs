//! Replay and verification engine
//!
//! Rebuilds a snapshot from a full event history and validates it via
//! checksums. Replay is deterministic: the same events in the same order
//! always produce the same snapshot and checksum.

use std::time::Instant;

use tracing::{error, info};

use crate::projector::Projector;
use crate::snapshot::Snapshot;
use crate::validation::ProjectorInput;

/// Metrics collected during replay.
#[derive(Debug, Clone)]
pub struct ReplayMetrics {
    /// Total events replayed, including rejected ones.
    pub events_replayed: u64,
    /// Events skipped as malformed.
    pub events_rejected: u64,
    /// Terminal events dropped without their order.
    pub unresolved: u64,
    /// Duration of replay in milliseconds.
    pub duration_ms: u128,
    /// Events per second during replay.
    pub events_per_second: f64,
    /// Snapshot checksum after replay.
    pub state_checksum: String,
}

/// Result of a replay operation.
#[derive(Debug)]
pub struct ReplayResult {
    pub snapshot: Snapshot,
    pub metrics: ReplayMetrics,
}

/// Errors during replay.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplayError {
    #[error("state checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },
}

/// Replays full histories through a projector.
pub struct ReplayEngine {
    projector: Projector,
    /// Expected snapshot checksum for validation (if known).
    expected_checksum: Option<String>,
}

impl ReplayEngine {
    pub fn new(projector: Projector) -> Self {
        Self {
            projector,
            expected_checksum: None,
        }
    }

    /// Set the expected snapshot checksum for post-replay validation.
    pub fn with_expected_checksum(mut self, checksum: String) -> Self {
        self.expected_checksum = Some(checksum);
        self
    }

    /// Replay a full history into a fresh snapshot.
    ///
    /// Bad events never fail the replay; only a checksum mismatch against
    /// [`ReplayEngine::with_expected_checksum`] does.
    pub fn replay<E>(&self, events: &[E]) -> Result<ReplayResult, ReplayError>
    where
        E: ProjectorInput + Clone,
    {
        let start = Instant::now();

        info!(event_count = events.len(), "Starting event replay");

        let snapshot = self.projector.replay(events.iter().cloned());

        let events_replayed = events.len() as u64;
        let duration_ms = start.elapsed().as_millis();
        let events_per_second = if duration_ms > 0 {
            (events_replayed as f64 / duration_ms as f64) * 1000.0
        } else {
            events_replayed as f64
        };

        let state_checksum = snapshot.checksum();

        if let Some(ref expected) = self.expected_checksum {
            if &state_checksum != expected {
                error!(
                    expected = %expected,
                    actual = %state_checksum,
                    "State checksum mismatch after replay"
                );
                return Err(ReplayError::ChecksumMismatch {
                    expected: expected.clone(),
                    actual: state_checksum,
                });
            }
        }

        let diagnostics = snapshot.diagnostics();
        let metrics = ReplayMetrics {
            events_replayed,
            events_rejected: diagnostics.iter().filter(|d| d.is_rejection()).count() as u64,
            unresolved: diagnostics.iter().filter(|d| d.is_unresolved()).count() as u64,
            duration_ms,
            events_per_second,
            state_checksum,
        };

        info!(
            events_replayed = metrics.events_replayed,
            events_rejected = metrics.events_rejected,
            unresolved = metrics.unresolved,
            duration_ms = metrics.duration_ms,
            eps = %format!("{:.0}", metrics.events_per_second),
            "Replay completed successfully"
        );

        Ok(ReplayResult { snapshot, metrics })
    }

    /// Check that projecting `events` in one batch and one at a time yield
    /// the same snapshot.
    pub fn verify_equivalence<E>(&self, events: &[E]) -> bool
    where
        E: ProjectorInput + Clone,
    {
        let batch = self.projector.replay(events.iter().cloned());
        let incremental = events.iter().cloned().fold(Snapshot::new(), |snapshot, event| {
            self.projector.apply(snapshot, std::iter::once(event))
        });

        let matches = batch == incremental;
        if !matches {
            error!(
                batch = %batch.checksum(),
                incremental = %incremental.checksum(),
                "Batch and incremental projections diverged"
            );
        }
        matches
    }
}

impl Default for ReplayEngine {
    fn default() -> Self {
        Self::new(Projector::with_defaults())
    }
}
