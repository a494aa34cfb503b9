//! Order Projector
//!
//! Rebuilds the read model of a token exchange from the immutable events
//! its contract emits:
//! - Open orders, filled orders (trades) and cancelled orders
//! - Price series and OHLCV candles from fills
//! - Market views: order book by side, trade tape, per-account history
//!
//! The projector is a pure fold: `apply(snapshot, events) -> snapshot`.
//! The caller owns the snapshot and serializes calls; nothing here performs
//! I/O.
//!
//! # Architecture
//!
//! ```text
//!   Event Source (raw events)
//!        │
//!   ┌────▼─────┐
//!   │Validation│  ← Rejects malformed events into diagnostics
//!   └────┬─────┘
//!        │
//!   ┌────▼─────┐     ┌────────┐
//!   │Projector │ ◄──►│Pending │  ← Terminal events awaiting creation
//!   └────┬─────┘     └────────┘
//!        │
//!   ┌────▼─────┐
//!   │ Snapshot │
//!   └────┬─────┘
//!        │
//!   ┌────┴─────┬──────────┐
//! ┌─▼────┐ ┌───▼───┐ ┌────▼───┐
//! │Market│ │Candles│ │ Replay │
//! └──────┘ └───────┘ └────────┘
//! ```

pub mod candles;
pub mod config;
pub mod diagnostics;
pub mod events;
pub mod market;
pub mod pending;
pub mod projector;
pub mod replay;
pub mod snapshot;
pub mod validation;

pub use config::ProjectorConfig;
pub use events::{DomainEvent, RawEvent};
pub use projector::Projector;
pub use snapshot::Snapshot;

// Library version
pub const SERVICE_VERSION: &str = "0.1.0";
