//! Determinism tests for the order projector
//!
//! Validates that projections depend only on the events applied, never on
//! how they were batched:
//! - Reference scenarios for fills, cancellations and unresolved terminals
//! - Idempotence under duplicate delivery
//! - Batch vs incremental equivalence
//! - Partition invariant and fill order preservation

use order_projector::candles::Timeframe;
use order_projector::config::ProjectorConfig;
use order_projector::diagnostics::{Diagnostic, UnresolvedReason};
use order_projector::events::{DomainEvent, EventKind, RawEvent};
use order_projector::replay::ReplayEngine;
use order_projector::{Projector, Snapshot};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use types::ids::{AccountId, OrderId, TokenId};
use types::numeric::Amount;
use types::order::{Cancellation, Fill, Order};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn token_a() -> TokenId {
    TokenId::try_new("0xaaaa").unwrap()
}

fn token_b() -> TokenId {
    TokenId::try_new("0xbbbb").unwrap()
}

fn created_with(id: u64, amount_get: &str, amount_give: &str, ts: i64) -> DomainEvent {
    DomainEvent::Created(
        Order::new(
            OrderId::new(id),
            AccountId::try_new("0xmaker").unwrap(),
            token_a(),
            Amount::parse(amount_get).unwrap(),
            token_b(),
            Amount::parse(amount_give).unwrap(),
            ts,
        )
        .unwrap(),
    )
}

fn created(id: u64, ts: i64) -> DomainEvent {
    created_with(id, "1", "2", ts)
}

fn filled(id: u64, ts: i64) -> DomainEvent {
    DomainEvent::Filled(Fill {
        order_id: OrderId::new(id),
        filler: AccountId::try_new("0xtaker").unwrap(),
        ledger_timestamp: ts,
    })
}

fn cancelled(id: u64, ts: i64) -> DomainEvent {
    DomainEvent::Cancelled(Cancellation {
        order_id: OrderId::new(id),
        cancelled_by: Some(AccountId::try_new("0xmaker").unwrap()),
        ledger_timestamp: ts,
    })
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Test 1: Creation followed by a fill closes the order.
#[test]
fn test_created_then_filled() {
    init_tracing();
    let projector = Projector::with_defaults();
    let snapshot = projector.replay(vec![created(1, 100), filled(1, 110)]);

    assert!(snapshot.open_orders().is_empty());
    let filled_ids: Vec<OrderId> = snapshot.filled_orders().iter().map(|f| f.order.id).collect();
    assert_eq!(filled_ids, vec![OrderId::new(1)]);
    assert_eq!(snapshot.filled_orders()[0].order.price().as_decimal(), dec("2"));
}

/// Test 2: A duplicate creation after cancellation changes nothing.
#[test]
fn test_duplicate_creation_after_cancellation() {
    let projector = Projector::with_defaults();
    let before = projector.replay(vec![created(1, 100), cancelled(1, 110)]);
    let after = projector.apply(before.clone(), vec![created(1, 100)]);

    assert_eq!(after.cancelled_ids().collect::<Vec<_>>(), vec![OrderId::new(1)]);
    assert!(after.open_orders().is_empty());
    assert_eq!(before, after);
}

/// Test 3: A fill for an id never created ends up unresolved.
#[test]
fn test_unknown_fill_reported_unresolved() {
    let projector = Projector::new(ProjectorConfig {
        pending_retention_secs: 600,
        ..ProjectorConfig::default()
    })
    .unwrap();
    let snapshot = projector.replay(vec![filled(99, 1_000)]);
    assert!(snapshot.diagnostics().is_empty());

    let snapshot = projector.apply(snapshot, vec![created(1, 1_601), created(2, 1_700)]);

    assert_eq!(snapshot.status_of(OrderId::new(99)), None);
    assert!(snapshot.order(OrderId::new(99)).is_none());
    assert_eq!(
        snapshot.diagnostics(),
        &[Diagnostic::Unresolved {
            order_id: OrderId::new(99),
            kind: EventKind::Filled,
            ledger_timestamp: 1_000,
            reason: UnresolvedReason::RetentionExpired,
        }]
    );
}

/// Test 4: Two fills in one hour form a single candle.
#[test]
fn test_hourly_candle_from_fills() {
    let hour = 1_708_120_800; // aligned to the hour
    let projector = Projector::with_defaults();
    let snapshot = projector.replay(vec![
        created_with(1, "10", "5", hour),
        created_with(2, "5", "3.5", hour + 1),
        filled(1, hour + 60),
        filled(2, hour + 1_800),
    ]);

    let candles = snapshot.candles(Timeframe::H1.into());
    assert_eq!(candles.len(), 1);
    let candle = &candles[0];
    assert_eq!(candle.open, dec("0.5"));
    assert_eq!(candle.high, dec("0.7"));
    assert_eq!(candle.low, dec("0.5"));
    assert_eq!(candle.close, dec("0.7"));
    assert_eq!(candle.volume, dec("15"));
    assert_eq!(candle.open_time, hour);
}

/// Test 4b: Fills at the far end of the timestamp range still chart.
#[test]
fn test_candles_near_max_timestamp() {
    let ts = i64::MAX - 10;
    let snapshot = Projector::with_defaults().replay(vec![created(1, ts), filled(1, ts)]);

    let candles = snapshot.candles(Timeframe::H1.into());
    assert_eq!(candles.len(), 1);
    assert_eq!(candles[0].close_time, i64::MAX);
    assert!(candles[0].is_valid());
}

/// Test 5: One bad event does not blank the book.
#[test]
fn test_partial_failure_tolerance() {
    let json = r#"[
        {"kind": "Created", "orderId": 1, "creator": "0xmaker", "tokenGet": "0xaaaa",
         "amountGet": "1", "tokenGive": "0xbbbb", "amountGive": "2", "ledgerTimestamp": 10},
        {"kind": "Created", "orderId": 2, "creator": "0xmaker", "tokenGet": "0xaaaa",
         "amountGet": "-1", "tokenGive": "0xbbbb", "amountGive": "2", "ledgerTimestamp": 11},
        {"kind": "Created", "orderId": 3, "tokenGet": "0xaaaa",
         "amountGet": "1", "tokenGive": "0xbbbb", "amountGive": "2", "ledgerTimestamp": 12},
        {"kind": "Created", "orderId": 4, "creator": "0xmaker", "tokenGet": "0xaaaa",
         "amountGet": "3", "tokenGive": "0xbbbb", "amountGive": "1", "ledgerTimestamp": 13}
    ]"#;
    let events = RawEvent::from_json_batch(json).unwrap();
    let snapshot = Projector::with_defaults().replay(events);

    let open: Vec<u64> = snapshot.open_orders().keys().map(|id| id.as_u64()).collect();
    assert_eq!(open, vec![1, 4]);
    assert_eq!(snapshot.diagnostics().len(), 2);
    assert!(snapshot.diagnostics().iter().all(Diagnostic::is_rejection));
}

/// Test 6: Replay engine verifies batch and incremental agree on a mixed
/// history.
#[test]
fn test_replay_engine_equivalence() {
    let events = vec![
        created(1, 10),
        created(2, 11),
        cancelled(4, 12),
        filled(1, 13),
        created(3, 14),
        created(4, 15),
        cancelled(2, 16),
        filled(3, 17),
    ];
    let engine = ReplayEngine::default();
    assert!(engine.verify_equivalence(&events));

    let result = engine.replay(&events).unwrap();
    assert!(result.snapshot.is_partitioned());
    assert_eq!(result.snapshot.filled_orders().len(), 2);
    assert_eq!(result.snapshot.cancelled_orders().len(), 2);
}

// ── Property-Based Tests ────────────────────────────────────────────

/// Amounts depend only on the id; a repeated creation at another time
/// conflicts with the first.
fn event_from(kind: u8, id: u64, ts: i64) -> DomainEvent {
    match kind {
        0 => created_with(id, &(id + 1).to_string(), &(2 * id + 3).to_string(), ts),
        1 => filled(id, ts),
        _ => cancelled(id, ts),
    }
}

fn events_strategy() -> impl Strategy<Value = Vec<DomainEvent>> {
    prop::collection::vec((0u8..3, 1u64..10, 0i64..200), 0..60).prop_map(|raw| {
        let mut clock = 1_000;
        raw.into_iter()
            .map(|(kind, id, step)| {
                clock += step;
                event_from(kind, id, clock)
            })
            .collect()
    })
}

fn small_window() -> Projector {
    Projector::new(ProjectorConfig {
        pending_retention_secs: 500,
        max_pending: 4,
        ..ProjectorConfig::default()
    })
    .unwrap()
}

proptest! {
    #[test]
    fn prop_batch_equals_incremental(events in events_strategy()) {
        let projector = small_window();
        let batch = projector.replay(events.clone());
        let incremental = events
            .into_iter()
            .fold(Snapshot::new(), |s, e| projector.apply(s, [e]));
        prop_assert_eq!(batch, incremental);
    }

    #[test]
    fn prop_split_batches_equal_single_batch(events in events_strategy(), split in 0usize..60) {
        let projector = small_window();
        let split = split.min(events.len());
        let (head, tail) = events.split_at(split);

        let whole = projector.replay(events.clone());
        let first = projector.replay(head.to_vec());
        let joined = projector.apply(first, tail.to_vec());
        prop_assert_eq!(whole.checksum(), joined.checksum());
        prop_assert_eq!(whole, joined);
    }

    #[test]
    fn prop_applying_twice_is_idempotent(events in events_strategy(), extra in (0u8..3, 1u64..10, 0i64..200)) {
        let projector = small_window();
        let base = projector.replay(events);
        let clock = base.last_ledger_timestamp().unwrap_or(1_000) + extra.2;
        let event = event_from(extra.0, extra.1, clock);

        let once = projector.apply(base, [event.clone()]);
        let twice = projector.apply(once.clone(), [event]);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_partition_invariant_holds(events in events_strategy()) {
        let projector = small_window();
        let mut snapshot = Snapshot::new();
        for event in events {
            snapshot = projector.apply(snapshot, [event]);
            prop_assert!(snapshot.is_partitioned());
        }
    }

    #[test]
    fn prop_filled_orders_only_grow_at_the_end(events in events_strategy()) {
        let projector = small_window();
        let mut snapshot = Snapshot::new();
        for event in events {
            let before: Vec<OrderId> =
                snapshot.filled_orders().iter().map(|f| f.order.id).collect();
            snapshot = projector.apply(snapshot, [event]);
            let after: Vec<OrderId> =
                snapshot.filled_orders().iter().map(|f| f.order.id).collect();
            prop_assert!(after.starts_with(&before));
            prop_assert!(after.len() <= before.len() + 1);
        }
    }

    #[test]
    fn prop_candles_are_valid(events in events_strategy()) {
        let snapshot = small_window().replay(events);
        let candles = snapshot.candles(Timeframe::M1.into());
        let total_trades: u64 = candles.iter().map(|c| c.trade_count).sum();
        prop_assert_eq!(total_trades as usize, snapshot.filled_orders().len());
        for pair in candles.windows(2) {
            prop_assert!(pair[0].open_time < pair[1].open_time);
        }
        for candle in &candles {
            prop_assert!(candle.is_valid());
        }
    }
}
