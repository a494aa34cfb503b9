//! Boundary validation
//!
//! Turns wire events into [`DomainEvent`]s before they reach the projector.
//! Rejects missing required fields, empty identities, unparsable or
//! non-positive amounts, negative timestamps and orders that trade a token
//! for itself.

use types::errors::EventError;
use types::ids::{AccountId, OrderId, TokenId};
use types::numeric::Amount;
use types::order::{Cancellation, Fill, Order};

use crate::config::AmountFormat;
use crate::events::{DomainEvent, EventKind, RawEvent};

/// Anything the projector accepts as input.
///
/// Implemented for validated [`DomainEvent`]s, raw wire events, and the
/// per-element results of [`RawEvent::from_json_batch`].
pub trait ProjectorInput {
    /// Order id carried by the input, for diagnostics on rejection.
    fn order_hint(&self) -> Option<OrderId>;

    /// Event kind carried by the input, for diagnostics on rejection.
    fn kind_hint(&self) -> Option<EventKind>;

    /// Validate into a domain event.
    fn into_domain(self, format: AmountFormat) -> Result<DomainEvent, EventError>;
}

impl ProjectorInput for DomainEvent {
    fn order_hint(&self) -> Option<OrderId> {
        Some(self.order_id())
    }

    fn kind_hint(&self) -> Option<EventKind> {
        Some(self.kind())
    }

    fn into_domain(self, _format: AmountFormat) -> Result<DomainEvent, EventError> {
        Ok(self)
    }
}

impl ProjectorInput for RawEvent {
    fn order_hint(&self) -> Option<OrderId> {
        self.order_id()
    }

    fn kind_hint(&self) -> Option<EventKind> {
        Some(self.kind())
    }

    fn into_domain(self, format: AmountFormat) -> Result<DomainEvent, EventError> {
        validate(self, format)
    }
}

impl ProjectorInput for Result<RawEvent, EventError> {
    fn order_hint(&self) -> Option<OrderId> {
        self.as_ref().ok().and_then(RawEvent::order_id)
    }

    fn kind_hint(&self) -> Option<EventKind> {
        self.as_ref().ok().map(RawEvent::kind)
    }

    fn into_domain(self, format: AmountFormat) -> Result<DomainEvent, EventError> {
        self.and_then(|raw| validate(raw, format))
    }
}

/// Validate a raw event.
pub fn validate(raw: RawEvent, format: AmountFormat) -> Result<DomainEvent, EventError> {
    match raw {
        RawEvent::Created {
            order_id,
            creator,
            token_get,
            amount_get,
            token_give,
            amount_give,
            ledger_timestamp,
        } => {
            let order = Order::new(
                OrderId::new(require(order_id, "orderId")?),
                account(require(creator, "creator")?, "creator")?,
                token(require(token_get, "tokenGet")?, "tokenGet")?,
                amount(&require(amount_get, "amountGet")?, "amountGet", format)?,
                token(require(token_give, "tokenGive")?, "tokenGive")?,
                amount(&require(amount_give, "amountGive")?, "amountGive", format)?,
                timestamp(ledger_timestamp)?,
            )?;
            Ok(DomainEvent::Created(order))
        }
        RawEvent::Filled {
            order_id,
            filler,
            ledger_timestamp,
        } => Ok(DomainEvent::Filled(Fill {
            order_id: OrderId::new(require(order_id, "orderId")?),
            filler: account(require(filler, "filler")?, "filler")?,
            ledger_timestamp: timestamp(ledger_timestamp)?,
        })),
        RawEvent::Cancelled {
            order_id,
            cancelled_by,
            ledger_timestamp,
        } => Ok(DomainEvent::Cancelled(Cancellation {
            order_id: OrderId::new(require(order_id, "orderId")?),
            cancelled_by: cancelled_by
                .map(|by| account(by, "cancelledBy"))
                .transpose()?,
            ledger_timestamp: timestamp(ledger_timestamp)?,
        })),
    }
}

fn require<T>(value: Option<T>, field: &'static str) -> Result<T, EventError> {
    value.ok_or(EventError::MissingField { field })
}

fn account(value: String, field: &'static str) -> Result<AccountId, EventError> {
    AccountId::try_new(value).map_err(|_| EventError::EmptyIdentity { field })
}

fn token(value: String, field: &'static str) -> Result<TokenId, EventError> {
    TokenId::try_new(value).map_err(|_| EventError::EmptyIdentity { field })
}

fn amount(value: &str, field: &'static str, format: AmountFormat) -> Result<Amount, EventError> {
    let parsed = match format {
        AmountFormat::Decimal => Amount::parse(value),
        AmountFormat::BaseUnits { decimals } => Amount::from_base_units(value, decimals),
    };
    parsed.map_err(|e| EventError::from_amount(field, e))
}

fn timestamp(value: Option<i64>) -> Result<i64, EventError> {
    let ts = require(value, "ledgerTimestamp")?;
    if ts < 0 {
        return Err(EventError::NegativeTimestamp { value: ts });
    }
    Ok(ts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn raw_created(amount_get: Option<&str>, amount_give: Option<&str>) -> RawEvent {
        RawEvent::Created {
            order_id: Some(1),
            creator: Some("0xmaker".to_string()),
            token_get: Some("0xtoken".to_string()),
            amount_get: amount_get.map(str::to_string),
            token_give: Some(TokenId::NATIVE_ADDRESS.to_string()),
            amount_give: amount_give.map(str::to_string),
            ledger_timestamp: Some(1_000),
        }
    }

    #[test]
    fn test_valid_created() {
        let event = validate(raw_created(Some("1"), Some("2")), AmountFormat::Decimal).unwrap();
        match event {
            DomainEvent::Created(order) => {
                assert_eq!(order.id, OrderId::new(1));
                assert_eq!(order.price().as_decimal(), Decimal::from(2));
            }
            other => panic!("Expected Created, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_amount_rejected() {
        let err = validate(raw_created(None, Some("2")), AmountFormat::Decimal).unwrap_err();
        assert_eq!(err, EventError::MissingField { field: "amountGet" });
    }

    #[test]
    fn test_non_positive_amount_rejected() {
        let err = validate(raw_created(Some("1"), Some("0")), AmountFormat::Decimal).unwrap_err();
        assert_eq!(
            err,
            EventError::NonPositiveAmount {
                field: "amountGive",
                value: "0".to_string()
            }
        );

        let err = validate(raw_created(Some("-3"), Some("1")), AmountFormat::Decimal).unwrap_err();
        assert!(matches!(err, EventError::NonPositiveAmount { field: "amountGet", .. }));
    }

    #[test]
    fn test_base_unit_amounts() {
        let format = AmountFormat::BaseUnits { decimals: 18 };
        let event = validate(
            raw_created(Some("1000000000000000000"), Some("500000000000000000")),
            format,
        )
        .unwrap();
        match event {
            DomainEvent::Created(order) => {
                assert_eq!(order.amount_get.as_decimal(), Decimal::ONE);
                assert_eq!(order.price().as_decimal(), Decimal::new(5, 1));
            }
            other => panic!("Expected Created, got {:?}", other),
        }

        // Decimal strings are not base units.
        let err = validate(raw_created(Some("1.5"), Some("1")), format).unwrap_err();
        assert!(matches!(err, EventError::InvalidAmount { field: "amountGet", .. }));
    }

    #[test]
    fn test_fill_requires_filler() {
        let raw = RawEvent::Filled {
            order_id: Some(1),
            filler: None,
            ledger_timestamp: Some(10),
        };
        assert_eq!(
            validate(raw, AmountFormat::Decimal).unwrap_err(),
            EventError::MissingField { field: "filler" }
        );
    }

    #[test]
    fn test_cancel_without_actor_is_valid() {
        let raw = RawEvent::Cancelled {
            order_id: Some(1),
            cancelled_by: None,
            ledger_timestamp: Some(10),
        };
        let event = validate(raw, AmountFormat::Decimal).unwrap();
        assert_eq!(event.kind(), EventKind::Cancelled);
    }

    #[test]
    fn test_bad_identity_and_timestamp_rejected() {
        let raw = RawEvent::Cancelled {
            order_id: Some(1),
            cancelled_by: Some("".to_string()),
            ledger_timestamp: Some(10),
        };
        assert_eq!(
            validate(raw, AmountFormat::Decimal).unwrap_err(),
            EventError::EmptyIdentity { field: "cancelledBy" }
        );

        let raw = RawEvent::Filled {
            order_id: Some(1),
            filler: Some("0xtaker".to_string()),
            ledger_timestamp: Some(-1),
        };
        assert_eq!(
            validate(raw, AmountFormat::Decimal).unwrap_err(),
            EventError::NegativeTimestamp { value: -1 }
        );
    }

    #[test]
    fn test_same_token_rejected() {
        let raw = RawEvent::Created {
            order_id: Some(1),
            creator: Some("0xmaker".to_string()),
            token_get: Some("0xtoken".to_string()),
            amount_get: Some("1".to_string()),
            token_give: Some("0xtoken".to_string()),
            amount_give: Some("1".to_string()),
            ledger_timestamp: Some(1),
        };
        assert!(matches!(
            validate(raw, AmountFormat::Decimal).unwrap_err(),
            EventError::SameToken { .. }
        ));
    }

    #[test]
    fn test_input_hints() {
        let raw = raw_created(Some("1"), None);
        assert_eq!(raw.order_hint(), Some(OrderId::new(1)));
        assert_eq!(raw.kind_hint(), Some(EventKind::Created));

        let undecodable: Result<RawEvent, EventError> = Err(EventError::Undecodable {
            reason: "bad".to_string(),
        });
        assert_eq!(undecodable.order_hint(), None);
        assert!(undecodable.into_domain(AmountFormat::Decimal).is_err());
    }
}
