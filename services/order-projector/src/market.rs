//! Market views over a snapshot
//!
//! Presents the snapshot for one base/quote pair the way an exchange UI
//! shows it: an order book split into bids and asks, a trade tape with
//! up/down ticks, per-account views and a price chart.
//!
//! Prices here are normalized to quote per base, whichever side the order
//! is on. The raw [`Snapshot::price_series`] instead uses
//! `amount_give / amount_get`, which agrees with this view for buy orders
//! only.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::ids::{AccountId, TokenId};
use types::numeric::{Amount, Price, DEFAULT_PRICE_SCALE};
use types::order::{Fill, Order, Side};

use crate::candles::{self, BucketWidth, Candle, PriceSample};
use crate::config::{ConfigError, ProjectorConfig};
use crate::snapshot::Snapshot;

/// Display format for trade times, e.g. `3:04:05 PM 2/17`.
const TIME_FORMAT: &str = "%-I:%M:%S %p %-m/%-d";

/// A base/quote trading pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    pub base: TokenId,
    pub quote: TokenId,
    /// Decimal places for display prices.
    pub price_scale: u32,
}

/// An order seen from a market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketOrder {
    pub order: Order,
    pub side: Side,
    pub base_amount: Amount,
    pub quote_amount: Amount,
    /// Quote per base at full precision.
    pub price: Price,
    /// `price` rounded half-up to the market's scale.
    pub display_price: Decimal,
}

/// Open orders split by side, best price first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBookView {
    /// Descending price.
    pub bids: Vec<MarketOrder>,
    /// Ascending price.
    pub asks: Vec<MarketOrder>,
}

impl OrderBookView {
    pub fn best_bid(&self) -> Option<&MarketOrder> {
        self.bids.first()
    }

    pub fn best_ask(&self) -> Option<&MarketOrder> {
        self.asks.first()
    }

    /// `best_ask - best_bid`, when both sides exist.
    pub fn spread(&self) -> Option<Decimal> {
        Some(self.best_ask()?.price.as_decimal() - self.best_bid()?.price.as_decimal())
    }
}

/// Direction of a trade price against the previous trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tick {
    /// At or above the previous price; also the first trade.
    Up,
    Down,
}

/// A filled order on the market's trade tape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketTrade {
    pub order: MarketOrder,
    pub fill: Fill,
    pub tick: Tick,
}

impl MarketTrade {
    /// Fill time rendered in UTC for trade tables.
    pub fn formatted_time(&self) -> Option<String> {
        chrono::DateTime::from_timestamp(self.fill.ledger_timestamp, 0)
            .map(|t| t.format(TIME_FORMAT).to_string())
    }
}

/// A trade seen from one participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountTrade {
    pub trade: MarketTrade,
    /// The account's side: the creator keeps the order's side, the filler
    /// takes the opposite.
    pub side: Side,
}

/// Latest price and chart data for a market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSummary {
    pub last_price: Option<Decimal>,
    pub last_change: Option<Tick>,
    pub candles: Vec<Candle>,
}

impl Market {
    pub fn new(base: TokenId, quote: TokenId) -> Result<Self, ConfigError> {
        if base == quote {
            return Err(ConfigError::SameMarketTokens(base.to_string()));
        }
        Ok(Self {
            base,
            quote,
            price_scale: DEFAULT_PRICE_SCALE,
        })
    }

    /// A market displaying prices at the projector's configured scale.
    pub fn from_config(
        base: TokenId,
        quote: TokenId,
        config: &ProjectorConfig,
    ) -> Result<Self, ConfigError> {
        Ok(Self::new(base, quote)?.with_price_scale(config.price_scale))
    }

    /// A token traded against the chain's native coin.
    pub fn against_native(base: TokenId) -> Result<Self, ConfigError> {
        Self::new(base, TokenId::native())
    }

    pub fn with_price_scale(mut self, scale: u32) -> Self {
        self.price_scale = scale;
        self
    }

    /// Side of `order` in this market, or `None` for other pairs.
    pub fn side_of(&self, order: &Order) -> Option<Side> {
        if order.token_give == self.quote && order.token_get == self.base {
            Some(Side::Buy)
        } else if order.token_give == self.base && order.token_get == self.quote {
            Some(Side::Sell)
        } else {
            None
        }
    }

    /// Decorate an order for this market.
    pub fn decorate(&self, order: &Order) -> Option<MarketOrder> {
        let side = self.side_of(order)?;
        let (base_amount, quote_amount) = match side {
            Side::Buy => (order.amount_get, order.amount_give),
            Side::Sell => (order.amount_give, order.amount_get),
        };
        let price = Price::ratio(quote_amount, base_amount);
        Some(MarketOrder {
            order: order.clone(),
            side,
            base_amount,
            quote_amount,
            price,
            display_price: price.rounded(self.price_scale),
        })
    }

    pub fn order_book(&self, snapshot: &Snapshot) -> OrderBookView {
        let mut book = OrderBookView::default();
        for order in snapshot.open_orders().values() {
            if let Some(decorated) = self.decorate(order) {
                match decorated.side {
                    Side::Buy => book.bids.push(decorated),
                    Side::Sell => book.asks.push(decorated),
                }
            }
        }
        book.bids
            .sort_by(|a, b| b.price.cmp(&a.price).then(a.order.id.cmp(&b.order.id)));
        book.asks
            .sort_by(|a, b| a.price.cmp(&b.price).then(a.order.id.cmp(&b.order.id)));
        book
    }

    /// Filled orders of this market in fill order.
    pub fn trades(&self, snapshot: &Snapshot) -> Vec<MarketTrade> {
        let mut previous: Option<Price> = None;
        snapshot
            .filled_orders()
            .iter()
            .filter_map(|filled| {
                let order = self.decorate(&filled.order)?;
                let tick = match previous {
                    Some(prev) if order.price < prev => Tick::Down,
                    _ => Tick::Up,
                };
                previous = Some(order.price);
                Some(MarketTrade {
                    order,
                    fill: filled.fill.clone(),
                    tick,
                })
            })
            .collect()
    }

    /// Open orders created by `account`, by id.
    pub fn account_open_orders(&self, snapshot: &Snapshot, account: &AccountId) -> Vec<MarketOrder> {
        snapshot
            .open_orders()
            .values()
            .filter(|order| &order.creator == account)
            .filter_map(|order| self.decorate(order))
            .collect()
    }

    /// Trades where `account` created or filled the order, in fill order.
    pub fn account_trades(&self, snapshot: &Snapshot, account: &AccountId) -> Vec<AccountTrade> {
        self.trades(snapshot)
            .into_iter()
            .filter_map(|trade| {
                let side = if &trade.order.order.creator == account {
                    trade.order.side
                } else if &trade.fill.filler == account {
                    trade.order.side.opposite()
                } else {
                    return None;
                };
                Some(AccountTrade { trade, side })
            })
            .collect()
    }

    /// Last trade price, its tick, and candles of normalized prices with
    /// base-amount volume.
    pub fn price_summary(&self, snapshot: &Snapshot, width: BucketWidth) -> PriceSummary {
        let trades = self.trades(snapshot);
        let samples: Vec<PriceSample> = trades
            .iter()
            .map(|t| PriceSample {
                timestamp: t.fill.ledger_timestamp,
                price: t.order.price,
                volume: t.order.base_amount.as_decimal(),
            })
            .collect();

        let last = trades.last();
        PriceSummary {
            last_price: last.map(|t| t.order.display_price),
            last_change: last.map(|t| t.tick),
            candles: candles::aggregate(&samples, width),
        }
    }
}
