//! OHLCV candle aggregation
//!
//! Groups price samples into fixed-width time buckets. Bucket boundaries
//! are aligned to the Unix epoch (e.g. hourly candles open on the hour).
//! The series is sparse: a bucket without samples produces no candle, and
//! gap handling is left to the charting layer.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::numeric::Price;

/// A single `(timestamp, price, volume)` observation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSample {
    /// Ledger time, Unix seconds
    pub timestamp: i64,
    pub price: Price,
    pub volume: Decimal,
}

/// Standard candle timeframes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Timeframe {
    /// 1 minute
    M1,
    /// 5 minutes
    M5,
    /// 15 minutes
    M15,
    /// 30 minutes
    M30,
    /// 1 hour
    H1,
    /// 4 hours
    H4,
    /// 1 day
    D1,
    /// 1 week
    W1,
}

impl Timeframe {
    /// Duration of this timeframe in seconds.
    pub fn duration_secs(&self) -> i64 {
        match self {
            Timeframe::M1 => 60,
            Timeframe::M5 => 5 * 60,
            Timeframe::M15 => 15 * 60,
            Timeframe::M30 => 30 * 60,
            Timeframe::H1 => 3600,
            Timeframe::H4 => 4 * 3600,
            Timeframe::D1 => 86400,
            Timeframe::W1 => 7 * 86400,
        }
    }

    /// All standard timeframes.
    pub fn all() -> &'static [Timeframe] {
        &[
            Timeframe::M1,
            Timeframe::M5,
            Timeframe::M15,
            Timeframe::M30,
            Timeframe::H1,
            Timeframe::H4,
            Timeframe::D1,
            Timeframe::W1,
        ]
    }
}

/// Width of a candle bucket in seconds. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BucketWidth(i64);

impl BucketWidth {
    /// Returns `None` for zero or negative widths.
    pub fn seconds(secs: i64) -> Option<Self> {
        (secs > 0).then_some(Self(secs))
    }

    pub fn as_secs(&self) -> i64 {
        self.0
    }

    /// Floor a timestamp to the start of its bucket.
    pub fn align(&self, timestamp: i64) -> i64 {
        timestamp.div_euclid(self.0) * self.0
    }
}

impl From<Timeframe> for BucketWidth {
    fn from(tf: Timeframe) -> Self {
        Self(tf.duration_secs())
    }
}

/// A single OHLCV candle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
    pub open_time: i64,
    pub close_time: i64,
    pub trade_count: u64,
}

impl Candle {
    /// Create a new candle from the first sample in this bucket.
    fn new(price: Decimal, volume: Decimal, open_time: i64, width: BucketWidth) -> Self {
        Self {
            open: price,
            high: price,
            low: price,
            close: price,
            volume,
            open_time,
            close_time: open_time.saturating_add(width.as_secs() - 1),
            trade_count: 1,
        }
    }

    /// Update the candle with a later sample.
    fn update(&mut self, price: Decimal, volume: Decimal) {
        if price > self.high {
            self.high = price;
        }
        if price < self.low {
            self.low = price;
        }
        self.close = price;
        self.volume += volume;
        self.trade_count += 1;
    }

    /// Validate candle integrity (OHLCV invariants).
    pub fn is_valid(&self) -> bool {
        self.high >= self.open
            && self.high >= self.close
            && self.high >= self.low
            && self.low <= self.open
            && self.low <= self.close
            && self.volume >= Decimal::ZERO
            && self.close_time >= self.open_time
    }

    pub fn open_time_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.open_time, 0)
    }
}

/// Aggregate samples into chronological candles.
///
/// Samples are stably sorted by timestamp first, so samples sharing a
/// timestamp keep their input order when deciding open and close.
pub fn aggregate(samples: &[PriceSample], width: BucketWidth) -> Vec<Candle> {
    let mut ordered: Vec<&PriceSample> = samples.iter().collect();
    ordered.sort_by_key(|s| s.timestamp);

    let mut candles: Vec<Candle> = Vec::new();
    for sample in ordered {
        let open_time = width.align(sample.timestamp);
        let price = sample.price.as_decimal();
        match candles.last_mut() {
            Some(candle) if candle.open_time == open_time => candle.update(price, sample.volume),
            _ => candles.push(Candle::new(price, sample.volume, open_time, width)),
        }
    }
    candles
}
