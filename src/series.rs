//! Time-indexed price data
//!
//! A [`PriceSeries`] is the validated input of a scan: non-empty, every candle
//! consistent, timestamps strictly increasing.

use chrono::NaiveDateTime;

use crate::{Error, OHLCVExt, Result, OHLCV};

/// One OHLCV record keyed by its (timezone-stripped) open time
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Candle {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl Candle {
    pub fn new(
        timestamp: NaiveDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

impl OHLCV for Candle {
    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }

    fn volume(&self) -> f64 {
        self.volume
    }
}

/// Ordered, immutable sequence of candles
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    candles: Vec<Candle>,
}

impl PriceSeries {
    /// Build a series, rejecting empty input, inconsistent candles and
    /// timestamps that are not strictly increasing.
    pub fn new(candles: Vec<Candle>) -> Result<Self> {
        if candles.is_empty() {
            return Err(Error::EmptySeries);
        }

        for (i, candle) in candles.iter().enumerate() {
            candle.validate().map_err(|e| match e {
                Error::InvalidCandle { reason, .. } => Error::InvalidCandle { index: i, reason },
                other => other,
            })?;
        }

        if let Some(i) = candles
            .windows(2)
            .position(|pair| pair[1].timestamp <= pair[0].timestamp)
        {
            return Err(Error::UnorderedTimestamps { index: i + 1 });
        }

        Ok(Self { candles })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    /// Always false: construction rejects empty input.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    #[inline]
    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    pub fn first(&self) -> &Candle {
        &self.candles[0]
    }

    pub fn last(&self) -> &Candle {
        &self.candles[self.candles.len() - 1]
    }
}

impl std::ops::Index<std::ops::Range<usize>> for PriceSeries {
    type Output = [Candle];

    fn index(&self, range: std::ops::Range<usize>) -> &[Candle] {
        &self.candles[range]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeDelta};

    fn ts(day: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + TimeDelta::days(day)
    }

    fn candle(day: i64) -> Candle {
        Candle::new(ts(day), 10.0, 12.0, 9.0, 11.0, 1000.0)
    }

    #[test]
    fn test_series_accepts_ordered_candles() {
        let series = PriceSeries::new((0..5).map(candle).collect()).unwrap();
        assert_eq!(series.len(), 5);
        assert_eq!(series.first().timestamp, ts(0));
        assert_eq!(series.last().timestamp, ts(4));
        assert_eq!(series[1..3].len(), 2);
    }

    #[test]
    fn test_series_rejects_empty() {
        assert!(matches!(PriceSeries::new(vec![]), Err(Error::EmptySeries)));
    }

    #[test]
    fn test_series_rejects_duplicate_timestamp() {
        let candles = vec![candle(0), candle(1), candle(1)];
        assert!(matches!(
            PriceSeries::new(candles),
            Err(Error::UnorderedTimestamps { index: 2 })
        ));
    }

    #[test]
    fn test_series_reports_bad_candle_index() {
        let mut candles: Vec<Candle> = (0..4).map(candle).collect();
        candles[3].high = 1.0;
        assert!(matches!(
            PriceSeries::new(candles),
            Err(Error::InvalidCandle { index: 3, .. })
        ));
    }
}
