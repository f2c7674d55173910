//! Time windower
//!
//! Splits a series into contiguous chart windows. The window size depends on
//! the timeframe: each rendered chart holds roughly one "screen" of candles.

use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Candles per chart image for each known timeframe
pub const CANDLES_PER_IMAGE_1D: usize = 15;
pub const CANDLES_PER_IMAGE_4H: usize = 42;
pub const CANDLES_PER_IMAGE_1H: usize = 72;
pub const CANDLES_PER_IMAGE_DEFAULT: usize = 30;

/// Interval represented by one candle
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Timeframe {
    OneHour,
    FourHours,
    OneDay,
    /// Any interval without a dedicated window size
    Other(String),
}

impl Timeframe {
    pub fn as_str(&self) -> &str {
        match self {
            Timeframe::OneHour => "1h",
            Timeframe::FourHours => "4h",
            Timeframe::OneDay => "1d",
            Timeframe::Other(s) => s,
        }
    }

    pub fn candles_per_image(&self) -> usize {
        match self {
            Timeframe::OneDay => CANDLES_PER_IMAGE_1D,
            Timeframe::FourHours => CANDLES_PER_IMAGE_4H,
            Timeframe::OneHour => CANDLES_PER_IMAGE_1H,
            Timeframe::Other(_) => CANDLES_PER_IMAGE_DEFAULT,
        }
    }
}

impl FromStr for Timeframe {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "1h" => Timeframe::OneHour,
            "4h" => Timeframe::FourHours,
            "1d" => Timeframe::OneDay,
            other => Timeframe::Other(other.to_string()),
        })
    }
}

impl From<String> for Timeframe {
    fn from(s: String) -> Self {
        match s.as_str() {
            "1h" => Timeframe::OneHour,
            "4h" => Timeframe::FourHours,
            "1d" => Timeframe::OneDay,
            _ => Timeframe::Other(s),
        }
    }
}

impl From<Timeframe> for String {
    fn from(tf: Timeframe) -> Self {
        match tf {
            Timeframe::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Contiguous row range `[start, end)` of a series, rendered as one chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Window {
    /// Position in chronological order (0 = oldest)
    pub index: usize,
    pub start: usize,
    pub end: usize,
}

impl Window {
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    #[inline]
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// Number of windows for a series of `len` rows.
///
/// Rounds half to even. Never returns 0: a series shorter than half a window
/// still gets one window.
pub fn window_count(len: usize, timeframe: &Timeframe) -> usize {
    let per_image = timeframe.candles_per_image() as f64;
    let count = (len as f64 / per_image).round_ties_even() as usize;
    count.max(1)
}

/// Partition a series of `len` rows into chronologically ordered windows.
///
/// Every window but the last holds `round(len / count)` rows; the last one
/// runs to the end of the series and absorbs the rounding remainder.
pub fn partition(len: usize, timeframe: &Timeframe) -> Result<Vec<Window>> {
    if len == 0 {
        return Err(Error::EmptySeries);
    }

    let count = window_count(len, timeframe);
    let step = (len as f64 / count as f64).round_ties_even() as usize;

    let windows = (0..count)
        .map(|i| {
            let start = (i * step).min(len);
            let end = if i + 1 < count {
                ((i + 1) * step).min(len)
            } else {
                len
            };
            Window { index: i, start, end }
        })
        .collect();

    Ok(windows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeframe_parse() {
        assert_eq!("1h".parse::<Timeframe>().unwrap(), Timeframe::OneHour);
        assert_eq!("4h".parse::<Timeframe>().unwrap(), Timeframe::FourHours);
        assert_eq!("1d".parse::<Timeframe>().unwrap(), Timeframe::OneDay);
        assert_eq!(
            "15m".parse::<Timeframe>().unwrap(),
            Timeframe::Other("15m".to_string())
        );
    }

    #[test]
    fn test_timeframe_roundtrips_through_serde() {
        let json = serde_json::to_string(&Timeframe::FourHours).unwrap();
        assert_eq!(json, "\"4h\"");
        let back: Timeframe = serde_json::from_str("\"1wk\"").unwrap();
        assert_eq!(back, Timeframe::Other("1wk".to_string()));
    }

    #[test]
    fn test_candles_per_image() {
        assert_eq!(Timeframe::OneDay.candles_per_image(), 15);
        assert_eq!(Timeframe::FourHours.candles_per_image(), 42);
        assert_eq!(Timeframe::OneHour.candles_per_image(), 72);
        assert_eq!(Timeframe::Other("1wk".into()).candles_per_image(), 30);
    }

    #[test]
    fn test_daily_300_rows() {
        let windows = partition(300, &Timeframe::OneDay).unwrap();
        assert_eq!(windows.len(), 20);
        assert!(windows.iter().all(|w| w.len() == 15));
        assert_eq!(windows.last().unwrap().end, 300);
    }

    #[test]
    fn test_last_window_absorbs_remainder() {
        // 100 / 30 -> 3 windows, step round(33.3) = 33
        let windows = partition(100, &Timeframe::Other("1wk".into())).unwrap();
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0].range(), 0..33);
        assert_eq!(windows[1].range(), 33..66);
        assert_eq!(windows[2].range(), 66..100);
    }

    #[test]
    fn test_count_rounds_half_to_even() {
        // 2.5 -> 2, 3.5 -> 4
        assert_eq!(window_count(75, &Timeframe::Other("x".into())), 2);
        assert_eq!(window_count(105, &Timeframe::Other("x".into())), 4);
    }

    #[test]
    fn test_short_series_clamps_to_one_window() {
        let windows = partition(5, &Timeframe::OneHour).unwrap();
        assert_eq!(windows, vec![Window { index: 0, start: 0, end: 5 }]);
    }

    #[test]
    fn test_single_window_spans_series() {
        // 80 / 72 rounds to 1
        let windows = partition(80, &Timeframe::OneHour).unwrap();
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].range(), 0..80);
    }

    #[test]
    fn test_empty_series_is_error() {
        assert!(matches!(
            partition(0, &Timeframe::OneDay),
            Err(Error::EmptySeries)
        ));
    }
}
