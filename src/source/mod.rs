//! Price data sources
//!
//! Where the candles come from is outside the scanner's concern; a
//! [`PriceSource`] hides it behind a typed, fallible fetch.

pub mod csv;

pub use self::csv::CsvPriceSource;

use chrono::{NaiveDateTime, TimeDelta};

use crate::series::PriceSeries;
use crate::window::Timeframe;
use crate::Period;

/// Errors from fetching a price series
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Unknown symbol: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("No {symbol} data between {start} and {end}")]
    EmptyRange {
        symbol: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("Network failure: {0}")]
    Network(String),

    #[error("Malformed price data at line {line}: {reason}")]
    Parse { line: u64, reason: String },

    #[error("Price data rejected: {0}")]
    InvalidSeries(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// What to fetch: one symbol, one interval, an inclusive time range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub symbol: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub timeframe: Timeframe,
}

impl FetchRequest {
    /// The `period` days before `now`. The symbol is upper-cased.
    pub fn lookback(
        symbol: &str,
        period: Period,
        timeframe: Timeframe,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            symbol: symbol.trim().to_uppercase(),
            start: now - TimeDelta::days(i64::from(period.get())),
            end: now,
            timeframe,
        }
    }
}

/// Fetches historical candles
pub trait PriceSource {
    fn fetch(&self, request: &FetchRequest) -> Result<PriceSeries, FetchError>;
}

impl<S: PriceSource + ?Sized> PriceSource for &S {
    fn fetch(&self, request: &FetchRequest) -> Result<PriceSeries, FetchError> {
        (**self).fetch(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_lookback_request() {
        let now = NaiveDate::from_ymd_opt(2024, 6, 30)
            .unwrap()
            .and_hms_opt(15, 30, 0)
            .unwrap();
        let req = FetchRequest::lookback(" btc-usd ", Period::new(30).unwrap(), Timeframe::OneHour, now);
        assert_eq!(req.symbol, "BTC-USD");
        assert_eq!(req.end, now);
        assert_eq!(req.start, now - TimeDelta::days(30));
        assert_eq!(req.timeframe, Timeframe::OneHour);
    }
}
