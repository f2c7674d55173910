//! File-backed price source
//!
//! One CSV file per symbol and interval, `<dir>/<SYMBOL>_<interval>.csv`:
//!
//! ```text
//! timestamp,open,high,low,close,volume
//! 2024-01-01 00:00:00,42000.5,42310.0,41800.2,42250.0,1234.5
//! ```
//!
//! Timestamps are `%Y-%m-%d %H:%M:%S`, a bare date, or RFC 3339. Offsets are
//! dropped and the wall-clock time kept.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::series::{Candle, PriceSeries};
use crate::source::{FetchError, FetchRequest, PriceSource};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: Option<f64>,
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_local()))
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Reads candles from a directory of CSV files
#[derive(Debug, Clone)]
pub struct CsvPriceSource {
    dir: PathBuf,
}

impl CsvPriceSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding `symbol` at `interval`
    pub fn file_for(&self, symbol: &str, interval: &str) -> PathBuf {
        self.dir.join(format!("{symbol}_{interval}.csv"))
    }
}

impl PriceSource for CsvPriceSource {
    fn fetch(&self, request: &FetchRequest) -> Result<PriceSeries, FetchError> {
        let path = self.file_for(&request.symbol, request.timeframe.as_str());
        if !path.is_file() {
            return Err(FetchError::SymbolNotFound {
                symbol: request.symbol.clone(),
            });
        }

        let mut rdr = ::csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(::csv::Trim::All)
            .comment(Some(b'#'))
            .from_path(&path)
            .map_err(|e| FetchError::Parse {
                line: 0,
                reason: e.to_string(),
            })?;

        let mut candles = Vec::new();
        for row in rdr.deserialize::<CsvRow>() {
            let row = row.map_err(|e| FetchError::Parse {
                line: e.position().map(|p| p.line()).unwrap_or(0),
                reason: e.to_string(),
            })?;

            let timestamp = parse_timestamp(&row.timestamp).ok_or_else(|| FetchError::Parse {
                line: candles.len() as u64 + 2,
                reason: format!("bad timestamp {:?}", row.timestamp),
            })?;

            if timestamp < request.start || timestamp > request.end {
                continue;
            }

            candles.push(Candle::new(
                timestamp,
                row.open,
                row.high,
                row.low,
                row.close,
                row.volume.unwrap_or(0.0),
            ));
        }

        debug!(
            symbol = %request.symbol,
            file = %path.display(),
            rows = candles.len(),
            "loaded csv prices"
        );

        if candles.is_empty() {
            return Err(FetchError::EmptyRange {
                symbol: request.symbol.clone(),
                start: request.start,
                end: request.end,
            });
        }

        PriceSeries::new(candles).map_err(|e| FetchError::InvalidSeries(e.to_string()))
    }
}
