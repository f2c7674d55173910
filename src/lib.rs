//! # chartscan - chart pattern scanner
//!
//! Splits a price series into fixed-size windows, renders each window as a
//! candlestick chart and asks a pattern detector whether it sees a formation
//! (double top, head and shoulders, ...). Windows are scanned from the most
//! recent backwards and the scan stops at the first match.
//!
//! ## Quick Start
//!
//! ```rust
//! use chartscan::prelude::*;
//!
//! // A detector that never finds anything
//! struct Blind;
//!
//! impl PatternDetector for Blind {
//!     fn detect(&self, image: &ChartImage, _threshold: Ratio) -> Result<DetectionResult> {
//!         Ok(DetectionResult::empty(image.clone()))
//!     }
//! }
//!
//! let start = chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
//!     .unwrap()
//!     .and_hms_opt(0, 0, 0)
//!     .unwrap();
//! let candles: Vec<Candle> = (0..30)
//!     .map(|i| Candle::new(start + chrono::TimeDelta::days(i), 10.0, 11.0, 9.0, 10.5, 100.0))
//!     .collect();
//! let series = PriceSeries::new(candles).unwrap();
//!
//! let scanner = ScannerBuilder::new(SvgRenderer::default(), Blind).build().unwrap();
//! let result = scanner.scan(&series, &Timeframe::OneDay).unwrap();
//! assert!(!result.is_match());
//! ```

pub mod config;
pub mod detect;
pub mod params;
pub mod render;
pub mod report;
pub mod scan;
pub mod series;
pub mod source;
pub mod window;

pub mod prelude {
    pub use crate::{
        // Config
        config::ScanConfig,
        // Detection
        detect::{BoundingBox, CommandDetector, Detection, DetectionResult, PatternDetector, PatternLabel},
        // Parameters
        params::{ParamMeta, ParamType},
        // Rendering
        render::{ChartImage, ChartRenderer, ImageFormat, SvgRenderer},
        // Reporting
        report::Report,
        // Scanning
        scan::{Elapsed, PatternScanner, ScanResult, ScannerBuilder},
        // Data
        series::{Candle, PriceSeries},
        source::{CsvPriceSource, FetchError, FetchRequest, PriceSource},
        window::{partition, Timeframe, Window},
        // Core types
        Direction,
        Error,
        Period,
        Ratio,
        Result,
        OHLCV,
        OHLCVExt,
    };
}

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while scanning a price series
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Price series is empty")]
    EmptySeries,

    #[error("Invalid candle at index {index}: {reason}")]
    InvalidCandle { index: usize, reason: &'static str },

    #[error("Timestamps not strictly increasing at index {index}")]
    UnorderedTimestamps { index: usize },

    #[error("Chart rendering failed: {0}")]
    Render(String),

    #[error("Pattern detection failed: {0}")]
    Detect(String),

    #[error(transparent)]
    Fetch(#[from] source::FetchError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Normalized value in range 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Ratio(f64);

impl Ratio {
    /// Create a new Ratio, validating the value is in [0.0, 1.0]
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || value.is_infinite() {
            return Err(Error::InvalidValue("Ratio cannot be NaN or infinite"));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(Error::OutOfRange {
                field: "Ratio",
                value,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(Self(value))
    }

    /// Create a Ratio from a compile-time constant (library internal use)
    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    /// Round to two decimals, the precision detector scores are reported with
    pub fn rounded(self) -> Self {
        Self((self.0 * 100.0).round() / 100.0)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl std::fmt::Display for Ratio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl serde::Serialize for Ratio {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        serde::Serialize::serialize(&self.0, s)
    }
}

impl<'de> serde::Deserialize<'de> for Ratio {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = <f64 as serde::Deserialize>::deserialize(d)?;
        Ratio::new(value).map_err(serde::de::Error::custom)
    }
}

/// Lookback period in days (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Period(u32);

impl Period {
    /// Create a new Period, validating value is > 0
    pub fn new(value: u32) -> Result<Self> {
        if value == 0 {
            return Err(Error::InvalidValue("Period must be > 0"));
        }
        Ok(Self(value))
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl serde::Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        serde::Serialize::serialize(&self.0, s)
    }
}

impl<'de> serde::Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = <u32 as serde::Deserialize>::deserialize(d)?;
        Period::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// OHLCV TRAITS
// ============================================================

/// Core OHLCV data trait
pub trait OHLCV {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;
    fn volume(&self) -> f64;
}

/// Extension trait with computed properties for OHLCV data
pub trait OHLCVExt: OHLCV {
    #[inline]
    fn body_top(&self) -> f64 {
        self.open().max(self.close())
    }

    #[inline]
    fn body_bottom(&self) -> f64 {
        self.open().min(self.close())
    }

    #[inline]
    fn is_bullish(&self) -> bool {
        self.close() >= self.open()
    }

    /// Validate OHLC consistency
    fn validate(&self) -> Result<()> {
        let prices = [self.open(), self.high(), self.low(), self.close()];
        if prices.iter().any(|p| p.is_nan()) {
            return Err(Error::InvalidCandle {
                index: 0,
                reason: "NaN in OHLC",
            });
        }
        if prices.iter().any(|p| p.is_infinite()) {
            return Err(Error::InvalidCandle {
                index: 0,
                reason: "Infinite value in OHLC",
            });
        }
        if self.high() < self.low() {
            return Err(Error::InvalidCandle {
                index: 0,
                reason: "high < low",
            });
        }
        Ok(())
    }
}

impl<T: OHLCV> OHLCVExt for T {}

/// Direction/bias of a chart pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    Bullish,
    Bearish,
}

impl Direction {
    #[inline]
    pub fn is_bullish(self) -> bool {
        matches!(self, Direction::Bullish)
    }

    #[inline]
    pub fn is_bearish(self) -> bool {
        matches!(self, Direction::Bearish)
    }
}

// ============================================================
// TESTS
// ============================================================
