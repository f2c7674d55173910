//! Scan controller
//!
//! Walks the windows of a series from the most recent to the oldest, renders
//! each one, runs the detector on it and stops at the first match.

use chrono::{NaiveDateTime, TimeDelta};
use tracing::{debug, info};

use crate::config::ScanConfig;
use crate::detect::{Detection, DetectionResult, PatternDetector};
use crate::render::{ChartImage, ChartRenderer};
use crate::series::{Candle, PriceSeries};
use crate::window::{partition, Timeframe, Window};
use crate::{Error, Ratio, Result};

/// Label reported in place of detections when nothing was found
pub const NO_DETECTION: &str = "No Detection";

const SECONDS_PER_DAY: i64 = 86_400;
const SECONDS_PER_HOUR: i64 = 3_600;

// ============================================================
// ELAPSED TIME
// ============================================================

/// How long ago a window started, in whole days plus whole hours of the
/// remaining partial day. Minutes and seconds are dropped, not carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Elapsed {
    pub days: i64,
    pub hours: i64,
}

impl Elapsed {
    pub fn from_delta(delta: TimeDelta) -> Self {
        let mut seconds = delta.num_seconds();
        if delta.subsec_nanos() < 0 {
            seconds -= 1;
        }
        Self {
            days: seconds.div_euclid(SECONDS_PER_DAY),
            hours: seconds.rem_euclid(SECONDS_PER_DAY) / SECONDS_PER_HOUR,
        }
    }

    pub fn between(now: NaiveDateTime, then: NaiveDateTime) -> Self {
        Self::from_delta(now - then)
    }
}

// ============================================================
// SCAN RESULT
// ============================================================

/// Outcome of one scan: the matched window, or the fallback window when
/// nothing matched
#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    pub window: Window,
    /// Timestamp of the window's first candle
    pub start: NaiveDateTime,
    /// Timestamp of the window's last candle
    pub end: NaiveDateTime,
    pub timeframe: Timeframe,
    /// Time from `start` to the moment the scan ran
    pub elapsed: Elapsed,
    pub detections: Vec<Detection>,
    /// Chart of the window, annotated by the detector
    pub image: ChartImage,
}

impl ScanResult {
    fn from_window(
        window: Window,
        candles: &[Candle],
        timeframe: &Timeframe,
        now: NaiveDateTime,
        result: DetectionResult,
    ) -> Self {
        let start = candles[0].timestamp;
        let end = candles[candles.len() - 1].timestamp;
        Self {
            window,
            start,
            end,
            timeframe: timeframe.clone(),
            elapsed: Elapsed::between(now, start),
            detections: result.detections,
            image: result.annotated,
        }
    }

    /// True when at least one pattern was detected
    #[inline]
    pub fn is_match(&self) -> bool {
        !self.detections.is_empty()
    }

    /// Detected labels, or `["No Detection"]`
    pub fn labels(&self) -> Vec<String> {
        if self.detections.is_empty() {
            return vec![NO_DETECTION.to_string()];
        }
        self.detections
            .iter()
            .map(|d| d.label.to_string())
            .collect()
    }

    /// Detection scores in the order of [`labels`](Self::labels); empty when
    /// nothing matched
    pub fn confidences(&self) -> Vec<Ratio> {
        self.detections.iter().map(|d| d.confidence).collect()
    }
}

// ============================================================
// SCANNER
// ============================================================

/// Backward window scanner
pub struct PatternScanner<R: ChartRenderer, D: PatternDetector> {
    renderer: R,
    detector: D,
    config: ScanConfig,
}

impl<R: ChartRenderer, D: PatternDetector> PatternScanner<R, D> {
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scan relative to the local wall clock
    pub fn scan(&self, series: &PriceSeries, timeframe: &Timeframe) -> Result<ScanResult> {
        self.scan_at(series, timeframe, chrono::Local::now().naive_local())
    }

    /// Scan with an explicit "now" used for the elapsed-time breakdown.
    ///
    /// Windows are visited most recent first:
    /// - the first window with at least one detection is returned immediately
    /// - with `latest_only`, the most recent window is returned whatever it holds
    /// - if no window matches, the last one visited (the oldest) is returned
    ///   with no detections
    pub fn scan_at(
        &self,
        series: &PriceSeries,
        timeframe: &Timeframe,
        now: NaiveDateTime,
    ) -> Result<ScanResult> {
        let windows = partition(series.len(), timeframe)?;
        let threshold = self.config.confidence;

        debug!(
            rows = series.len(),
            windows = windows.len(),
            timeframe = %timeframe,
            "starting scan"
        );

        let mut fallback = None;

        for window in windows.into_iter().rev() {
            let candles = &series[window.range()];
            let image = self.renderer.render(candles)?;
            let detected = self.detector.detect(&image, threshold)?;
            let result = ScanResult::from_window(window, candles, timeframe, now, detected);

            debug!(
                window = window.index,
                start = %result.start,
                found = result.detections.len(),
                "window scanned"
            );

            if result.is_match() {
                info!(
                    window = window.index,
                    start = %result.start,
                    labels = ?result.labels(),
                    "pattern found"
                );
                return Ok(result);
            }

            if self.config.latest_only {
                info!(window = window.index, "no pattern in latest window");
                return Ok(result);
            }

            fallback = Some(result);
        }

        info!("no pattern in any window");
        fallback.ok_or(Error::EmptySeries)
    }
}

// ============================================================
// BUILDER
// ============================================================

/// Builder for creating PatternScanner instances
pub struct ScannerBuilder<R: ChartRenderer, D: PatternDetector> {
    renderer: R,
    detector: D,
    config: ScanConfig,
}

impl<R: ChartRenderer, D: PatternDetector> ScannerBuilder<R, D> {
    pub fn new(renderer: R, detector: D) -> Self {
        Self {
            renderer,
            detector,
            config: ScanConfig::default(),
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: ScanConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the detection confidence threshold
    pub fn confidence(mut self, confidence: Ratio) -> Self {
        self.config.confidence = confidence;
        self
    }

    /// Inspect only the most recent window
    pub fn latest_only(mut self, enable: bool) -> Self {
        self.config.latest_only = enable;
        self
    }

    /// Build the scanner
    pub fn build(self) -> Result<PatternScanner<R, D>> {
        self.config.validate()?;
        Ok(PatternScanner {
            renderer: self.renderer,
            detector: self.detector,
            config: self.config,
        })
    }
}
