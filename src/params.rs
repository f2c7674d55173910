//! Parameter metadata for scan invocations
//!
//! Describes the user-facing knobs of a scan (lookback period, confidence
//! threshold) with their defaults and allowed grids, enabling:
//! - Input validation at the command line
//! - Listing the allowed choices
//!
//! # Example
//!
//! ```rust
//! use chartscan::params::{CONFIDENCE, PERIOD};
//!
//! assert_eq!(PERIOD.generate_grid().len(), 10);
//! assert!(CONFIDENCE.validate(0.7).is_ok());
//! assert!(CONFIDENCE.validate(0.75).is_err());
//! ```

use crate::{Error, Period, Ratio, Result};

// ============================================================
// PARAMETER TYPES
// ============================================================

/// Type of parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    /// Ratio value (0.0..=1.0)
    Ratio,
    /// Period value (positive whole number of days)
    Period,
}

/// Metadata for a single invocation parameter
#[derive(Debug, Clone)]
pub struct ParamMeta {
    /// Parameter name (e.g., "confidence")
    pub name: &'static str,
    /// Parameter type (Ratio or Period)
    pub param_type: ParamType,
    /// Default value
    pub default: f64,
    /// Allowed values: (min, max, step)
    pub range: (f64, f64, f64),
    /// Human-readable description
    pub description: &'static str,
}

/// Days of history to fetch
pub const PERIOD: ParamMeta =
    ParamMeta::period("period", 30.0, (30.0, 300.0, 30.0), "Days of price history to scan");

/// Minimum detection confidence
pub const CONFIDENCE: ParamMeta = ParamMeta::ratio(
    "confidence",
    0.5,
    (0.1, 1.0, 0.1),
    "Minimum confidence for a detected pattern",
);

/// Timeframes offered at the command line
pub const TIMEFRAME_CHOICES: &[&str] = &["1h", "4h", "1d"];

const GRID_TOLERANCE: f64 = 1e-9;
const OFF_GRID_TOLERANCE: f64 = 1e-6;

impl ParamMeta {
    /// Create a new ParamMeta for a Ratio parameter
    pub const fn ratio(
        name: &'static str,
        default: f64,
        range: (f64, f64, f64),
        description: &'static str,
    ) -> Self {
        Self { name, param_type: ParamType::Ratio, default, range, description }
    }

    /// Create a new ParamMeta for a Period parameter
    pub const fn period(
        name: &'static str,
        default: f64,
        range: (f64, f64, f64),
        description: &'static str,
    ) -> Self {
        Self { name, param_type: ParamType::Period, default, range, description }
    }

    /// All allowed values, smallest first
    pub fn generate_grid(&self) -> Vec<f64> {
        let (min, max, step) = self.range;
        let steps = ((max - min) / step + GRID_TOLERANCE).floor() as usize;
        (0..=steps).map(|i| min + i as f64 * step).collect()
    }

    /// Validate a value for this parameter: inside the range and on the grid
    pub fn validate(&self, value: f64) -> Result<()> {
        let (min, max, step) = self.range;
        if value.is_nan() || value < min - GRID_TOLERANCE || value > max + GRID_TOLERANCE {
            return Err(Error::OutOfRange { field: self.name, value, min, max });
        }
        let k = (value - min) / step;
        if (k - k.round()).abs() > OFF_GRID_TOLERANCE {
            return Err(Error::InvalidValue("value is not on the parameter grid"));
        }
        match self.param_type {
            ParamType::Ratio => Ok(()),
            ParamType::Period => {
                if value < 1.0 || value.fract() != 0.0 {
                    return Err(Error::InvalidValue("Period must be a positive integer"));
                }
                Ok(())
            },
        }
    }

    /// Validate and convert to a [`Ratio`]
    pub fn ratio_value(&self, value: f64) -> Result<Ratio> {
        self.validate(value)?;
        Ratio::new(value)
    }

    /// Validate and convert to a [`Period`]
    pub fn period_value(&self, value: f64) -> Result<Period> {
        self.validate(value)?;
        Period::new(value as u32)
    }
}

// ============================================================
// TESTS
// ============================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_meta_ratio() {
        assert_eq!(CONFIDENCE.name, "confidence");
        assert_eq!(CONFIDENCE.param_type, ParamType::Ratio);
        assert_eq!(CONFIDENCE.default, 0.5);
    }

    #[test]
    fn test_param_meta_period() {
        assert_eq!(PERIOD.name, "period");
        assert_eq!(PERIOD.param_type, ParamType::Period);
        assert_eq!(PERIOD.default, 30.0);
    }

    #[test]
    fn test_generate_grid() {
        let periods = PERIOD.generate_grid();
        assert_eq!(periods.len(), 10);
        assert_eq!(periods[0], 30.0);
        assert_eq!(periods[9], 300.0);

        let confidences = CONFIDENCE.generate_grid();
        assert_eq!(confidences.len(), 10);
        assert!((confidences[9] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_validate_ratio() {
        assert!(CONFIDENCE.validate(0.1).is_ok());
        assert!(CONFIDENCE.validate(0.3).is_ok());
        assert!(CONFIDENCE.validate(1.0).is_ok());
        assert!(CONFIDENCE.validate(0.0).is_err());
        assert!(CONFIDENCE.validate(0.35).is_err());
        assert!(CONFIDENCE.validate(1.1).is_err());
    }

    #[test]
    fn test_validate_period() {
        assert!(PERIOD.validate(30.0).is_ok());
        assert!(PERIOD.validate(300.0).is_ok());
        assert!(PERIOD.validate(90.0).is_ok());
        assert!(PERIOD.validate(45.0).is_err());
        assert!(PERIOD.validate(330.0).is_err());
    }

    #[test]
    fn test_typed_values() {
        assert_eq!(PERIOD.period_value(120.0).unwrap().get(), 120);
        assert!((CONFIDENCE.ratio_value(0.7).unwrap().get() - 0.7).abs() < f64::EPSILON);
        assert!(CONFIDENCE.ratio_value(0.05).is_err());
    }
}
