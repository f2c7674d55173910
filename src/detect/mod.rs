//! Pattern detection
//!
//! The detector is an opaque collaborator (typically a pretrained object
//! detection model). It looks at a rendered chart and reports the formations
//! it recognizes, each with a confidence score and a bounding box.

pub mod command;

pub use command::CommandDetector;

use std::fmt;

use crate::render::ChartImage;
use crate::{Direction, Ratio, Result};

/// Chart formation name reported by a detector
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PatternLabel {
    DoubleTop,
    DoubleBottom,
    HeadAndShoulders,
    InverseHeadAndShoulders,
    /// A class the detector knows but this crate does not
    Other(String),
}

impl PatternLabel {
    /// Parse a model class name; case, spaces, `_` and `-` are ignored.
    pub fn parse(name: &str) -> Self {
        let key: String = name
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "doubletop" => PatternLabel::DoubleTop,
            "doublebottom" => PatternLabel::DoubleBottom,
            "headandshoulder" | "headandshoulders" => PatternLabel::HeadAndShoulders,
            "inverseheadandshoulder" | "inverseheadandshoulders" => {
                PatternLabel::InverseHeadAndShoulders
            }
            _ => PatternLabel::Other(name.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PatternLabel::DoubleTop => "Double Top",
            PatternLabel::DoubleBottom => "Double Bottom",
            PatternLabel::HeadAndShoulders => "Head and Shoulders",
            PatternLabel::InverseHeadAndShoulders => "Inverse Head and Shoulders",
            PatternLabel::Other(name) => name,
        }
    }

    /// Returns the typical direction of the move this formation signals.
    ///
    /// - `Some(Direction::Bullish)` - reversal of a downtrend
    /// - `Some(Direction::Bearish)` - reversal of an uptrend
    /// - `None` - unknown class
    pub fn typical_direction(&self) -> Option<Direction> {
        match self {
            PatternLabel::DoubleBottom | PatternLabel::InverseHeadAndShoulders => {
                Some(Direction::Bullish)
            }
            PatternLabel::DoubleTop | PatternLabel::HeadAndShoulders => Some(Direction::Bearish),
            PatternLabel::Other(_) => None,
        }
    }
}

impl From<String> for PatternLabel {
    fn from(s: String) -> Self {
        PatternLabel::parse(&s)
    }
}

impl From<PatternLabel> for String {
    fn from(label: PatternLabel) -> Self {
        match label {
            PatternLabel::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for PatternLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Box in image pixel coordinates: top-left `(x1, y1)`, bottom-right `(x2, y2)`
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl From<[f64; 4]> for BoundingBox {
    fn from([x1, y1, x2, y2]: [f64; 4]) -> Self {
        Self { x1, y1, x2, y2 }
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x1, b.y1, b.x2, b.y2]
    }
}

/// One recognized formation
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Detection {
    #[serde(rename = "class")]
    pub label: PatternLabel,
    #[serde(rename = "conf")]
    pub confidence: Ratio,
    #[serde(rename = "xyxy")]
    pub bbox: BoundingBox,
}

impl Detection {
    /// Build from raw model output; the score is rounded to two decimals.
    pub fn new(label: PatternLabel, confidence: f64, bbox: BoundingBox) -> Result<Self> {
        Ok(Self {
            label,
            confidence: Ratio::new(confidence)?.rounded(),
            bbox,
        })
    }
}

/// Detections for one chart plus the chart with boxes drawn on it
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionResult {
    pub detections: Vec<Detection>,
    pub annotated: ChartImage,
}

impl DetectionResult {
    pub fn new(detections: Vec<Detection>, annotated: ChartImage) -> Self {
        Self {
            detections,
            annotated,
        }
    }

    /// "No detection" for `image`
    pub fn empty(image: ChartImage) -> Self {
        Self::new(Vec::new(), image)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    /// Drop detections scoring below `threshold`
    pub fn retain_above(mut self, threshold: Ratio) -> Self {
        self.detections.retain(|d| d.confidence >= threshold);
        self
    }
}

/// Finds chart formations in a rendered image
pub trait PatternDetector {
    /// Run detection; only detections scoring at least `threshold` are returned.
    fn detect(&self, image: &ChartImage, threshold: Ratio) -> Result<DetectionResult>;
}

impl<D: PatternDetector + ?Sized> PatternDetector for &D {
    fn detect(&self, image: &ChartImage, threshold: Ratio) -> Result<DetectionResult> {
        (**self).detect(image, threshold)
    }
}

impl<D: PatternDetector + ?Sized> PatternDetector for Box<D> {
    fn detect(&self, image: &ChartImage, threshold: Ratio) -> Result<DetectionResult> {
        (**self).detect(image, threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::ImageFormat;

    fn image() -> ChartImage {
        ChartImage::new(ImageFormat::Png, 1, 1, vec![0])
    }

    #[test]
    fn test_label_parse_variants() {
        assert_eq!(PatternLabel::parse("Double top"), PatternLabel::DoubleTop);
        assert_eq!(PatternLabel::parse("double_bottom"), PatternLabel::DoubleBottom);
        assert_eq!(
            PatternLabel::parse("Head and Shoulder"),
            PatternLabel::HeadAndShoulders
        );
        assert_eq!(
            PatternLabel::parse("Inverse-Head-and-Shoulders"),
            PatternLabel::InverseHeadAndShoulders
        );
        assert_eq!(
            PatternLabel::parse("Cup and Handle"),
            PatternLabel::Other("Cup and Handle".to_string())
        );
    }

    #[test]
    fn test_label_direction() {
        assert!(PatternLabel::DoubleBottom.typical_direction().unwrap().is_bullish());
        assert!(PatternLabel::HeadAndShoulders.typical_direction().unwrap().is_bearish());
        assert_eq!(PatternLabel::Other("x".into()).typical_direction(), None);
    }

    #[test]
    fn test_detection_rounds_confidence() {
        let d = Detection::new(PatternLabel::DoubleTop, 0.876, BoundingBox::default()).unwrap();
        assert!((d.confidence.get() - 0.88).abs() < 1e-12);
        assert!(Detection::new(PatternLabel::DoubleTop, 1.5, BoundingBox::default()).is_err());
    }

    #[test]
    fn test_detection_deserializes_model_output() {
        let d: Detection = serde_json::from_str(
            r#"{"class": "Double Bottom", "conf": 0.73, "xyxy": [1.0, 2.0, 30.0, 40.0]}"#,
        )
        .unwrap();
        assert_eq!(d.label, PatternLabel::DoubleBottom);
        assert_eq!(d.bbox, BoundingBox { x1: 1.0, y1: 2.0, x2: 30.0, y2: 40.0 });
    }

    #[test]
    fn test_retain_above_threshold() {
        let low = Detection::new(PatternLabel::DoubleTop, 0.4, BoundingBox::default()).unwrap();
        let high = Detection::new(PatternLabel::DoubleBottom, 0.9, BoundingBox::default()).unwrap();
        let result = DetectionResult::new(vec![low, high], image())
            .retain_above(Ratio::new(0.5).unwrap());
        assert_eq!(result.detections.len(), 1);
        assert_eq!(result.detections[0].label, PatternLabel::DoubleBottom);
        assert!(DetectionResult::empty(image()).is_empty());
    }
}
