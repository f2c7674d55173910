//! Human- and machine-readable summaries of a scan

use std::fmt;

use crate::scan::{Elapsed, ScanResult, NO_DETECTION};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Detection score, or the no-detection sentinel
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum ReportScore {
    Score(f64),
    Missing(&'static str),
}

/// Flat view of a [`ScanResult`] without the image
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Report {
    pub start_date: String,
    pub end_date: String,
    pub timeframe: String,
    pub when: Elapsed,
    pub class: Vec<String>,
    pub conf: Vec<ReportScore>,
}

impl From<&ScanResult> for Report {
    fn from(result: &ScanResult) -> Self {
        let conf = if result.is_match() {
            result
                .confidences()
                .into_iter()
                .map(|c| ReportScore::Score(c.get()))
                .collect()
        } else {
            vec![ReportScore::Missing(NO_DETECTION)]
        };

        Self {
            start_date: result.start.format(DATE_FORMAT).to_string(),
            end_date: result.end.format(DATE_FORMAT).to_string(),
            timeframe: result.timeframe.to_string(),
            when: result.elapsed,
            class: result.labels(),
            conf,
        }
    }
}

impl Report {
    /// Number of detected patterns (0 when nothing matched)
    pub fn found(&self) -> usize {
        self.conf
            .iter()
            .filter(|c| matches!(c, ReportScore::Score(_)))
            .count()
    }

    pub fn headline(&self) -> String {
        match self.found() {
            0 => "No Pattern Found".to_string(),
            1 => "1 Pattern Found".to_string(),
            n => format!("{n} Patterns Found"),
        }
    }

    fn scores(&self) -> Vec<f64> {
        self.conf
            .iter()
            .filter_map(|c| match c {
                ReportScore::Score(s) => Some(*s),
                ReportScore::Missing(_) => None,
            })
            .collect()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.found() {
            0 => write!(f, "{}", self.headline()),
            1 => {
                writeln!(f, "{}", self.headline())?;
                writeln!(
                    f,
                    "Found '{}' with {:.2} confidence",
                    self.class[0],
                    self.scores()[0]
                )?;
                write!(
                    f,
                    "about {} days and {} hours ago",
                    self.when.days, self.when.hours
                )
            }
            _ => {
                writeln!(f, "{}", self.headline())?;
                writeln!(f, "Found {:?} with {:?} confidence", self.class, self.scores())?;
                write!(f, "about {} days, {} hours ago", self.when.days, self.when.hours)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{BoundingBox, Detection, PatternLabel};
    use crate::render::{ChartImage, ImageFormat};
    use crate::window::{Timeframe, Window};
    use chrono::NaiveDate;

    fn result(detections: Vec<Detection>) -> ScanResult {
        let start = NaiveDate::from_ymd_opt(2024, 2, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        ScanResult {
            window: Window { index: 3, start: 45, end: 60 },
            start,
            end: start + chrono::TimeDelta::days(14),
            timeframe: Timeframe::OneDay,
            elapsed: Elapsed { days: 2, hours: 3 },
            detections,
            image: ChartImage::new(ImageFormat::Svg, 1, 1, vec![]),
        }
    }

    fn detection(label: PatternLabel, conf: f64) -> Detection {
        Detection::new(label, conf, BoundingBox::default()).unwrap()
    }

    #[test]
    fn test_no_detection_report() {
        let report = Report::from(&result(vec![]));
        assert_eq!(report.class, vec!["No Detection".to_string()]);
        assert_eq!(report.conf, vec![ReportScore::Missing("No Detection")]);
        assert_eq!(report.start_date, "2024-02-01 00:00:00");
        assert_eq!(report.end_date, "2024-02-15 00:00:00");
        assert_eq!(report.to_string(), "No Pattern Found");
    }

    #[test]
    fn test_single_detection_text() {
        let report = Report::from(&result(vec![detection(PatternLabel::DoubleTop, 0.8)]));
        assert_eq!(
            report.to_string(),
            "1 Pattern Found\nFound 'Double Top' with 0.80 confidence\nabout 2 days and 3 hours ago"
        );
    }

    #[test]
    fn test_multiple_detections_text() {
        let report = Report::from(&result(vec![
            detection(PatternLabel::HeadAndShoulders, 0.91),
            detection(PatternLabel::DoubleBottom, 0.55),
        ]));
        assert_eq!(
            report.to_string(),
            "2 Patterns Found\nFound [\"Head and Shoulders\", \"Double Bottom\"] with [0.91, 0.55] confidence\nabout 2 days, 3 hours ago"
        );
    }

    #[test]
    fn test_report_json_shape() {
        let json = serde_json::to_value(Report::from(&result(vec![]))).unwrap();
        assert_eq!(json["timeframe"], "1d");
        assert_eq!(json["when"]["days"], 2);
        assert_eq!(json["conf"][0], "No Detection");
    }
}
