//! Detector backed by an external inference program
//!
//! The program receives the encoded chart on stdin and these arguments after
//! any user-supplied ones:
//!
//! ```text
//! --model <path> --conf <threshold> --format <png|svg>
//! ```
//!
//! It must print one JSON object on stdout:
//!
//! ```json
//! {
//!   "detections": [{ "class": "Double Top", "conf": 0.81, "xyxy": [12, 40, 300, 210] }],
//!   "annotated": "/tmp/annotated.png"
//! }
//! ```
//!
//! `annotated` is optional; without it the input chart is used as the
//! annotated image.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::{debug, warn};

use crate::detect::{BoundingBox, Detection, DetectionResult, PatternDetector, PatternLabel};
use crate::render::{ChartImage, ImageFormat};
use crate::{Error, Ratio, Result};

#[derive(Debug, serde::Deserialize)]
struct RawDetection {
    class: String,
    conf: f64,
    #[serde(default)]
    xyxy: [f64; 4],
}

#[derive(Debug, serde::Deserialize)]
struct DetectorOutput {
    #[serde(default)]
    detections: Vec<RawDetection>,
    #[serde(default)]
    annotated: Option<PathBuf>,
}

/// Runs a model through an external program, one process per chart
#[derive(Debug, Clone)]
pub struct CommandDetector {
    program: PathBuf,
    args: Vec<String>,
    model_path: PathBuf,
}

impl CommandDetector {
    pub fn new(program: impl Into<PathBuf>, model_path: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            model_path: model_path.into(),
        }
    }

    /// Arguments passed before the generated ones
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    fn run(&self, image: &ChartImage, threshold: Ratio) -> Result<Vec<u8>> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg("--model")
            .arg(&self.model_path)
            .arg("--conf")
            .arg(threshold.get().to_string())
            .arg("--format")
            .arg(image.format.as_str())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                Error::Detect(format!("cannot start {}: {e}", self.program.display()))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Detect("detector stdin unavailable".to_string()))?;

        // stdin is fed while stdout/stderr are drained
        let output = std::thread::scope(|s| {
            let writer = s.spawn(move || stdin.write_all(&image.bytes));
            let output = child.wait_with_output();
            if let Ok(Err(e)) = writer.join() {
                warn!("detector closed stdin early: {e}");
            }
            output
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::Detect(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }

        Ok(output.stdout)
    }
}

impl PatternDetector for CommandDetector {
    fn detect(&self, image: &ChartImage, threshold: Ratio) -> Result<DetectionResult> {
        let stdout = self.run(image, threshold)?;
        let parsed: DetectorOutput = serde_json::from_slice(&stdout)
            .map_err(|e| Error::Detect(format!("invalid detector output: {e}")))?;

        // The threshold applies to the raw score, before display rounding.
        let detections = parsed
            .detections
            .into_iter()
            .filter(|raw| raw.conf >= threshold.get())
            .map(|raw| {
                Detection::new(
                    PatternLabel::parse(&raw.class),
                    raw.conf,
                    BoundingBox::from(raw.xyxy),
                )
            })
            .collect::<Result<Vec<_>>>()?;

        let annotated = match parsed.annotated {
            Some(path) => {
                let format = path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .and_then(ImageFormat::from_extension)
                    .unwrap_or(ImageFormat::Png);
                let bytes = std::fs::read(&path)?;
                ChartImage::new(format, image.width, image.height, bytes)
            }
            None => image.clone(),
        };

        debug!(
            program = %self.program.display(),
            found = detections.len(),
            "detector finished"
        );

        Ok(DetectionResult::new(detections, annotated))
    }
}
