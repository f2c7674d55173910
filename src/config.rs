//! Scanner configuration
//!
//! Values that the scan loop needs but the caller rarely changes. Loaded from
//! JSON or built in code; every field has a default.

use std::path::{Path, PathBuf};

use crate::{Error, Ratio, Result};

/// Default confidence threshold for detections
pub const DEFAULT_CONFIDENCE: Ratio = Ratio::new_const(0.5);
/// Default location of the detection model weights
pub const DEFAULT_MODEL_PATH: &str = "model/best.pt";
/// Default chart size in pixels (6.4in x 6.4in at 100 dpi)
pub const DEFAULT_IMAGE_SIZE: u32 = 640;

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Minimum score for a detection to count as a match
    pub confidence: Ratio,
    /// Inspect only the most recent window
    pub latest_only: bool,
    pub model_path: PathBuf,
    pub image_width: u32,
    pub image_height: u32,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            confidence: DEFAULT_CONFIDENCE,
            latest_only: false,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            image_width: DEFAULT_IMAGE_SIZE,
            image_height: DEFAULT_IMAGE_SIZE,
        }
    }
}

impl ScanConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.image_width == 0 || self.image_height == 0 {
            return Err(Error::InvalidConfig(format!(
                "image size must be positive, got {}x{}",
                self.image_width, self.image_height
            )));
        }
        if self.model_path.as_os_str().is_empty() {
            return Err(Error::InvalidConfig("model_path is empty".to_string()));
        }
        Ok(())
    }
}
