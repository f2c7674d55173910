//! Chart rendering
//!
//! A [`ChartRenderer`] turns one window of candles into an in-memory image
//! that a pattern detector can consume.

pub mod svg;

pub use svg::SvgRenderer;

use crate::{series::Candle, Result};

/// Encoding of a [`ChartImage`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Svg,
}

impl ImageFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }

    /// Guess the format from a file extension (`png` or `svg`)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "svg" => Some(ImageFormat::Svg),
            _ => None,
        }
    }
}

/// Encoded image held in memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartImage {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl ChartImage {
    pub fn new(format: ImageFormat, width: u32, height: u32, bytes: Vec<u8>) -> Self {
        Self {
            format,
            width,
            height,
            bytes,
        }
    }

    /// Write the encoded bytes to `path`
    pub fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }
}

/// Renders a window of candles as a chart image
pub trait ChartRenderer {
    fn render(&self, candles: &[Candle]) -> Result<ChartImage>;
}

impl<R: ChartRenderer + ?Sized> ChartRenderer for &R {
    fn render(&self, candles: &[Candle]) -> Result<ChartImage> {
        (**self).render(candles)
    }
}

impl<R: ChartRenderer + ?Sized> ChartRenderer for Box<R> {
    fn render(&self, candles: &[Candle]) -> Result<ChartImage> {
        (**self).render(candles)
    }
}
