//! Built-in candlestick renderer producing SVG

use std::fmt::Write;

use crate::render::{ChartImage, ChartRenderer, ImageFormat};
use crate::series::Candle;
use crate::{Error, OHLCVExt, Result};

const BULLISH_COLOR: &str = "#00b060";
const BEARISH_COLOR: &str = "#fe3032";
const BACKGROUND_COLOR: &str = "#ffffff";

/// Fraction of the candle slot taken by the body
const BODY_WIDTH_RATIO: f64 = 0.6;
/// Doji bodies are drawn at least this tall (pixels)
const MIN_BODY_HEIGHT: f64 = 1.0;

/// Maps prices onto the vertical pixel axis of one chart
#[derive(Debug, Clone, Copy)]
pub struct PriceScale {
    pub price_min: f64,
    pub price_range: f64,
}

impl PriceScale {
    /// Fit the scale to the candles' low/high with a small padding
    pub fn from_candles(candles: &[Candle]) -> Self {
        if candles.is_empty() {
            return Self {
                price_min: 0.0,
                price_range: 1.0,
            };
        }

        let (mut min_price, mut max_price) = candles
            .iter()
            .fold((f64::MAX, f64::MIN), |(lo, hi), c| (lo.min(c.low), hi.max(c.high)));

        let padding = (max_price - min_price) * 0.001;
        min_price -= padding;
        max_price += padding;

        Self {
            price_min: min_price,
            price_range: (max_price - min_price).max(f64::EPSILON),
        }
    }

    /// 0.0 at the bottom of the range, 1.0 at the top
    pub fn normalize(&self, price: f64) -> f64 {
        (price - self.price_min) / self.price_range
    }
}

/// Default candlestick chart, no styling options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SvgRenderer {
    pub width: u32,
    pub height: u32,
}

impl Default for SvgRenderer {
    fn default() -> Self {
        Self {
            width: 640,
            height: 640,
        }
    }
}

impl SvgRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    fn y(&self, scale: &PriceScale, price: f64) -> f64 {
        self.height as f64 * (1.0 - scale.normalize(price))
    }
}

impl ChartRenderer for SvgRenderer {
    fn render(&self, candles: &[Candle]) -> Result<ChartImage> {
        if candles.is_empty() {
            return Err(Error::Render("no candles to draw".to_string()));
        }
        if self.width == 0 || self.height == 0 {
            return Err(Error::Render(format!(
                "invalid canvas {}x{}",
                self.width, self.height
            )));
        }

        let scale = PriceScale::from_candles(candles);
        let slot = self.width as f64 / candles.len() as f64;
        let body_width = slot * BODY_WIDTH_RATIO;

        let mut svg = String::with_capacity(256 + candles.len() * 200);
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        let _ = write!(
            svg,
            r#"<rect width="100%" height="100%" fill="{BACKGROUND_COLOR}"/>"#
        );

        for (i, candle) in candles.iter().enumerate() {
            let color = if candle.is_bullish() {
                BULLISH_COLOR
            } else {
                BEARISH_COLOR
            };
            let center = slot * (i as f64 + 0.5);

            let wick_top = self.y(&scale, candle.high);
            let wick_bottom = self.y(&scale, candle.low);
            let _ = write!(
                svg,
                r#"<line x1="{center:.2}" y1="{wick_top:.2}" x2="{center:.2}" y2="{wick_bottom:.2}" stroke="{color}"/>"#
            );

            let body_top = self.y(&scale, candle.body_top());
            let body_height = (self.y(&scale, candle.body_bottom()) - body_top).max(MIN_BODY_HEIGHT);
            let _ = write!(
                svg,
                r#"<rect x="{x:.2}" y="{body_top:.2}" width="{body_width:.2}" height="{body_height:.2}" fill="{color}"/>"#,
                x = center - body_width / 2.0
            );
        }

        svg.push_str("</svg>");

        Ok(ChartImage::new(
            ImageFormat::Svg,
            self.width,
            self.height,
            svg.into_bytes(),
        ))
    }
}
