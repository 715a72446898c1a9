//! Margin configuration.

use crate::error::{Error, Result};

/// Conversion factor from CSS-like pixels to PDF points.
pub const PX_TO_PT: f32 = 0.75;

/// Margin used when none is given, in pixels.
pub const DEFAULT_MARGIN_PX: f32 = 15.0;

/// A validated margin width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    px: f32,
}

impl Margin {
    /// Create a margin from a pixel width. Must be finite and non-negative.
    pub fn from_px(px: f32) -> Result<Self> {
        if !px.is_finite() || px < 0.0 {
            return Err(Error::InvalidMargin(px));
        }
        Ok(Self { px })
    }

    pub fn px(&self) -> f32 {
        self.px
    }

    /// Width in PDF points.
    pub fn points(&self) -> f32 {
        self.px * PX_TO_PT
    }
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            px: DEFAULT_MARGIN_PX,
        }
    }
}

/// Options for the margin inserter.
#[derive(Debug, Clone)]
pub struct MarginOptions {
    /// Margin width in pixels, applied on every side
    pub margin_px: f32,

    /// Whether to decode and compress pages on the rayon pool
    pub parallel: bool,

    /// Whether to Flate-compress the wrapped page content
    pub compress: bool,
}

impl MarginOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the margin in pixels.
    pub fn with_margin_px(mut self, px: f32) -> Self {
        self.margin_px = px;
        self
    }

    /// Enable or disable parallel page preparation.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Process pages one after another.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Enable or disable stream compression.
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    /// Validated margin.
    pub fn margin(&self) -> Result<Margin> {
        Margin::from_px(self.margin_px)
    }
}

impl Default for MarginOptions {
    fn default() -> Self {
        Self {
            margin_px: DEFAULT_MARGIN_PX,
            parallel: true,
            compress: true,
        }
    }
}
