//! Configuration types for card rendering and export.

use crate::error::{CardError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Largest canvas area allowed by common browsers (16384 × 16384).
pub const DEFAULT_MAX_CANVAS_PIXELS: u64 = 268_435_456;

/// Physical page a bulk export is composed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    /// 297 mm × 420 mm.
    A3,
    /// 210 mm × 297 mm.
    A4,
}

impl PageSize {
    /// Portrait width and height in centimetres.
    pub fn size_cm(self) -> (f64, f64) {
        match self {
            PageSize::A3 => (29.7, 42.0),
            PageSize::A4 => (21.0, 29.7),
        }
    }
}

/// Configuration for rasterization and file export.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Oversampling factor for single-card PNG export.
    /// Default: 5 (696 × 992 template → 3480 × 4960 PNG).
    pub oversampling: u32,

    /// Oversampling factor for bulk pages.
    /// Default: 1, so a page is exactly its 300 DPI pixel size.
    pub bulk_oversampling: u32,

    /// JPEG quality (1-100) for bulk pages.
    /// Default: 100.
    pub jpeg_quality: u8,

    /// PNG compression level (0-9, higher = smaller file, slower).
    /// Default: 6.
    pub png_compression: u8,

    /// Page size for bulk export.
    /// Default: A3.
    pub page_size: PageSize,

    /// Blank border around the card grid, in centimetres.
    /// Default: 0.5.
    pub page_margin_cm: f64,

    /// Space between cards, in centimetres.
    /// Default: 0.2.
    pub card_gap_cm: f64,

    /// Maximum pixel area of one canvas.
    /// Default: 268,435,456.
    pub max_canvas_pixels: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            oversampling: 5,
            bulk_oversampling: 1,
            jpeg_quality: 100,
            png_compression: 6,
            page_size: PageSize::A3,
            page_margin_cm: 0.5,
            card_gap_cm: 0.2,
            max_canvas_pixels: DEFAULT_MAX_CANVAS_PIXELS,
        }
    }
}

impl ExportConfig {
    /// Create an export config with the given single-card oversampling.
    pub fn with_oversampling(oversampling: u32) -> Self {
        Self {
            oversampling,
            ..Default::default()
        }
    }

    /// Set the bulk page oversampling.
    pub fn bulk_oversampling(mut self, factor: u32) -> Self {
        self.bulk_oversampling = factor;
        self
    }

    /// Set JPEG quality.
    pub fn jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality;
        self
    }

    /// Set PNG compression level.
    pub fn png_compression(mut self, level: u8) -> Self {
        self.png_compression = level.min(9);
        self
    }

    /// Set the bulk page size.
    pub fn page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the canvas area limit.
    pub fn max_canvas_pixels(mut self, limit: u64) -> Self {
        self.max_canvas_pixels = limit;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if !(1..=10).contains(&self.oversampling) {
            return Err(CardError::InvalidConfig(
                "oversampling must be between 1 and 10".to_string(),
            ));
        }
        if !(1..=10).contains(&self.bulk_oversampling) {
            return Err(CardError::InvalidConfig(
                "bulk_oversampling must be between 1 and 10".to_string(),
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(CardError::InvalidConfig(
                "jpeg_quality must be between 1 and 100".to_string(),
            ));
        }
        if self.png_compression > 9 {
            return Err(CardError::InvalidConfig(
                "png_compression must be between 0 and 9".to_string(),
            ));
        }
        if !(self.page_margin_cm >= 0.0 && self.card_gap_cm >= 0.0) {
            return Err(CardError::InvalidConfig(
                "page_margin_cm and card_gap_cm must not be negative".to_string(),
            ));
        }
        if self.max_canvas_pixels == 0 {
            return Err(CardError::InvalidConfig(
                "max_canvas_pixels must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where the static card assets live.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Card background template (expected 696 × 992 px).
    pub template_path: Option<PathBuf>,

    /// Flag emblem drawn top-left.
    pub flag_path: Option<PathBuf>,

    /// Logo emblem drawn top-right.
    pub logo_path: Option<PathBuf>,

    /// Extra font files (TTF/OTF) for card text.
    pub font_paths: Vec<PathBuf>,
}

impl AssetConfig {
    /// Create an asset config with a template.
    pub fn with_template(path: impl Into<PathBuf>) -> Self {
        Self {
            template_path: Some(path.into()),
            ..Default::default()
        }
    }

    /// Set the flag emblem.
    pub fn flag(mut self, path: impl Into<PathBuf>) -> Self {
        self.flag_path = Some(path.into());
        self
    }

    /// Set the logo emblem.
    pub fn logo(mut self, path: impl Into<PathBuf>) -> Self {
        self.logo_path = Some(path.into());
        self
    }

    /// Add a font file.
    pub fn font(mut self, path: impl Into<PathBuf>) -> Self {
        self.font_paths.push(path.into());
        self
    }
}

/// Combined configuration for card rendering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Export configuration.
    pub export: ExportConfig,

    /// Asset locations.
    pub assets: AssetConfig,
}

impl StudioConfig {
    /// Validate the entire configuration.
    pub fn validate(&self) -> Result<()> {
        self.export.validate()
    }
}
