//! Centimetre to pixel conversion for the two render targets.

use serde::{Deserialize, Serialize};

/// Pixel density of the on-screen preview.
pub const SCREEN_DPI: u32 = 96;

/// Pixel density of the capture render and every exported artifact.
pub const PRINT_DPI: u32 = 300;

/// Fixed pixels-per-centimetre approximation used at 96 DPI (96 / 2.54 ≈ 37.795).
pub const SCREEN_PX_PER_CM: f64 = 37.8;

const CM_PER_INCH: f64 = 2.54;

/// Convert a centimetre measurement to whole pixels at `dpi`.
///
/// 96 DPI uses the fixed [`SCREEN_PX_PER_CM`] factor; every other density is
/// computed exactly as `cm * dpi / 2.54`. Negative inputs clamp to zero.
pub fn to_pixels(value_cm: f64, dpi: u32) -> u32 {
    let px_per_cm = if dpi == SCREEN_DPI {
        SCREEN_PX_PER_CM
    } else {
        dpi as f64 / CM_PER_INCH
    };
    (value_cm * px_per_cm).round().max(0.0) as u32
}

/// Unrounded variant of [`to_pixels`], for font sizes and stroke widths.
pub fn to_pixels_f32(value_cm: f64, dpi: u32) -> f32 {
    let px_per_cm = if dpi == SCREEN_DPI {
        SCREEN_PX_PER_CM
    } else {
        dpi as f64 / CM_PER_INCH
    };
    (value_cm * px_per_cm).max(0.0) as f32
}

/// Preview conversion (96 DPI).
pub fn cm_to_px_96(value_cm: f64) -> u32 {
    to_pixels(value_cm, SCREEN_DPI)
}

/// Capture conversion (300 DPI).
pub fn cm_to_px_300(value_cm: f64) -> u32 {
    to_pixels(value_cm, PRINT_DPI)
}

/// Convert pixels at 300 DPI to PDF points (1/72 inch).
pub fn print_px_to_points(px: u32) -> f32 {
    px as f32 * 72.0 / PRINT_DPI as f32
}

/// Which presentation a layout is computed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderTarget {
    /// On-screen, low DPI, sized in CSS pixels.
    Preview,
    /// Off-screen, high DPI, absolute template pixels. Only ever rasterized.
    Capture,
}

impl RenderTarget {
    /// The DPI constant for this target.
    pub fn dpi(self) -> u32 {
        match self {
            RenderTarget::Preview => SCREEN_DPI,
            RenderTarget::Capture => PRINT_DPI,
        }
    }

    /// Convert a centimetre value for this target.
    pub fn px(self, value_cm: f64) -> u32 {
        to_pixels(value_cm, self.dpi())
    }

    /// Unrounded conversion for this target.
    pub fn px_f32(self, value_cm: f64) -> f32 {
        to_pixels_f32(value_cm, self.dpi())
    }
}
