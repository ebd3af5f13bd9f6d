//! Error types for card layout, rasterization and export.

use crate::registration::FieldErrors;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the idcard-core library.
#[derive(Error, Debug)]
pub enum CardError {
    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A registration form or update failed validation.
    #[error("Validation failed: {0}")]
    Validation(FieldErrors),

    /// A static asset (template, flag, logo, font) could not be decoded.
    #[error("Failed to decode {asset} image: {message}")]
    AssetDecode { asset: &'static str, message: String },

    /// The photo bytes could not be decoded into an image.
    #[error("Photo could not be decoded: {0}")]
    PhotoDecode(String),

    /// The record references a remote photo that was never fetched.
    #[error("Photo '{0}' has not been fetched; remote images cannot be drawn into a capture")]
    UnresolvedPhoto(String),

    /// The capture document could not be parsed by the rasterizer.
    #[error("Capture render could not be parsed: {0}")]
    SvgParse(String),

    /// No font face is available to draw card text with.
    #[error("No fonts available for card text; supply a font file")]
    NoFonts,

    /// The requested bitmap exceeds the configured canvas limit.
    #[error("Canvas {width}x{height} exceeds the limit of {limit} pixels")]
    CanvasTooLarge { width: u32, height: u32, limit: u64 },

    /// The bitmap could not be allocated.
    #[error("Failed to allocate a {width}x{height} canvas")]
    CanvasAllocation { width: u32, height: u32 },

    /// PNG encoding failed.
    #[error("PNG encoding failed: {0}")]
    PngEncodingError(String),

    /// JPEG encoding failed.
    #[error("JPEG encoding failed: {0}")]
    JpegEncodingError(String),

    /// Bulk export was requested with no cards.
    #[error("Nothing to export: no registrations")]
    EmptyExport,

    /// Writing an output file failed.
    #[error("Failed to write output '{path}': {message}")]
    OutputError { path: PathBuf, message: String },

    /// Reading an input file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for convenience.
pub type Result<T> = std::result::Result<T, CardError>;

impl From<FieldErrors> for CardError {
    fn from(errors: FieldErrors) -> Self {
        CardError::Validation(errors)
    }
}
