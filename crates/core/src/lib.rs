//! # idcard-core
//!
//! Layout and rasterization pipeline for event registration ID cards.
//!
//! A card is described once in centimetres ([`CardGeometry`]) and laid out
//! for two render targets:
//!
//! - **Preview** at 96 DPI, rendered as HTML for on-screen display
//! - **Capture** at 300 DPI, rendered as SVG on the template's 696 × 992 canvas
//!
//! Capture renders are rasterized with resvg and exported as a PNG per card
//! or as a paginated JPEG-in-PDF for bulk printing.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use idcard_core::{AssetConfig, CardAssets, CardExporter, CardRecord, ExportConfig};
//! use std::path::Path;
//!
//! fn main() -> idcard_core::Result<()> {
//!     let assets = CardAssets::load(&AssetConfig::with_template("idcard-template.png"))?;
//!     let exporter = CardExporter::new(ExportConfig::default(), assets)?;
//!
//!     let record = CardRecord::new("Asha", "Kunthoor", "Kadaba", vec!["Unit President".into()]);
//!     let card = exporter.export_card_png(&record)?;
//!     card.save(Path::new("id_card.png"))?;
//!
//!     println!("Rendered {}x{} at {} DPI", card.width, card.height, card.dpi);
//!     Ok(())
//! }
//! ```
//!
//! ## Bulk Export
//!
//! ```rust,no_run
//! use idcard_core::{CardAssets, CardExporter, CardRecord, ExportConfig};
//! use std::path::Path;
//!
//! fn main() -> idcard_core::Result<()> {
//!     let exporter = CardExporter::new(ExportConfig::default(), CardAssets::default())?;
//!     let records: Vec<CardRecord> = (1..=40)
//!         .map(|i| CardRecord::new(format!("Attendee {}", i), "Mardala", "Panya", vec![]))
//!         .collect();
//!
//!     let pdf = exporter.export_bulk_pdf(&records)?;
//!     pdf.save(Path::new("bulk_id_cards.pdf"))?;
//!     println!("{} cards on {} pages", pdf.card_count, pdf.page_count);
//!     Ok(())
//! }
//! ```

pub mod assets;
pub mod board;
pub mod capture;
pub mod config;
pub mod error;
pub mod export;
pub mod geometry;
pub mod layout;
pub mod preview;
pub mod raster;
pub mod registration;
pub mod units;

// Re-export main types for convenience
pub use assets::{resolve_photo_url, AssetImage, CardAssets};
pub use board::{AdminBoard, ExportKind, ExportTicket, Notification, Severity};
pub use capture::CaptureDocument;
pub use config::{AssetConfig, ExportConfig, PageSize, StudioConfig};
pub use error::{CardError, Result};
pub use export::{BulkPdf, CardExporter, PageGrid, PngCard, BULK_FILE_NAME, CARD_FILE_NAME};
pub use geometry::CardGeometry;
pub use layout::{layout_card, CardLayout};
pub use preview::PreviewAssets;
pub use raster::{Rasterizer, Snapshot};
pub use registration::{
    CardRecord, Field, FieldErrors, NewRegistration, PhotoRef, PhotoUpload, Registration,
    RegistrationDraft, RegistrationUpdate, CLUSTERS, DESIGNATION_OPTIONS,
};
pub use units::{cm_to_px_300, cm_to_px_96, to_pixels, RenderTarget};

/// Initialize the library's logging.
/// Call this once at application startup if you want to see logs.
pub fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();
}
