//! Card export: single-card PNG and paginated JPEG-in-PDF.
//!
//! Every export follows the same path: capture render, one snapshot per
//! canvas, encode, then write. A failure at any step aborts the whole export
//! and nothing is written.

use crate::assets::CardAssets;
use crate::capture::{render_page_svg, render_svg};
use crate::config::{ExportConfig, PageSize};
use crate::error::{CardError, Result};
use crate::geometry::CardGeometry;
use crate::raster::{Rasterizer, Snapshot};
use crate::registration::CardRecord;
use crate::units::{cm_to_px_300, print_px_to_points, PRINT_DPI};
use image::codecs::jpeg::JpegEncoder;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref, TextStr};
use std::io::{Cursor, Write};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Default file name of a single-card download.
pub const CARD_FILE_NAME: &str = "id_card.png";

/// Default file name of a bulk export.
pub const BULK_FILE_NAME: &str = "bulk_id_cards.pdf";

const IMAGE_NAME: Name<'static> = Name(b"Im1");

/// A flex-wrap grid of capture cards on one page, in 300 DPI pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageGrid {
    pub page_width: u32,
    pub page_height: u32,
    pub card_width: u32,
    pub card_height: u32,
    pub margin: u32,
    pub gap: u32,
    pub columns: u32,
    pub rows: u32,
}

impl PageGrid {
    /// Fit as many `card` sized cells as the page allows.
    pub fn new(page: PageSize, margin_cm: f64, gap_cm: f64, card: (u32, u32)) -> Self {
        let (width_cm, height_cm) = page.size_cm();
        let page_width = cm_to_px_300(width_cm);
        let page_height = cm_to_px_300(height_cm);
        let margin = cm_to_px_300(margin_cm);
        let gap = cm_to_px_300(gap_cm);
        let (card_width, card_height) = card;

        let fit = |extent: u32, cell: u32| {
            let usable = extent.saturating_sub(2 * margin) + gap;
            usable / (cell + gap).max(1)
        };

        Self {
            page_width,
            page_height,
            card_width,
            card_height,
            margin,
            gap,
            columns: fit(page_width, card_width),
            rows: fit(page_height, card_height),
        }
    }

    /// Cards per page.
    pub fn capacity(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    /// Pages needed for `cards` cards.
    pub fn page_count(&self, cards: usize) -> usize {
        match self.capacity() {
            0 => 0,
            capacity => cards.div_ceil(capacity),
        }
    }

    /// Top-left corner of the `slot`-th cell, filling rows left to right.
    pub fn origin(&self, slot: usize) -> (u32, u32) {
        let columns = self.columns.max(1) as usize;
        let col = (slot % columns) as u32;
        let row = (slot / columns) as u32;
        (
            self.margin + col * (self.card_width + self.gap),
            self.margin + row * (self.card_height + self.gap),
        )
    }
}

/// An encoded single-card PNG.
#[derive(Debug, Clone)]
pub struct PngCard {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Effective print resolution recorded in the file.
    pub dpi: u32,
}

impl PngCard {
    /// Write to `path` atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        write_atomically(path, &self.data)
    }
}

/// An encoded bulk PDF.
#[derive(Debug, Clone)]
pub struct BulkPdf {
    pub data: Vec<u8>,
    pub page_count: usize,
    pub card_count: usize,
}

impl BulkPdf {
    /// Write to `path` atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        write_atomically(path, &self.data)
    }
}

/// Renders and encodes card exports.
pub struct CardExporter {
    config: ExportConfig,
    geometry: CardGeometry,
    assets: CardAssets,
    rasterizer: Rasterizer,
}

impl CardExporter {
    /// Create an exporter, validating `config`.
    pub fn new(config: ExportConfig, assets: CardAssets) -> Result<Self> {
        config.validate()?;
        let rasterizer = Rasterizer::new(&assets, config.max_canvas_pixels)?;
        info!(
            "Card exporter ready (oversampling x{}, {:?} pages)",
            config.oversampling, config.page_size
        );
        Ok(Self {
            config,
            geometry: CardGeometry::STANDARD,
            assets,
            rasterizer,
        })
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn assets(&self) -> &CardAssets {
        &self.assets
    }

    pub fn geometry(&self) -> &CardGeometry {
        &self.geometry
    }

    /// The bulk page grid for the configured page size.
    pub fn page_grid(&self) -> PageGrid {
        PageGrid::new(
            self.config.page_size,
            self.config.page_margin_cm,
            self.config.card_gap_cm,
            self.geometry.template_size_px(),
        )
    }

    /// Capture one card at the single-card oversampling.
    pub fn snapshot_card(&self, record: &CardRecord) -> Result<Snapshot> {
        let scale = self.config.oversampling;
        let document = render_svg(record, &self.geometry, &self.assets, scale)?;
        self.rasterizer.snapshot(&document, scale)
    }

    /// Render one card as a PNG.
    pub fn export_card_png(&self, record: &CardRecord) -> Result<PngCard> {
        let start = Instant::now();
        let snapshot = self.snapshot_card(record)?;
        let dpi = PRINT_DPI * snapshot.scale();
        let data = encode_png(&snapshot, dpi, self.config.png_compression)?;
        info!(
            "Exported card {}x{} ({} bytes) in {:?}",
            snapshot.width(),
            snapshot.height(),
            data.len(),
            start.elapsed()
        );
        Ok(PngCard {
            data,
            width: snapshot.width(),
            height: snapshot.height(),
            dpi,
        })
    }

    /// Render every record onto grid pages and bundle them as one PDF.
    pub fn export_bulk_pdf(&self, records: &[CardRecord]) -> Result<BulkPdf> {
        if records.is_empty() {
            return Err(CardError::EmptyExport);
        }
        let start = Instant::now();
        let grid = self.page_grid();
        if grid.capacity() == 0 {
            return Err(CardError::InvalidConfig(format!(
                "a {}x{} card does not fit on a {:?} page",
                grid.card_width, grid.card_height, self.config.page_size
            )));
        }

        let scale = self.config.bulk_oversampling;
        self.rasterizer.check_canvas(
            grid.page_width.saturating_mul(scale),
            grid.page_height.saturating_mul(scale),
        )?;

        let origins: Vec<(u32, u32)> = (0..grid.capacity()).map(|slot| grid.origin(slot)).collect();
        let mut pages = Vec::with_capacity(grid.page_count(records.len()));
        for (index, chunk) in records.chunks(grid.capacity()).enumerate() {
            let document = render_page_svg(
                chunk,
                &origins[..chunk.len()],
                (grid.page_width, grid.page_height),
                &self.geometry,
                &self.assets,
                scale,
            )?;
            let snapshot = self.rasterizer.snapshot(&document, scale)?;
            let jpeg = encode_jpeg(&snapshot, self.config.jpeg_quality)?;
            debug!("Page {} encoded ({} cards, {} bytes)", index + 1, chunk.len(), jpeg.len());
            pages.push(JpegPage {
                data: jpeg,
                width: snapshot.width(),
                height: snapshot.height(),
            });
        }

        let data = write_pdf(&pages, (grid.page_width, grid.page_height));
        info!(
            "Exported {} cards on {} pages ({} bytes) in {:?}",
            records.len(),
            pages.len(),
            data.len(),
            start.elapsed()
        );
        Ok(BulkPdf {
            data,
            page_count: pages.len(),
            card_count: records.len(),
        })
    }
}

struct JpegPage {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

fn png_compression(level: u8) -> png::Compression {
    match level {
        0..=3 => png::Compression::Fast,
        4..=6 => png::Compression::Default,
        _ => png::Compression::Best,
    }
}

/// Encode a snapshot as RGBA PNG with a pHYs chunk for `dpi`.
fn encode_png(snapshot: &Snapshot, dpi: u32, compression: u8) -> Result<Vec<u8>> {
    let image = snapshot.to_rgba();
    let mut buffer = Cursor::new(Vec::new());

    let mut encoder = png::Encoder::new(&mut buffer, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png_compression(compression));
    let pixels_per_meter = (dpi as f64 / 0.0254).round() as u32;
    encoder.set_pixel_dims(Some(png::PixelDimensions {
        xppu: pixels_per_meter,
        yppu: pixels_per_meter,
        unit: png::Unit::Meter,
    }));

    let mut writer = encoder.write_header().map_err(|e| {
        CardError::PngEncodingError(format!("Failed to write PNG header: {}", e))
    })?;
    writer.write_image_data(image.as_raw()).map_err(|e| {
        CardError::PngEncodingError(format!("Failed to write PNG data: {}", e))
    })?;
    writer
        .finish()
        .map_err(|e| CardError::PngEncodingError(e.to_string()))?;

    Ok(buffer.into_inner())
}

fn encode_jpeg(snapshot: &Snapshot, quality: u8) -> Result<Vec<u8>> {
    let image = snapshot.to_rgb([255, 255, 255]);
    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, quality)
        .encode_image(&image)
        .map_err(|e| CardError::JpegEncodingError(e.to_string()))?;
    Ok(buffer)
}

/// One full-bleed JPEG per page; the media box is the page's 300 DPI size in points.
fn write_pdf(pages: &[JpegPage], page_px: (u32, u32)) -> Vec<u8> {
    let catalog_id = Ref::new(1);
    let tree_id = Ref::new(2);
    let info_id = Ref::new(3);
    let page_ids: Vec<Ref> = (0..pages.len()).map(|i| Ref::new(4 + 3 * i as i32)).collect();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(tree_id);
    pdf.pages(tree_id)
        .kids(page_ids.iter().copied())
        .count(pages.len() as i32);
    pdf.document_info(info_id)
        .title(TextStr("ID cards"))
        .producer(TextStr(concat!("idcard-core ", env!("CARGO_PKG_VERSION"))));

    let width = print_px_to_points(page_px.0);
    let height = print_px_to_points(page_px.1);

    for (page, &page_id) in pages.iter().zip(&page_ids) {
        let content_id = Ref::new(page_id.get() + 1);
        let image_id = Ref::new(page_id.get() + 2);

        let mut page_writer = pdf.page(page_id);
        page_writer.media_box(Rect::new(0.0, 0.0, width, height));
        page_writer.parent(tree_id);
        page_writer.contents(content_id);
        page_writer.resources().x_objects().pair(IMAGE_NAME, image_id);
        page_writer.finish();

        let mut image = pdf.image_xobject(image_id, &page.data);
        image.filter(Filter::DctDecode);
        image.width(page.width as i32);
        image.height(page.height as i32);
        image.color_space().device_rgb();
        image.bits_per_component(8);
        image.finish();

        let mut content = Content::new();
        content.save_state();
        content.transform([width, 0.0, 0.0, height, 0.0, 0.0]);
        content.x_object(IMAGE_NAME);
        content.restore_state();
        pdf.stream(content_id, &content.finish());
    }

    pdf.finish()
}

/// Write `data` to `path` through a temporary file in the same directory.
pub fn write_atomically(path: &Path, data: &[u8]) -> Result<()> {
    let output_error = |message: String| CardError::OutputError {
        path: path.to_path_buf(),
        message,
    };
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| output_error(e.to_string()))?;

    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(|e| output_error(e.to_string()))?;
    file.write_all(data).map_err(|e| output_error(e.to_string()))?;
    file.as_file().sync_all().map_err(|e| output_error(e.to_string()))?;
    file.persist(path).map_err(|e| output_error(e.error.to_string()))?;
    debug!("Wrote {} bytes to {}", data.len(), path.display());
    Ok(())
}
