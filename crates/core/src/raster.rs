//! Rasterization of capture documents.

use crate::assets::CardAssets;
use crate::capture::CaptureDocument;
use crate::error::{CardError, Result};
use image::{Rgb, RgbImage, Rgba, RgbaImage};
use resvg::{tiny_skia, usvg};
use tracing::debug;

/// Installed families tried for `sans-serif` when no font is supplied.
const FALLBACK_FAMILIES: &[&str] = &[
    "Roboto",
    "DejaVu Sans",
    "Liberation Sans",
    "Noto Sans",
    "Arial",
    "Helvetica",
];

/// Turns capture SVG documents into bitmaps.
pub struct Rasterizer {
    options: usvg::Options<'static>,
    max_canvas_pixels: u64,
}

impl Rasterizer {
    /// Create a rasterizer with the assets' fonts registered.
    ///
    /// `sans-serif` resolves to the first supplied font, or to a common
    /// installed family when none is supplied. Fails with
    /// [`CardError::NoFonts`] when no face is available at all.
    pub fn new(assets: &CardAssets, max_canvas_pixels: u64) -> Result<Self> {
        let mut options = usvg::Options::default();
        let fontdb = options.fontdb_mut();
        for font in &assets.fonts {
            fontdb.load_font_data(font.clone());
        }
        let supplied = first_family(fontdb);
        #[cfg(feature = "system-fonts")]
        fontdb.load_system_fonts();

        let family = supplied
            .or_else(|| fallback_family(fontdb))
            .ok_or(CardError::NoFonts)?;
        debug!(
            "Rasterizer font database has {} faces; sans-serif is {}",
            fontdb.len(),
            family
        );
        fontdb.set_sans_serif_family(family);
        Ok(Self {
            options,
            max_canvas_pixels,
        })
    }

    /// Family that `sans-serif` text is drawn with.
    pub fn sans_serif_family(&self) -> &str {
        self.options.fontdb.family_name(&usvg::fontdb::Family::SansSerif)
    }

    /// Configured canvas area limit.
    pub fn max_canvas_pixels(&self) -> u64 {
        self.max_canvas_pixels
    }

    /// Check a canvas size against the limit without allocating anything.
    pub fn check_canvas(&self, width: u32, height: u32) -> Result<()> {
        let area = width as u64 * height as u64;
        if width == 0 || height == 0 {
            return Err(CardError::CanvasAllocation { width, height });
        }
        if area > self.max_canvas_pixels {
            return Err(CardError::CanvasTooLarge {
                width,
                height,
                limit: self.max_canvas_pixels,
            });
        }
        Ok(())
    }

    /// Rasterize `document` at `scale` times its pixel size.
    pub fn snapshot(&self, document: &CaptureDocument, scale: u32) -> Result<Snapshot> {
        let scale = scale.max(1);
        let width = document.width.saturating_mul(scale);
        let height = document.height.saturating_mul(scale);
        self.check_canvas(width, height)?;

        let tree = usvg::Tree::from_str(&document.svg, &self.options)
            .map_err(|e| CardError::SvgParse(e.to_string()))?;
        let mut pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or(CardError::CanvasAllocation { width, height })?;

        // Fill the target canvas exactly, whatever the parsed size.
        let size = tree.size();
        let transform = tiny_skia::Transform::from_scale(
            width as f32 / size.width(),
            height as f32 / size.height(),
        );
        resvg::render(&tree, transform, &mut pixmap.as_mut());
        debug!("Rasterized {}x{} at x{}", width, height, scale);

        Ok(Snapshot { pixmap, scale })
    }
}

fn first_family(db: &usvg::fontdb::Database) -> Option<String> {
    db.faces()
        .find_map(|face| face.families.first())
        .map(|(name, _)| name.clone())
}

fn fallback_family(db: &usvg::fontdb::Database) -> Option<String> {
    FALLBACK_FAMILIES
        .iter()
        .find(|wanted| {
            db.faces()
                .flat_map(|face| face.families.iter())
                .any(|(name, _)| name.as_str() == **wanted)
        })
        .map(|name| name.to_string())
        .or_else(|| first_family(db))
}

/// An in-memory bitmap of one capture render.
pub struct Snapshot {
    pixmap: tiny_skia::Pixmap,
    scale: u32,
}

impl Snapshot {
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Oversampling factor the snapshot was taken at.
    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Straight-alpha RGBA pixels.
    pub fn to_rgba(&self) -> RgbaImage {
        let mut image = RgbaImage::new(self.width(), self.height());
        for (dst, src) in image.pixels_mut().zip(self.pixmap.pixels()) {
            let c = src.demultiply();
            *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        image
    }

    /// RGB pixels composited over `background`, for formats without alpha.
    pub fn to_rgb(&self, background: [u8; 3]) -> RgbImage {
        let mut image = RgbImage::new(self.width(), self.height());
        for (dst, src) in image.pixels_mut().zip(self.pixmap.pixels()) {
            // Premultiplied: out = src + bg * (1 - a).
            let inv = 255 - src.alpha() as u16;
            let blend = |c: u8, bg: u8| (c as u16 + (bg as u16 * inv + 127) / 255).min(255) as u8;
            *dst = Rgb([
                blend(src.red(), background[0]),
                blend(src.green(), background[1]),
                blend(src.blue(), background[2]),
            ]);
        }
        image
    }
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snapshot")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("scale", &self.scale)
            .finish()
    }
}
