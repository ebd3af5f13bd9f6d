//! Static card assets: template, emblems and fonts.

use crate::config::AssetConfig;
use crate::error::{CardError, Result};
use crate::geometry::CardGeometry;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;
use std::fmt;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, warn};

/// Encodings the capture rasterizer can draw as-is.
const RASTER_FORMATS: &[ImageFormat] = &[
    ImageFormat::Png,
    ImageFormat::Jpeg,
    ImageFormat::Gif,
    ImageFormat::WebP,
];

/// A decoded-once image asset kept in its original encoding.
#[derive(Clone)]
pub struct AssetImage {
    bytes: Vec<u8>,
    mime: &'static str,
    width: u32,
    height: u32,
}

impl AssetImage {
    /// Validate `bytes` as an image and record its dimensions.
    pub fn from_bytes(asset: &'static str, bytes: Vec<u8>) -> Result<Self> {
        let decode_error = |e: image::ImageError| CardError::AssetDecode {
            asset,
            message: e.to_string(),
        };
        let format = image::guess_format(&bytes).map_err(decode_error)?;
        let decoded = image::load_from_memory_with_format(&bytes, format).map_err(decode_error)?;
        let (width, height) = (decoded.width(), decoded.height());

        if RASTER_FORMATS.contains(&format) {
            return Ok(Self {
                mime: format.to_mime_type(),
                width,
                height,
                bytes,
            });
        }

        // The rasterizer only decodes RASTER_FORMATS.
        debug!("Re-encoding {:?} {} as PNG", format, asset);
        let mut png = Cursor::new(Vec::new());
        decoded
            .write_to(&mut png, ImageFormat::Png)
            .map_err(decode_error)?;
        Ok(Self {
            mime: ImageFormat::Png.to_mime_type(),
            width,
            height,
            bytes: png.into_inner(),
        })
    }

    /// Read and validate an image file.
    pub fn load(asset: &'static str, path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(asset, bytes)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn mime(&self) -> &'static str {
        self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Inline `data:` URL of the original bytes.
    pub fn data_url(&self) -> String {
        data_url(self.mime, &self.bytes)
    }
}

impl fmt::Debug for AssetImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetImage")
            .field("mime", &self.mime)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Everything drawn on a card besides the record itself.
#[derive(Debug, Clone, Default)]
pub struct CardAssets {
    pub template: Option<AssetImage>,
    pub flag: Option<AssetImage>,
    pub logo: Option<AssetImage>,
    /// Raw TTF/OTF font files handed to the rasterizer.
    pub fonts: Vec<Vec<u8>>,
}

impl CardAssets {
    /// Load every configured asset from disk.
    pub fn load(config: &AssetConfig) -> Result<Self> {
        let mut assets = Self::default();
        if let Some(path) = &config.template_path {
            assets.set_template(AssetImage::load("template", path)?);
        }
        if let Some(path) = &config.flag_path {
            assets.flag = Some(AssetImage::load("flag", path)?);
        }
        if let Some(path) = &config.logo_path {
            assets.logo = Some(AssetImage::load("logo", path)?);
        }
        for path in &config.font_paths {
            debug!("Loading font {}", path.display());
            assets.fonts.push(std::fs::read(path)?);
        }
        Ok(assets)
    }

    /// Install a template; a size other than the capture canvas is stretched to fit.
    pub fn set_template(&mut self, template: AssetImage) {
        let expected = CardGeometry::STANDARD.template_size_px();
        if (template.width(), template.height()) != expected {
            warn!(
                "Template is {}x{}, expected {}x{}; it will be stretched to the card",
                template.width(),
                template.height(),
                expected.0,
                expected.1
            );
        }
        self.template = Some(template);
    }
}

/// Build a base64 `data:` URL.
pub fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Resolve a stored photo path against the backend base URL.
///
/// Empty input yields `None`; anything starting with `http` is returned as is.
/// Otherwise the two parts are joined with exactly one `/`.
pub fn resolve_photo_url(base: &str, url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    if url.starts_with("http") {
        return Some(url.to_string());
    }
    Some(format!(
        "{}/{}",
        base.trim_end_matches('/'),
        url.trim_start_matches('/')
    ))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use std::path::PathBuf;

    /// Solid-colour PNG for tests.
    pub(crate) fn solid_png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, Rgba(color));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    /// A regular sans font file from the host, if one is installed.
    pub(crate) fn any_font() -> Option<Vec<u8>> {
        const DIRS: &[&str] = &[
            "/usr/share/fonts",
            "/usr/local/share/fonts",
            "/Library/Fonts",
            "/System/Library/Fonts",
            "C:\\Windows\\Fonts",
        ];
        let mut files = Vec::new();
        for dir in DIRS {
            collect_fonts(Path::new(dir), 4, &mut files);
        }
        let regular_sans = |p: &PathBuf| {
            let name = p.file_name().map(|n| n.to_string_lossy().to_lowercase()).unwrap_or_default();
            name.contains("sans")
                && !["mono", "bold", "oblique", "italic", "condensed"]
                    .iter()
                    .any(|style| name.contains(style))
        };
        files.sort();
        let path = files.iter().find(|p| regular_sans(p)).or_else(|| files.first())?;
        std::fs::read(path).ok()
    }

    fn collect_fonts(dir: &Path, depth: u32, out: &mut Vec<PathBuf>) {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() && depth > 0 {
                collect_fonts(&path, depth - 1, out);
            } else if path
                .extension()
                .map_or(false, |ext| ext.eq_ignore_ascii_case("ttf"))
            {
                out.push(path);
            }
        }
    }

    #[test]
    fn test_asset_image_from_png() {
        let asset = AssetImage::from_bytes("template", solid_png(696, 992, [10, 20, 30, 255])).unwrap();
        assert_eq!((asset.width(), asset.height()), (696, 992));
        assert_eq!(asset.mime(), "image/png");
        assert!(asset.data_url().starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_bmp_asset_is_reencoded_as_png() {
        let img = RgbaImage::from_pixel(8, 6, Rgba([255, 0, 0, 255]));
        let mut bmp = Cursor::new(Vec::new());
        img.write_to(&mut bmp, ImageFormat::Bmp).unwrap();

        let asset = AssetImage::from_bytes("flag", bmp.into_inner()).unwrap();
        assert_eq!(asset.mime(), "image/png");
        assert_eq!((asset.width(), asset.height()), (8, 6));
        assert!(asset.bytes().starts_with(b"\x89PNG\r\n\x1a\n"));
        let decoded = image::load_from_memory(asset.bytes()).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(3, 3).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_asset_image_rejects_garbage() {
        let err = AssetImage::from_bytes("logo", b"not an image".to_vec()).unwrap_err();
        assert!(matches!(err, CardError::AssetDecode { asset: "logo", .. }));
    }

    #[test]
    fn test_mismatched_template_is_kept() {
        let mut assets = CardAssets::default();
        assets.set_template(AssetImage::from_bytes("template", solid_png(10, 10, [0, 0, 0, 255])).unwrap());
        assert_eq!(assets.template.as_ref().map(AssetImage::width), Some(10));
    }

    #[test]
    fn test_load_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("template.png");
        std::fs::write(&template, solid_png(4, 4, [255, 255, 255, 255])).unwrap();

        let assets = CardAssets::load(&AssetConfig::with_template(&template)).unwrap();
        assert!(assets.template.is_some());
        assert!(assets.flag.is_none());

        let missing = AssetConfig::with_template(dir.path().join("missing.png"));
        assert!(matches!(CardAssets::load(&missing), Err(CardError::Io(_))));
    }

    #[test]
    fn test_resolve_photo_url() {
        let base = "http://localhost:5000";
        assert_eq!(resolve_photo_url(base, ""), None);
        assert_eq!(
            resolve_photo_url(base, "https://cdn.example.com/a.jpg").as_deref(),
            Some("https://cdn.example.com/a.jpg")
        );
        assert_eq!(
            resolve_photo_url(base, "/uploads/a.jpg").as_deref(),
            Some("http://localhost:5000/uploads/a.jpg")
        );
        assert_eq!(
            resolve_photo_url("http://localhost:5000/", "uploads/a.jpg").as_deref(),
            Some("http://localhost:5000/uploads/a.jpg")
        );
    }
}
