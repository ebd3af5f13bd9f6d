//! Tests for the studio state behind the browser bindings.
//!
//! Run with: cargo test --package idcard-wasm

use idcard_core::{CardError, CardRecord, PageSize, PhotoRef};
use idcard_wasm::{photo_data_url, IdCardStudio, Studio, StudioError};
use image::{ImageFormat, Rgba, RgbaImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};

fn png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    let image = RgbaImage::from_pixel(width, height, Rgba(color));
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// A sans font from the host for card text, if one is installed.
fn host_font() -> Option<Vec<u8>> {
    fn collect(dir: &Path, depth: u32, out: &mut Vec<PathBuf>) {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };
        for path in entries.flatten().map(|e| e.path()) {
            if path.is_dir() && depth > 0 {
                collect(&path, depth - 1, out);
            } else if path.extension().map_or(false, |e| e.eq_ignore_ascii_case("ttf")) {
                out.push(path);
            }
        }
    }
    let mut files = Vec::new();
    for dir in ["/usr/share/fonts", "/usr/local/share/fonts", "/Library/Fonts", "C:\\Windows\\Fonts"] {
        collect(Path::new(dir), 4, &mut files);
    }
    files.sort();
    let sans = files.iter().find(|p| {
        let name = p.to_string_lossy().to_lowercase();
        name.contains("sans") && !name.contains("mono") && !name.contains("bold")
    });
    std::fs::read(sans.or_else(|| files.first())?).ok()
}

/// A studio with a font loaded, or `None` when the host has no fonts.
fn studio_with_font() -> Option<Studio> {
    let mut studio = Studio::new();
    studio.load_font(host_font()?);
    Some(studio)
}

fn asha() -> CardRecord {
    CardRecord::new(
        "asha",
        "Kunthoor",
        "Kadaba",
        vec!["Unit President".to_string()],
    )
}

#[test]
fn test_rejects_undecodable_template() {
    let mut studio = Studio::new();
    let err = studio.set_template(vec![0, 1, 2, 3]).unwrap_err();
    assert!(matches!(err, StudioError::Card(CardError::AssetDecode { .. })));
    assert!(studio.assets().template.is_none());
}

#[test]
fn test_page_size_changes_capacity() {
    let mut studio = Studio::new();
    assert_eq!(studio.page_capacity(), 16);
    studio.set_page_size("A4").unwrap();
    assert_eq!(studio.config().page_size, PageSize::A4);
    assert_eq!(studio.page_capacity(), 9);
    assert!(matches!(
        studio.set_page_size("letter"),
        Err(StudioError::UnknownPageSize(_))
    ));
}

#[test]
fn test_invalid_oversampling_keeps_previous() {
    let mut studio = Studio::new();
    assert!(studio.set_oversampling(0).is_err());
    assert_eq!(studio.config().oversampling, 5);
    studio.set_oversampling(2).unwrap();
    assert_eq!(studio.config().oversampling, 2);
}

#[test]
fn test_preview_inlines_loaded_template() {
    let mut studio = Studio::new();
    let html = studio.preview_html(&asha());
    assert!(html.contains("/idcard-template.png"));

    studio.set_template(png(696, 992, [0, 80, 160, 255])).unwrap();
    let html = studio.preview_html(&asha());
    assert!(html.contains("data:image/png;base64,"));
    assert!(html.contains("ASHA"));
}

#[test]
fn test_card_png_uses_current_settings() {
    let Some(mut studio) = studio_with_font() else {
        eprintln!("Skipping test: no font file found");
        return;
    };
    studio.set_template(png(696, 992, [0, 80, 160, 255])).unwrap();
    studio.set_oversampling(1).unwrap();

    let record = asha().with_photo(PhotoRef::Bytes(png(120, 160, [200, 30, 30, 255])));
    let card = studio.card_png(&record).unwrap();
    assert_eq!((card.width, card.height), (696, 992));
    assert_eq!(&card.data[..8], b"\x89PNG\r\n\x1a\n");

    studio.set_oversampling(2).unwrap();
    let card = studio.card_png(&record).unwrap();
    assert_eq!((card.width, card.height), (1392, 1984));
}

#[test]
fn test_bulk_pdf_requires_records() {
    let Some(mut studio) = studio_with_font() else {
        eprintln!("Skipping test: no font file found");
        return;
    };
    assert!(matches!(
        studio.bulk_pdf(&[]),
        Err(StudioError::Card(CardError::EmptyExport))
    ));

    let pdf = studio.bulk_pdf(&[asha(), asha()]).unwrap();
    assert_eq!(pdf.card_count, 2);
    assert_eq!(pdf.page_count, 1);
    assert!(pdf.data.starts_with(b"%PDF-"));
}

#[test]
fn test_binding_exposes_studio() {
    let mut binding = IdCardStudio::new();
    binding.load_font(Vec::new());
    assert_eq!(binding.studio().assets().fonts.len(), 1);
}

#[test]
fn test_fetched_photo_is_drawn() {
    let Some(mut studio) = studio_with_font() else {
        eprintln!("Skipping test: no font file found");
        return;
    };
    studio.set_oversampling(1).unwrap();

    let url = photo_data_url(&png(40, 40, [0, 200, 0, 255]));
    assert!(url.starts_with("data:image/png;base64,"));
    let json = format!(
        r#"{{"_id":"r1","name":"Asha","cluster":"Kunthoor","unit":"Kadaba","designations":["Unit President"],"photoUrl":"{}"}}"#,
        url
    );
    let record: CardRecord = serde_json::from_str(&json).unwrap();
    let card = studio.card_png(&record).unwrap();
    let img = image::load_from_memory(&card.data).unwrap().to_rgba8();
    let pixel = img.get_pixel(348, 348).0;
    assert!(pixel[1] > 190 && pixel[0] < 10, "photo missing: {:?}", pixel);
}

#[test]
fn test_unfetched_photo_url_is_refused() {
    let Some(mut studio) = studio_with_font() else {
        eprintln!("Skipping test: no font file found");
        return;
    };
    let record: CardRecord = serde_json::from_str(
        r#"{"name":"Asha","cluster":"Kunthoor","unit":"Kadaba","photoUrl":"/uploads/asha.jpg"}"#,
    )
    .unwrap();
    assert!(matches!(
        studio.bulk_pdf(&[record]),
        Err(StudioError::Card(CardError::UnresolvedPhoto(_)))
    ));
}
