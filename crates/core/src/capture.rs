//! Off-screen capture adapter.
//!
//! Draws a [`CardLayout`] computed for [`RenderTarget::Capture`] as an SVG
//! document on the template's native pixel canvas. The document is never shown;
//! it exists only to be rasterized by [`crate::raster::Rasterizer`].

use crate::assets::{data_url, AssetImage, CardAssets};
use crate::error::{CardError, Result};
use crate::geometry::CardGeometry;
use crate::layout::{layout_card, CardLayout, EmblemSlot, TextBlock, FONT_FAMILY};
use crate::registration::{CardRecord, PhotoRef};
use crate::units::RenderTarget;
use image::imageops::FilterType;
use image::ImageFormat;
use std::io::Cursor;
use tracing::debug;

/// Fill used when no template is configured.
pub const FALLBACK_BACKGROUND: &str = "#ffffff";

/// Background of a bulk page.
pub const PAGE_BACKGROUND: &str = "#ffffff";

/// An SVG document ready for rasterization.
#[derive(Debug, Clone)]
pub struct CaptureDocument {
    pub svg: String,
    pub width: u32,
    pub height: u32,
}

/// Render one card on its own capture canvas.
///
/// `photo_scale` is the oversampling the document will be rasterized at; the
/// photo is resampled to that resolution so it stays sharp.
pub fn render_svg(
    record: &CardRecord,
    geometry: &CardGeometry,
    assets: &CardAssets,
    photo_scale: u32,
) -> Result<CaptureDocument> {
    let layout = layout_card(record, geometry, RenderTarget::Capture);
    let photo = prepare_photo(record, &layout, photo_scale)?;

    let mut svg = open_svg(layout.width, layout.height);
    write_card(&mut svg, &layout, photo.as_deref(), assets, "card-");
    svg.push_str("</svg>");

    Ok(CaptureDocument {
        svg,
        width: layout.width,
        height: layout.height,
    })
}

/// Render several cards onto one page canvas, one card per origin.
pub fn render_page_svg(
    records: &[CardRecord],
    origins: &[(u32, u32)],
    page_size: (u32, u32),
    geometry: &CardGeometry,
    assets: &CardAssets,
    photo_scale: u32,
) -> Result<CaptureDocument> {
    let (width, height) = page_size;
    let mut svg = open_svg(width, height);
    svg.push_str(&format!(
        r#"<rect width="{}" height="{}" fill="{}"/>"#,
        width, height, PAGE_BACKGROUND
    ));

    for (index, (record, (x, y))) in records.iter().zip(origins).enumerate() {
        let layout = layout_card(record, geometry, RenderTarget::Capture);
        let photo = prepare_photo(record, &layout, photo_scale)?;
        svg.push_str(&format!(r#"<g transform="translate({} {})">"#, x, y));
        write_card(&mut svg, &layout, photo.as_deref(), assets, &format!("c{}-", index));
        svg.push_str("</g>");
    }
    svg.push_str("</svg>");

    Ok(CaptureDocument { svg, width, height })
}

/// Decode, centre-crop and re-encode a photo for a square slot of `size_px`.
pub fn photo_data_url(photo: &PhotoRef, size_px: u32) -> Result<String> {
    let bytes = photo.load_bytes()?;
    let decoded =
        image::load_from_memory(&bytes).map_err(|e| CardError::PhotoDecode(e.to_string()))?;
    let side = size_px.max(1);
    let cropped = decoded.resize_to_fill(side, side, FilterType::Lanczos3);

    let mut out = Cursor::new(Vec::new());
    cropped
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| CardError::PngEncodingError(e.to_string()))?;
    Ok(data_url("image/png", &out.into_inner()))
}

fn prepare_photo(record: &CardRecord, layout: &CardLayout, scale: u32) -> Result<Option<String>> {
    match (&record.photo, &layout.photo) {
        (Some(photo), Some(slot)) => {
            let side = slot.size * scale.max(1);
            debug!("Resampling photo to {}x{}", side, side);
            photo_data_url(photo, side).map(Some)
        }
        _ => Ok(None),
    }
}

fn open_svg(width: u32, height: u32) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = width,
        h = height
    )
}

/// Append one card's elements. `id_prefix` keeps clip-path ids unique per page.
fn write_card(
    svg: &mut String,
    layout: &CardLayout,
    photo_href: Option<&str>,
    assets: &CardAssets,
    id_prefix: &str,
) {
    let (w, h) = (layout.width, layout.height);
    svg.push_str(&format!(
        r#"<defs><clipPath id="{p}bounds"><rect width="{w}" height="{h}"/></clipPath>"#,
        p = id_prefix,
        w = w,
        h = h
    ));
    if let Some(slot) = &layout.photo {
        svg.push_str(&format!(
            r#"<clipPath id="{p}photo"><rect x="{x}" y="{y}" width="{s}" height="{s}" rx="{r}" ry="{r}"/></clipPath>"#,
            p = id_prefix,
            x = slot.left,
            y = slot.top,
            s = slot.size,
            r = slot.corner_radius
        ));
    }
    svg.push_str("</defs>");
    svg.push_str(&format!(r#"<g clip-path="url(#{}bounds)">"#, id_prefix));

    // Template stretched to the canvas, like a background-size: 100% 100%.
    match &assets.template {
        Some(template) => svg.push_str(&format!(
            r#"<image x="0" y="0" width="{}" height="{}" preserveAspectRatio="none" xlink:href="{}"/>"#,
            w,
            h,
            template.data_url()
        )),
        None => svg.push_str(&format!(
            r#"<rect width="{}" height="{}" fill="{}"/>"#,
            w, h, FALLBACK_BACKGROUND
        )),
    }

    if let Some(flag) = &assets.flag {
        write_emblem(svg, &layout.emblems.flag, flag);
    }
    if let Some(logo) = &assets.logo {
        write_emblem(svg, &layout.emblems.logo, logo);
    }

    if let (Some(slot), Some(href)) = (&layout.photo, photo_href) {
        svg.push_str(&format!(
            r#"<rect x="{x}" y="{y}" width="{s}" height="{s}" rx="{r}" ry="{r}" fill="{bg}"/>"#,
            x = slot.left,
            y = slot.top,
            s = slot.size,
            r = slot.corner_radius,
            bg = slot.background
        ));
        svg.push_str(&format!(
            r#"<image x="{x}" y="{y}" width="{s}" height="{s}" preserveAspectRatio="xMidYMid slice" clip-path="url(#{p}photo)" xlink:href="{href}"/>"#,
            x = slot.left,
            y = slot.top,
            s = slot.size,
            p = id_prefix,
            href = href
        ));
        // Stroke sits inside the slot, as with border-box sizing.
        let inset = slot.border_width / 2.0;
        svg.push_str(&format!(
            r#"<rect x="{x}" y="{y}" width="{s}" height="{s}" rx="{r}" ry="{r}" fill="none" stroke="{c}" stroke-width="{bw}"/>"#,
            x = slot.left as f32 + inset,
            y = slot.top as f32 + inset,
            s = slot.size as f32 - slot.border_width,
            r = (slot.corner_radius - inset).max(0.0),
            c = slot.border_color,
            bw = slot.border_width
        ));
    }

    for block in layout.text_blocks() {
        write_text(svg, block);
    }
    svg.push_str("</g>");
}

fn write_emblem(svg: &mut String, slot: &EmblemSlot, image: &AssetImage) {
    svg.push_str(&format!(
        r#"<image x="{}" y="{}" width="{s}" height="{s}" preserveAspectRatio="xMidYMid meet" xlink:href="{}"/>"#,
        slot.left,
        slot.top,
        image.data_url(),
        s = slot.size
    ));
}

fn write_text(svg: &mut String, block: &TextBlock) {
    if let Some(bg) = &block.background {
        svg.push_str(&format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" rx="{r}" ry="{r}" fill="{}"/>"#,
            block.left,
            block.top,
            block.width,
            block.height,
            bg.color,
            r = bg.corner_radius
        ));
    }
    if block.text.is_empty() {
        return;
    }
    svg.push_str(&format!(
        r#"<text x="{}" y="{}" text-anchor="middle" font-family="{}" font-size="{}" font-weight="{}" fill="{}">{}</text>"#,
        block.center_x(),
        block.baseline,
        escape_xml(FONT_FAMILY),
        block.font_size,
        block.font_weight,
        block.color,
        escape_xml(&block.text)
    ));
}

/// Escape text for XML element content and attribute values.
pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::tests::solid_png;

    fn asha() -> CardRecord {
        CardRecord::new("Asha", "Kunthoor", "Kadaba", vec!["Unit President".to_string()])
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("A & B <c>"), "A &amp; B &lt;c&gt;");
        assert_eq!(escape_xml(r#"'q' "q""#), "&apos;q&apos; &quot;q&quot;");
    }

    #[test]
    fn test_card_svg_canvas_and_text() {
        let doc = render_svg(&asha(), &CardGeometry::STANDARD, &CardAssets::default(), 1).unwrap();
        assert_eq!((doc.width, doc.height), (696, 992));
        assert!(doc.svg.contains(r#"width="696" height="992""#));
        assert!(doc.svg.contains(">ASHA</text>"));
        assert!(doc.svg.contains(">Unit President</text>"));
        assert!(doc.svg.contains(">Kunthoor – Kadaba</text>"));
        assert!(doc.svg.contains(FALLBACK_BACKGROUND));
        assert!(!doc.svg.contains("card-photo"));
    }

    #[test]
    fn test_card_svg_embeds_photo_and_template() {
        let mut assets = CardAssets::default();
        assets.set_template(
            AssetImage::from_bytes("template", solid_png(696, 992, [200, 220, 200, 255])).unwrap(),
        );
        let record = asha().with_photo(PhotoRef::Bytes(solid_png(40, 60, [255, 0, 0, 255])));
        let doc = render_svg(&record, &CardGeometry::STANDARD, &assets, 1).unwrap();
        assert!(doc.svg.contains(r#"preserveAspectRatio="none""#));
        assert!(doc.svg.contains(r#"clip-path="url(#card-photo)""#));
        assert!(doc.svg.contains(r#"x="201" y="201" width="295" height="295""#));
    }

    #[test]
    fn test_text_is_escaped() {
        let record = CardRecord::new("Tom & <Jerry>", "Kunthoor", "Kadaba", vec![]);
        let doc = render_svg(&record, &CardGeometry::STANDARD, &CardAssets::default(), 1).unwrap();
        assert!(doc.svg.contains("TOM &amp; &lt;JERRY&gt;"));
    }

    #[test]
    fn test_unfetched_photo_is_refused() {
        let record = asha().with_photo(PhotoRef::Url("https://cdn.example.com/a.jpg".to_string()));
        let err = render_svg(&record, &CardGeometry::STANDARD, &CardAssets::default(), 1).unwrap_err();
        assert!(matches!(err, CardError::UnresolvedPhoto(_)));
    }

    #[test]
    fn test_undecodable_photo_is_refused() {
        let record = asha().with_photo(PhotoRef::Bytes(vec![1, 2, 3, 4]));
        let err = render_svg(&record, &CardGeometry::STANDARD, &CardAssets::default(), 1).unwrap_err();
        assert!(matches!(err, CardError::PhotoDecode(_)));
    }

    #[test]
    fn test_photo_is_cropped_square() {
        let url = photo_data_url(&PhotoRef::Bytes(solid_png(40, 80, [0, 0, 255, 255])), 30).unwrap();
        let payload = url.strip_prefix("data:image/png;base64,").unwrap();
        let bytes = base64::Engine::decode(&base64::engine::general_purpose::STANDARD, payload).unwrap();
        let img = image::load_from_memory(&bytes).unwrap();
        assert_eq!((img.width(), img.height()), (30, 30));
    }

    #[test]
    fn test_page_svg_uses_unique_ids() {
        let records = vec![asha(), asha()];
        let doc = render_page_svg(
            &records,
            &[(59, 59), (779, 59)],
            (3508, 4961),
            &CardGeometry::STANDARD,
            &CardAssets::default(),
            1,
        )
        .unwrap();
        assert!(doc.svg.contains(r#"translate(59 59)"#));
        assert!(doc.svg.contains(r#"translate(779 59)"#));
        assert!(doc.svg.contains(r#"id="c0-bounds""#));
        assert!(doc.svg.contains(r#"id="c1-bounds""#));
        assert_eq!(doc.svg.matches(">ASHA</text>").count(), 2);
    }
}
