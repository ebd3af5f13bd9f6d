//! On-screen preview adapter.
//!
//! Renders a [`CardLayout`] computed for [`RenderTarget::Preview`] as an HTML
//! subtree: a relatively positioned card box with the template as its
//! background and absolutely positioned CSS pixel overlays.

use crate::assets::data_url;
use crate::capture::escape_xml;
use crate::geometry::CardGeometry;
use crate::layout::{layout_card, CardLayout, EmblemSlot, TextBlock, TextRole, FONT_FAMILY};
use crate::registration::{CardRecord, PhotoRef};
use crate::units::RenderTarget;

/// Where the preview loads its images from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewAssets {
    pub template_url: Option<String>,
    pub flag_url: Option<String>,
    pub logo_url: Option<String>,
}

impl Default for PreviewAssets {
    fn default() -> Self {
        Self {
            template_url: Some("/idcard-template.png".to_string()),
            flag_url: None,
            logo_url: None,
        }
    }
}

/// Render the preview markup for one record.
pub fn render_html(record: &CardRecord, geometry: &CardGeometry, assets: &PreviewAssets) -> String {
    let layout = layout_card(record, geometry, RenderTarget::Preview);
    render_layout(&layout, record, assets)
}

/// Render markup for an already computed preview layout.
pub fn render_layout(layout: &CardLayout, record: &CardRecord, assets: &PreviewAssets) -> String {
    let mut html = String::new();
    let background = match &assets.template_url {
        Some(url) => format!(
            "background-image:url('{}');background-size:100% 100%;background-repeat:no-repeat;",
            escape_xml(&css_url(url))
        ),
        None => String::new(),
    };
    html.push_str(&format!(
        r#"<div class="idcard-preview" style="position:relative;width:{}px;height:{}px;{}overflow:hidden;">"#,
        layout.width, layout.height, background
    ));

    if let Some(url) = &assets.flag_url {
        push_emblem(&mut html, "idcard-flag", &layout.emblems.flag, url);
    }
    if let Some(url) = &assets.logo_url {
        push_emblem(&mut html, "idcard-logo", &layout.emblems.logo, url);
    }

    if let (Some(slot), Some(src)) = (&layout.photo, record.photo.as_ref().map(photo_src)) {
        html.push_str(&format!(
            r#"<img class="idcard-photo" src="{}" alt="Photo of {}" style="position:absolute;top:{}px;left:{}px;width:{s}px;height:{s}px;border-radius:{}px;border:{}px solid {};object-fit:cover;background-color:{};box-sizing:border-box;">"#,
            escape_xml(&src),
            escape_xml(&record.name),
            slot.top,
            slot.left,
            slot.corner_radius,
            slot.border_width,
            slot.border_color,
            slot.background,
            s = slot.size
        ));
    }

    for block in layout.text_blocks() {
        push_text(&mut html, block);
    }
    html.push_str("</div>");
    html
}

fn photo_src(photo: &PhotoRef) -> String {
    match photo {
        PhotoRef::Bytes(bytes) => {
            let mime = image::guess_format(bytes)
                .map(|f| f.to_mime_type())
                .unwrap_or("application/octet-stream");
            data_url(mime, bytes)
        }
        PhotoRef::DataUrl(url) | PhotoRef::Url(url) => url.clone(),
    }
}

/// Percent-encode the characters that would end a CSS `url('…')` token.
fn css_url(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    for ch in url.chars() {
        match ch {
            '\'' | '"' | '(' | ')' | '\\' => out.push_str(&format!("%{:02X}", ch as u32)),
            c if c.is_whitespace() || c.is_control() => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    out.push_str(&format!("%{:02X}", byte));
                }
            }
            c => out.push(c),
        }
    }
    out
}

fn push_emblem(html: &mut String, class: &str, slot: &EmblemSlot, url: &str) {
    html.push_str(&format!(
        r#"<img class="{}" src="{}" alt="" style="position:absolute;top:{}px;left:{}px;width:{s}px;height:{s}px;object-fit:contain;">"#,
        class,
        escape_xml(url),
        slot.top,
        slot.left,
        s = slot.size
    ));
}

fn push_text(html: &mut String, block: &TextBlock) {
    let class = match block.role {
        TextRole::Name => "idcard-name",
        TextRole::Designation => "idcard-designation",
        TextRole::ClusterUnit => "idcard-cluster-unit",
    };
    let band = match &block.background {
        Some(bg) => format!(
            "background-color:{};border-radius:{}px;padding:{}px {}px;",
            bg.color, bg.corner_radius, bg.padding_y, bg.padding_x
        ),
        None => String::new(),
    };
    html.push_str(&format!(
        r#"<div class="{}" style="position:absolute;top:{}px;left:{}px;width:{}px;box-sizing:border-box;margin:0;text-align:center;line-height:1.2;white-space:nowrap;font-family:{};font-size:{}px;font-weight:{};color:{};{}">{}</div>"#,
        class,
        block.top,
        block.left,
        block.width,
        FONT_FAMILY,
        block.font_size,
        block.font_weight,
        block.color,
        band,
        escape_xml(&block.text)
    ));
}
