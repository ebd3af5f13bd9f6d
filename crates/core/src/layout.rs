//! Pure card layout.
//!
//! [`layout_card`] turns one record and the geometry into pixel positions for
//! a render target. The preview and capture adapters only draw what this
//! returns, so their positioning cannot drift apart.

use crate::geometry::CardGeometry;
use crate::registration::CardRecord;
use crate::units::RenderTarget;
use serde::Serialize;

/// Separator between cluster and unit on the card.
pub const CLUSTER_UNIT_SEPARATOR: &str = " – ";

/// Separator between designations on the card.
pub const DESIGNATION_SEPARATOR: &str = ", ";

/// Font stack used for every text block.
pub const FONT_FAMILY: &str = "Roboto, sans-serif";

pub const PHOTO_BORDER_COLOR: &str = "#0288D1";
pub const PHOTO_BACKGROUND: &str = "#ffffff";
pub const NAME_COLOR: &str = "#212121";
pub const DESIGNATION_COLOR: &str = "#ffffff";
pub const DESIGNATION_BACKGROUND: &str = "#0288D1";
pub const CLUSTER_UNIT_COLOR: &str = "#424242";

/// Line box height as a multiple of the font size.
const LINE_HEIGHT: f32 = 1.2;
/// Distance from the top of the line box to the baseline, as a multiple of the font size.
const BASELINE_OFFSET: f32 = 0.93;

/// Which text overlay a block is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextRole {
    Name,
    Designation,
    ClusterUnit,
}

/// Filled band behind a text block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBackground {
    pub color: &'static str,
    pub corner_radius: f32,
    pub padding_x: f32,
    pub padding_y: f32,
}

/// A full-width, centre-aligned line of text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextBlock {
    pub role: TextRole,
    pub text: String,
    pub top: u32,
    pub left: u32,
    pub width: u32,
    pub height: u32,
    /// Baseline position from the top of the card.
    pub baseline: f32,
    pub font_size: f32,
    pub font_weight: u16,
    pub color: &'static str,
    pub background: Option<TextBackground>,
}

impl TextBlock {
    /// Horizontal centre the text is anchored on.
    pub fn center_x(&self) -> f32 {
        self.left as f32 + self.width as f32 / 2.0
    }
}

/// The square photo slot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhotoOverlay {
    pub top: u32,
    pub left: u32,
    /// Width and height; the slot is square.
    pub size: u32,
    pub corner_radius: f32,
    pub border_width: f32,
    pub border_color: &'static str,
    pub background: &'static str,
}

/// A square box for the flag or logo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EmblemSlot {
    pub top: u32,
    pub left: u32,
    pub size: u32,
}

/// Where the optional flag (left) and logo (right) go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EmblemSlots {
    pub flag: EmblemSlot,
    pub logo: EmblemSlot,
}

/// Render-target-agnostic description of one card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardLayout {
    pub target: RenderTarget,
    pub width: u32,
    pub height: u32,
    pub photo: Option<PhotoOverlay>,
    pub name: TextBlock,
    pub designation: TextBlock,
    pub cluster_unit: TextBlock,
    pub emblems: EmblemSlots,
}

impl CardLayout {
    /// The three text blocks, top to bottom.
    pub fn text_blocks(&self) -> [&TextBlock; 3] {
        [&self.name, &self.designation, &self.cluster_unit]
    }
}

/// Name as printed: uppercased.
pub fn display_name(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Designations as printed: joined and capitalized per word.
pub fn display_designations(designations: &[String]) -> String {
    capitalize_words(&designations.join(DESIGNATION_SEPARATOR))
}

/// Cluster and unit as printed.
pub fn display_cluster_unit(cluster: &str, unit: &str) -> String {
    capitalize_words(&format!("{}{}{}", cluster.trim(), CLUSTER_UNIT_SEPARATOR, unit.trim()))
}

/// Uppercase the first letter of every whitespace-separated word, leaving the rest untouched.
pub fn capitalize_words(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if ch.is_whitespace() {
            at_word_start = true;
            out.push(ch);
        } else if at_word_start {
            out.extend(ch.to_uppercase());
            at_word_start = false;
        } else {
            out.push(ch);
        }
    }
    out
}

/// Lay out one card for `target`.
pub fn layout_card(record: &CardRecord, geometry: &CardGeometry, target: RenderTarget) -> CardLayout {
    let (width, height) = geometry.card_size_px(target);

    let photo = record.photo.as_ref().map(|_| {
        let size = target.px(geometry.photo_diameter_cm());
        let left = match target {
            RenderTarget::Preview => target.px(geometry.photo_left_cm()),
            // Centre on the absolute canvas instead of scaling the cm offset,
            // so high-DPI rounding cannot push the slot off centre.
            RenderTarget::Capture => (width.saturating_sub(size) as f64 / 2.0).round() as u32,
        };
        PhotoOverlay {
            top: target.px(geometry.photo_top_cm()),
            left,
            size,
            corner_radius: target.px_f32(geometry.photo_corner_radius_cm()),
            border_width: target.px_f32(geometry.photo_border_cm()).max(1.0),
            border_color: PHOTO_BORDER_COLOR,
            background: PHOTO_BACKGROUND,
        }
    });

    let name = text_block(
        TextRole::Name,
        display_name(&record.name),
        target.px(geometry.name_top_cm()),
        width,
        target.px_f32(geometry.name_font_cm()),
        700,
        NAME_COLOR,
        None,
    );

    let (pad_y_cm, pad_x_cm) = geometry.designation_padding_cm();
    let designation = text_block(
        TextRole::Designation,
        display_designations(&record.designations),
        target.px(geometry.designation_top_cm()),
        width,
        target.px_f32(geometry.designation_font_cm()),
        500,
        DESIGNATION_COLOR,
        Some(TextBackground {
            color: DESIGNATION_BACKGROUND,
            corner_radius: target.px_f32(geometry.designation_corner_radius_cm()),
            padding_x: target.px_f32(pad_x_cm),
            padding_y: target.px_f32(pad_y_cm),
        }),
    );

    let cluster_unit = text_block(
        TextRole::ClusterUnit,
        display_cluster_unit(&record.cluster, &record.unit),
        target.px(geometry.cluster_unit_top_cm()),
        width,
        target.px_f32(geometry.cluster_unit_font_cm()),
        400,
        CLUSTER_UNIT_COLOR,
        None,
    );

    let emblem_size = target.px(geometry.emblem_size_cm());
    let inset = target.px(geometry.emblem_inset_cm());
    let emblems = EmblemSlots {
        flag: EmblemSlot {
            top: inset,
            left: inset,
            size: emblem_size,
        },
        logo: EmblemSlot {
            top: inset,
            left: width.saturating_sub(inset + emblem_size),
            size: emblem_size,
        },
    };

    CardLayout {
        target,
        width,
        height,
        photo,
        name,
        designation,
        cluster_unit,
        emblems,
    }
}

#[allow(clippy::too_many_arguments)]
fn text_block(
    role: TextRole,
    text: String,
    top: u32,
    width: u32,
    font_size: f32,
    font_weight: u16,
    color: &'static str,
    background: Option<TextBackground>,
) -> TextBlock {
    let padding_y = background.as_ref().map_or(0.0, |b| b.padding_y);
    let line = font_size * LINE_HEIGHT;
    TextBlock {
        role,
        text,
        top,
        left: 0,
        width,
        height: (line + 2.0 * padding_y).round() as u32,
        baseline: top as f32 + padding_y + font_size * BASELINE_OFFSET,
        font_size,
        font_weight,
        color,
        background,
    }
}
