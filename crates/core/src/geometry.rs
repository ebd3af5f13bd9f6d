//! Card template geometry.
//!
//! Every offset lives here in centimetres and is converted per render target
//! through [`crate::units`]. Preview and capture layouts both read through
//! [`CardGeometry::STANDARD`], so moving an overlay means editing one constant.

use crate::units::RenderTarget;
use serde::Serialize;

/// Physical card layout, centimetres only (except the template's native pixel size).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CardGeometry {
    card_width_cm: f64,
    card_height_cm: f64,
    template_width_px: u32,
    template_height_px: u32,
    photo_diameter_cm: f64,
    photo_top_cm: f64,
    photo_corner_radius_cm: f64,
    photo_border_cm: f64,
    name_top_cm: f64,
    name_font_cm: f64,
    designation_top_cm: f64,
    designation_font_cm: f64,
    designation_padding_y_cm: f64,
    designation_padding_x_cm: f64,
    designation_corner_radius_cm: f64,
    cluster_unit_top_cm: f64,
    cluster_unit_font_cm: f64,
    emblem_size_cm: f64,
    emblem_inset_cm: f64,
}

impl CardGeometry {
    /// The 5.9 cm × 8.4 cm event card; template is 696 × 992 px at 300 DPI.
    pub const STANDARD: CardGeometry = CardGeometry {
        card_width_cm: 5.9,
        card_height_cm: 8.4,
        template_width_px: 696,
        template_height_px: 992,
        photo_diameter_cm: 2.5,
        photo_top_cm: 1.7,
        photo_corner_radius_cm: 0.4,
        photo_border_cm: 0.05,
        name_top_cm: 4.5,
        name_font_cm: 0.35,
        designation_top_cm: 5.0,
        designation_font_cm: 0.30,
        designation_padding_y_cm: 0.1,
        designation_padding_x_cm: 0.2,
        designation_corner_radius_cm: 0.1,
        cluster_unit_top_cm: 6.8,
        cluster_unit_font_cm: 0.28,
        emblem_size_cm: 1.0,
        emblem_inset_cm: 0.1,
    };

    pub fn card_width_cm(&self) -> f64 {
        self.card_width_cm
    }

    pub fn card_height_cm(&self) -> f64 {
        self.card_height_cm
    }

    /// Native pixel size of the template image; the capture canvas uses it verbatim.
    pub fn template_size_px(&self) -> (u32, u32) {
        (self.template_width_px, self.template_height_px)
    }

    pub fn photo_diameter_cm(&self) -> f64 {
        self.photo_diameter_cm
    }

    pub fn photo_top_cm(&self) -> f64 {
        self.photo_top_cm
    }

    /// Horizontal photo offset that centres the slot on the card.
    pub fn photo_left_cm(&self) -> f64 {
        (self.card_width_cm - self.photo_diameter_cm) / 2.0
    }

    pub fn photo_corner_radius_cm(&self) -> f64 {
        self.photo_corner_radius_cm
    }

    pub fn photo_border_cm(&self) -> f64 {
        self.photo_border_cm
    }

    pub fn name_top_cm(&self) -> f64 {
        self.name_top_cm
    }

    pub fn name_font_cm(&self) -> f64 {
        self.name_font_cm
    }

    pub fn designation_top_cm(&self) -> f64 {
        self.designation_top_cm
    }

    pub fn designation_font_cm(&self) -> f64 {
        self.designation_font_cm
    }

    /// Vertical and horizontal padding inside the designation band.
    pub fn designation_padding_cm(&self) -> (f64, f64) {
        (self.designation_padding_y_cm, self.designation_padding_x_cm)
    }

    pub fn designation_corner_radius_cm(&self) -> f64 {
        self.designation_corner_radius_cm
    }

    pub fn cluster_unit_top_cm(&self) -> f64 {
        self.cluster_unit_top_cm
    }

    pub fn cluster_unit_font_cm(&self) -> f64 {
        self.cluster_unit_font_cm
    }

    /// Side of the square box holding the flag and logo emblems.
    pub fn emblem_size_cm(&self) -> f64 {
        self.emblem_size_cm
    }

    pub fn emblem_inset_cm(&self) -> f64 {
        self.emblem_inset_cm
    }

    /// Card size in pixels for a render target.
    ///
    /// Capture renders at the template's native size rather than the converted
    /// card size (5.9 cm converts to 697 px; the template is 696 px wide).
    pub fn card_size_px(&self, target: RenderTarget) -> (u32, u32) {
        match target {
            RenderTarget::Preview => (
                target.px(self.card_width_cm),
                target.px(self.card_height_cm),
            ),
            RenderTarget::Capture => self.template_size_px(),
        }
    }
}

impl Default for CardGeometry {
    fn default() -> Self {
        Self::STANDARD
    }
}
