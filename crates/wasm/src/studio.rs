//! Card studio state shared by every binding: export settings, loaded assets
//! and a lazily built exporter.

use crate::error::{Result, StudioError};
use idcard_core::assets::data_url;
use idcard_core::preview::render_html;
use idcard_core::{
    AssetImage, BulkPdf, CardAssets, CardExporter, CardGeometry, CardRecord, ExportConfig,
    PageGrid, PageSize, PhotoUpload, PngCard, PreviewAssets,
};
use tracing::debug;

#[derive(Default)]
pub struct Studio {
    config: ExportConfig,
    assets: CardAssets,
    exporter: Option<CardExporter>,
}

impl Studio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn assets(&self) -> &CardAssets {
        &self.assets
    }

    pub fn set_template(&mut self, bytes: Vec<u8>) -> Result<()> {
        let template = AssetImage::from_bytes("template", bytes)?;
        self.assets.set_template(template);
        self.invalidate();
        Ok(())
    }

    pub fn set_flag(&mut self, bytes: Vec<u8>) -> Result<()> {
        self.assets.flag = Some(AssetImage::from_bytes("flag", bytes)?);
        self.invalidate();
        Ok(())
    }

    pub fn set_logo(&mut self, bytes: Vec<u8>) -> Result<()> {
        self.assets.logo = Some(AssetImage::from_bytes("logo", bytes)?);
        self.invalidate();
        Ok(())
    }

    pub fn load_font(&mut self, bytes: Vec<u8>) {
        debug!("Loaded font ({} bytes)", bytes.len());
        self.assets.fonts.push(bytes);
        self.invalidate();
    }

    /// Change the single-card oversampling; an out-of-range factor leaves the
    /// current one in place.
    pub fn set_oversampling(&mut self, factor: u32) -> Result<()> {
        let config = ExportConfig {
            oversampling: factor,
            ..self.config.clone()
        };
        config.validate()?;
        self.config = config;
        self.invalidate();
        Ok(())
    }

    pub fn set_page_size(&mut self, name: &str) -> Result<()> {
        let page_size = match name.trim().to_ascii_lowercase().as_str() {
            "a3" => PageSize::A3,
            "a4" => PageSize::A4,
            _ => return Err(StudioError::UnknownPageSize(name.to_string())),
        };
        self.config.page_size = page_size;
        self.invalidate();
        Ok(())
    }

    /// Preview markup, with loaded assets inlined as data URLs.
    pub fn preview_html(&self, record: &CardRecord) -> String {
        let defaults = PreviewAssets::default();
        let assets = PreviewAssets {
            template_url: self
                .assets
                .template
                .as_ref()
                .map(AssetImage::data_url)
                .or(defaults.template_url),
            flag_url: self.assets.flag.as_ref().map(AssetImage::data_url),
            logo_url: self.assets.logo.as_ref().map(AssetImage::data_url),
        };
        render_html(record, &CardGeometry::default(), &assets)
    }

    pub fn card_png(&mut self, record: &CardRecord) -> Result<PngCard> {
        Ok(self.exporter()?.export_card_png(record)?)
    }

    pub fn bulk_pdf(&mut self, records: &[CardRecord]) -> Result<BulkPdf> {
        Ok(self.exporter()?.export_bulk_pdf(records)?)
    }

    /// Cards per bulk page at the current page size.
    pub fn page_capacity(&self) -> usize {
        PageGrid::new(
            self.config.page_size,
            self.config.page_margin_cm,
            self.config.card_gap_cm,
            CardGeometry::STANDARD.template_size_px(),
        )
        .capacity()
    }

    fn exporter(&mut self) -> Result<&CardExporter> {
        let exporter = match self.exporter.take() {
            Some(exporter) => exporter,
            None => CardExporter::new(self.config.clone(), self.assets.clone())?,
        };
        Ok(self.exporter.insert(exporter))
    }

    fn invalidate(&mut self) {
        self.exporter = None;
    }
}

/// Inline fetched photo bytes as a `data:` URL a card record can carry.
pub fn photo_data_url(bytes: &[u8]) -> String {
    let upload = PhotoUpload::new("photo", bytes.to_vec());
    data_url(&upload.content_type, &upload.bytes)
}
