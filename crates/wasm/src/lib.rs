//! Browser bindings for ID card preview and export.
//!
//! The preview is mounted as HTML into an existing element; exports are
//! rasterized in WASM and handed back as bytes or saved through a blob
//! download.
//!
//! # Example (JavaScript)
//!
//! ```javascript
//! import init, { IdCardStudio } from 'idcard-wasm';
//!
//! await init();
//! const studio = new IdCardStudio();
//! studio.set_template(new Uint8Array(await (await fetch('/idcard-template.png')).arrayBuffer()));
//! studio.load_font(new Uint8Array(await (await fetch('/fonts/Roboto-Bold.ttf')).arrayBuffer()));
//!
//! const record = { name, cluster, unit, designations, photoPreview };
//! studio.mount_preview('card-preview', record);
//! studio.download_card(record);               // id_card.png
//!
//! // Backend records carry `photoUrl`; inline the photos before exporting.
//! for (const r of registrations) {
//!     if (r.photoUrl) r.photoUrl = await fetch_photo(apiBase, r.photoUrl);
//! }
//! studio.download_bulk(registrations);        // bulk_id_cards.pdf
//! ```
//!
//! Records whose `photoUrl` still points at a server are refused by the
//! exporter, and text needs at least one font passed to `load_font`.

use idcard_core::{resolve_photo_url, CardRecord, BULK_FILE_NAME, CARD_FILE_NAME};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Response, Url};

pub mod error;
pub mod studio;

pub use error::{Result, StudioError};
pub use studio::{photo_data_url, Studio};

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    tracing_wasm::set_as_global_default();
    tracing::info!("idcard-wasm initialized");
}

fn to_js(e: StudioError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn record_from_js(value: JsValue) -> std::result::Result<CardRecord, JsValue> {
    serde_wasm_bindgen::from_value(value)
        .map_err(|e| to_js(StudioError::InvalidRecord(e.to_string())))
}

/// ID card preview and export for one page.
#[wasm_bindgen]
#[derive(Default)]
pub struct IdCardStudio {
    studio: Studio,
}

#[wasm_bindgen]
impl IdCardStudio {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the card template image (696 x 992 px).
    pub fn set_template(&mut self, data: Vec<u8>) -> std::result::Result<(), JsValue> {
        self.studio.set_template(data).map_err(to_js)
    }

    pub fn set_flag(&mut self, data: Vec<u8>) -> std::result::Result<(), JsValue> {
        self.studio.set_flag(data).map_err(to_js)
    }

    pub fn set_logo(&mut self, data: Vec<u8>) -> std::result::Result<(), JsValue> {
        self.studio.set_logo(data).map_err(to_js)
    }

    /// Register a TTF/OTF font for card text.
    pub fn load_font(&mut self, data: Vec<u8>) {
        self.studio.load_font(data);
    }

    pub fn set_oversampling(&mut self, factor: u32) -> std::result::Result<(), JsValue> {
        self.studio.set_oversampling(factor).map_err(to_js)
    }

    /// `"a3"` or `"a4"`.
    pub fn set_page_size(&mut self, name: &str) -> std::result::Result<(), JsValue> {
        self.studio.set_page_size(name).map_err(to_js)
    }

    /// Cards per bulk page.
    #[wasm_bindgen(getter)]
    pub fn page_capacity(&self) -> usize {
        self.studio.page_capacity()
    }

    /// Preview markup for a record.
    pub fn preview_html(&self, record: JsValue) -> std::result::Result<String, JsValue> {
        Ok(self.studio.preview_html(&record_from_js(record)?))
    }

    /// Replace the contents of element `element_id` with the record's preview.
    pub fn mount_preview(&self, element_id: &str, record: JsValue) -> std::result::Result<(), JsValue> {
        let html = self.preview_html(record)?;
        let element = document()?
            .get_element_by_id(element_id)
            .ok_or_else(|| to_js(StudioError::Dom(format!("no element #{}", element_id))))?;
        element.set_inner_html(&html);
        Ok(())
    }

    /// Encoded PNG of one card.
    pub fn card_png(&mut self, record: JsValue) -> std::result::Result<Vec<u8>, JsValue> {
        let record = record_from_js(record)?;
        Ok(self.studio.card_png(&record).map_err(to_js)?.data)
    }

    /// Export one card and save it as `id_card.png`.
    pub fn download_card(&mut self, record: JsValue) -> std::result::Result<(), JsValue> {
        let png = self.card_png(record)?;
        download(&png, "image/png", CARD_FILE_NAME)
    }

    /// Encoded PDF of every record, several cards per page.
    pub fn bulk_pdf(&mut self, records: JsValue) -> std::result::Result<Vec<u8>, JsValue> {
        let records: Vec<CardRecord> = serde_wasm_bindgen::from_value(records)
            .map_err(|e| to_js(StudioError::InvalidRecord(e.to_string())))?;
        Ok(self.studio.bulk_pdf(&records).map_err(to_js)?.data)
    }

    /// Export every record and save the result as `bulk_id_cards.pdf`.
    pub fn download_bulk(&mut self, records: JsValue) -> std::result::Result<(), JsValue> {
        let pdf = self.bulk_pdf(records)?;
        download(&pdf, "application/pdf", BULK_FILE_NAME)
    }
}

impl IdCardStudio {
    /// The underlying studio, for callers on the Rust side.
    pub fn studio(&mut self) -> &mut Studio {
        &mut self.studio
    }
}

/// Fetch a stored photo and return it as a `data:` URL; relative URLs are
/// resolved against `base_url`.
#[wasm_bindgen]
pub async fn fetch_photo(base_url: String, photo_url: String) -> std::result::Result<String, JsValue> {
    let url = resolve_photo_url(&base_url, &photo_url)
        .ok_or_else(|| to_js(StudioError::InvalidRecord("empty photo URL".to_string())))?;
    let window = web_sys::window().ok_or_else(|| to_js(StudioError::Dom("no window".to_string())))?;
    let response: Response = JsFuture::from(window.fetch_with_str(&url)).await?.dyn_into()?;
    if !response.ok() {
        return Err(to_js(StudioError::Dom(format!(
            "photo {} returned HTTP {}",
            url,
            response.status()
        ))));
    }
    let buffer = JsFuture::from(response.array_buffer()?).await?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();
    tracing::debug!("Fetched photo {} ({} bytes)", url, bytes.len());
    Ok(photo_data_url(&bytes))
}

fn document() -> std::result::Result<web_sys::Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| to_js(StudioError::Dom("no document".to_string())))
}

/// Save `data` through a temporary object URL and a synthetic link click.
fn download(data: &[u8], mime: &str, file_name: &str) -> std::result::Result<(), JsValue> {
    let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(data));
    let options = BlobPropertyBag::new();
    options.set_type(mime);
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let anchor: HtmlAnchorElement = document()?.create_element("a")?.dyn_into()?;
    anchor.set_href(&url);
    anchor.set_download(file_name);
    anchor.click();
    Url::revoke_object_url(&url)?;
    tracing::debug!("Downloaded {} ({} bytes)", file_name, data.len());
    Ok(())
}
