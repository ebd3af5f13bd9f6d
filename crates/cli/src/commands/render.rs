//! `idcard render` and `idcard preview`: cards from a JSON record.

use crate::commands::exporter;
use crate::config::AppConfig;
use anyhow::{Context, Result};
use idcard_client::ApiClient;
use idcard_core::export::write_atomically;
use idcard_core::preview::render_html;
use idcard_core::{CardGeometry, CardRecord, PhotoRef, PreviewAssets};
use std::path::Path;
use tracing::info;

/// Read a card record, replacing its photo with `photo` when given.
pub fn load_record(path: &Path, photo: Option<&Path>) -> Result<CardRecord> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read record {}", path.display()))?;
    let mut record: CardRecord = serde_json::from_str(&text)
        .with_context(|| format!("Invalid card record {}", path.display()))?;
    if let Some(photo) = photo {
        let bytes = std::fs::read(photo)
            .with_context(|| format!("Failed to read photo {}", photo.display()))?;
        record.photo = Some(PhotoRef::Bytes(bytes));
    }
    Ok(record)
}

pub async fn run_render(config: &AppConfig, record: &Path, photo: Option<&Path>, out: &Path) -> Result<()> {
    let mut record = load_record(record, photo)?;
    if let Some(PhotoRef::Url(url)) = &record.photo {
        let client = ApiClient::new(&config.api)?;
        let bytes = client
            .fetch_photo(url)
            .await
            .with_context(|| format!("Failed to fetch photo {}", url))?;
        record.photo = Some(PhotoRef::Bytes(bytes));
    }

    let card = exporter(config)?.export_card_png(&record)?;
    card.save(out)?;
    info!("Rendered {} to {}", record.name, out.display());
    println!("Saved {} ({}x{} at {} DPI)", out.display(), card.width, card.height, card.dpi);
    Ok(())
}

pub fn run_preview(record: &Path, photo: Option<&Path>, template_url: &str, out: &Path) -> Result<()> {
    let record = load_record(record, photo)?;
    let assets = PreviewAssets {
        template_url: Some(template_url.to_string()).filter(|u| !u.is_empty()),
        ..PreviewAssets::default()
    };
    let card = render_html(&record, &CardGeometry::default(), &assets);
    let document = format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>ID card preview</title></head>\n<body>\n{}\n</body></html>\n",
        card
    );
    write_atomically(out, document.as_bytes())?;
    println!("Saved {}", out.display());
    Ok(())
}
