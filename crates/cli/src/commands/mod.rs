//! Command handlers.

pub mod admin;
pub mod register;
pub mod render;

use crate::config::AppConfig;
use anyhow::{Context, Result};
use idcard_core::{CardAssets, CardExporter};

/// Load the configured assets and build an exporter.
pub fn exporter(config: &AppConfig) -> Result<CardExporter> {
    let assets = CardAssets::load(&config.studio.assets).context("Failed to load card assets")?;
    Ok(CardExporter::new(config.studio.export.clone(), assets)?)
}
