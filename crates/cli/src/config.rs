//! Application configuration: file, then command-line overrides.

use crate::args::Cli;
use anyhow::{Context, Result};
use idcard_client::{AdminGateConfig, ApiConfig};
use idcard_core::StudioConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything the `idcard` binary can be configured with.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Backend connection.
    pub api: ApiConfig,

    /// Placeholder admin credentials.
    pub admin: AdminGateConfig,

    /// Export settings and asset paths.
    #[serde(flatten)]
    pub studio: StudioConfig,
}

impl AppConfig {
    /// Read a JSON config file, or use defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("Invalid config {}", path.display()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply command-line overrides.
    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(url) = &cli.base_url {
            self.api.base_url = url.clone();
        }
        let assets = &mut self.studio.assets;
        if let Some(path) = &cli.assets.template {
            assets.template_path = Some(path.clone());
        }
        if let Some(path) = &cli.assets.flag {
            assets.flag_path = Some(path.clone());
        }
        if let Some(path) = &cli.assets.logo {
            assets.logo_path = Some(path.clone());
        }
        assets.font_paths.extend(cli.assets.fonts.iter().cloned());
        if let Some(factor) = cli.assets.oversampling {
            self.studio.export.oversampling = factor;
        }
        self
    }

    /// Validate the entire configuration.
    pub fn validate(&self) -> Result<()> {
        self.api.validate().context("Invalid api configuration")?;
        self.studio.validate().context("Invalid export configuration")?;
        Ok(())
    }
}
