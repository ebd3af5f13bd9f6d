//! Client configuration.

use crate::error::{ClientError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable overriding the backend URL.
pub const BASE_URL_ENV: &str = "IDCARD_API_BASE_URL";

/// Backend used for local development.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Configuration for the backend connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the backend, without a trailing `/api`.
    /// Default: `IDCARD_API_BASE_URL`, or `http://localhost:5000`.
    pub base_url: String,

    /// Per-request timeout in seconds.
    /// Default: 30.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var(BASE_URL_ENV)
                .ok()
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    /// Create a config for a specific backend.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Set the request timeout.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        let url = self.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ClientError::InvalidConfig(format!(
                "base_url must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ClientError::InvalidConfig(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Credentials accepted by the admin gate.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminGateConfig {
    pub username: String,
    pub password: String,
}

impl Default for AdminGateConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "admin".to_string(),
        }
    }
}

impl std::fmt::Debug for AdminGateConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminGateConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
