//! Placeholder admin gate.
//!
//! Compares a username and password against configured values and hands out
//! an [`AdminSession`] that admin API calls require. It is not an
//! authentication scheme: nothing is sent to the backend.

use crate::config::AdminGateConfig;
use crate::error::{ClientError, Result};
use tracing::{info, warn};

/// Grants [`AdminSession`]s.
#[derive(Debug, Clone, Default)]
pub struct AdminGate {
    config: AdminGateConfig,
}

/// Capability token for admin API calls. Only [`AdminGate::login`] creates one.
#[derive(Debug)]
pub struct AdminSession {
    username: String,
}

impl AdminSession {
    pub fn username(&self) -> &str {
        &self.username
    }
}

impl AdminGate {
    pub fn new(config: AdminGateConfig) -> Self {
        Self { config }
    }

    /// Check credentials and open a session.
    pub fn login(&self, username: &str, password: &str) -> Result<AdminSession> {
        if username == self.config.username && password == self.config.password {
            info!("Admin session opened for {}", username);
            Ok(AdminSession {
                username: username.to_string(),
            })
        } else {
            warn!("Rejected admin login for {:?}", username);
            Err(ClientError::InvalidCredentials)
        }
    }

    /// End a session.
    pub fn logout(&self, session: AdminSession) {
        info!("Admin session closed for {}", session.username);
    }
}
