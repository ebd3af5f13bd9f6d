//! Error types for backend access.

use thiserror::Error;

/// Errors returned by [`crate::ApiClient`] and [`crate::AdminGate`].
#[derive(Error, Debug)]
pub enum ClientError {
    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The request never produced a response.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("Server responded {status}: {message}")]
    Status { status: u16, message: String },

    /// The response body was not what the endpoint returns.
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Admin login was rejected.
    #[error("Invalid credentials. Please try again.")]
    InvalidCredentials,

    /// A photo URL could not be resolved.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// HTTP status, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            ClientError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type alias for convenience.
pub type Result<T> = std::result::Result<T, ClientError>;
