//! Error types for the browser bindings.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StudioError {
    #[error(transparent)]
    Card(#[from] idcard_core::CardError),

    #[error("Invalid card record: {0}")]
    InvalidRecord(String),

    #[error("Unknown page size '{0}' (expected a3 or a4)")]
    UnknownPageSize(String),

    #[error("Browser API failed: {0}")]
    Dom(String),
}

pub type Result<T> = std::result::Result<T, StudioError>;
