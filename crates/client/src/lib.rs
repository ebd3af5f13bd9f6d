//! # idcard-client
//!
//! Async REST client for the ID card registration backend, plus the
//! placeholder admin gate that admin calls require.
//!
//! ```rust,no_run
//! use idcard_client::{AdminGate, ApiClient, ApiConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> idcard_client::Result<()> {
//!     let client = ApiClient::new(&ApiConfig::default())?;
//!     for registration in client.list_registrations().await? {
//!         println!("{} ({} – {})", registration.name, registration.cluster, registration.unit);
//!     }
//!
//!     let session = AdminGate::default().login("admin", "admin")?;
//!     let pdf = client.download_registrations_pdf(&session).await?;
//!     std::fs::write("registrations.pdf", pdf).ok();
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod session;

pub use api::{ApiClient, RegisterOutcome, DEFAULT_REGISTER_MESSAGE};
pub use config::{AdminGateConfig, ApiConfig, BASE_URL_ENV, DEFAULT_BASE_URL};
pub use error::{ClientError, Result};
pub use idcard_core::resolve_photo_url;
pub use session::{AdminGate, AdminSession};

/// File name the backend's registration listing is saved under.
pub const REGISTRATIONS_FILE_NAME: &str = "registrations.pdf";
