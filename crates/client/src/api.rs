//! Async client for the registration backend's REST API.

use crate::config::ApiConfig;
use crate::error::{ClientError, Result};
use crate::session::AdminSession;
use idcard_core::{resolve_photo_url, CardRecord, NewRegistration, PhotoRef, Registration, RegistrationUpdate};
use reqwest::multipart::{Form, Part};
use reqwest::{header, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

/// Message shown when the backend accepts a registration without saying anything.
pub const DEFAULT_REGISTER_MESSAGE: &str = "Registration successful!";

/// What the backend said about a new registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterOutcome {
    pub message: String,
    /// The stored record, when the backend returns it.
    pub registration: Option<Registration>,
}

#[derive(Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct Envelope<T> {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<T>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// REST client. One instance per backend; cheap to clone.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client, validating `config`.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder().timeout(config.timeout()).build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET /api/registrations`
    pub async fn list_registrations(&self) -> Result<Vec<Registration>> {
        let response = self.http.get(self.endpoint("/api/registrations")).send().await?;
        let registrations: Vec<Registration> =
            decode(check(response, "Failed to fetch registrations").await?).await?;
        debug!("Fetched {} registrations", registrations.len());
        Ok(registrations)
    }

    /// `POST /api/register` as multipart form data.
    pub async fn register(&self, registration: &NewRegistration) -> Result<RegisterOutcome> {
        let photo = Part::bytes(registration.photo.bytes.clone())
            .file_name(registration.photo.file_name.clone())
            .mime_str(&registration.photo.content_type)?;
        let form = Form::new()
            .text("name", registration.name.clone())
            .text("cluster", registration.cluster.clone())
            .text("unit", registration.unit.clone())
            .text("designations", registration.designations_csv())
            .part("photo", photo);

        let response = self
            .http
            .post(self.endpoint("/api/register"))
            .multipart(form)
            .send()
            .await?;
        let envelope: Envelope<serde_json::Value> =
            decode(check(response, "Unknown error").await?).await?;
        info!("Registered {}", registration.name);
        Ok(RegisterOutcome {
            message: envelope
                .message
                .unwrap_or_else(|| DEFAULT_REGISTER_MESSAGE.to_string()),
            // Partial echoes are dropped.
            registration: envelope.data.and_then(|v| serde_json::from_value(v).ok()),
        })
    }

    /// `PUT /api/registration/{id}` with a JSON body; returns the stored record.
    pub async fn update_registration(
        &self,
        _session: &AdminSession,
        id: &str,
        update: &RegistrationUpdate,
    ) -> Result<Registration> {
        let response = self
            .http
            .put(self.endpoint(&format!("/api/registration/{}", id)))
            .json(update)
            .send()
            .await?;
        let envelope: Envelope<Registration> = decode(check(response, "Update failed").await?).await?;
        info!("Updated registration {}", id);
        envelope
            .data
            .ok_or_else(|| ClientError::Decode("update response has no data".to_string()))
    }

    /// `DELETE /api/registration/{id}`
    pub async fn delete_registration(&self, _session: &AdminSession, id: &str) -> Result<()> {
        let response = self
            .http
            .delete(self.endpoint(&format!("/api/registration/{}", id)))
            .send()
            .await?;
        check(response, "Delete failed").await?;
        info!("Deleted registration {}", id);
        Ok(())
    }

    /// `GET /api/admin/export/registrations`, the backend's registration listing as PDF.
    pub async fn download_registrations_pdf(&self, _session: &AdminSession) -> Result<Vec<u8>> {
        let response = self
            .http
            .get(self.endpoint("/api/admin/export/registrations"))
            .header(header::ACCEPT, "application/pdf")
            .send()
            .await?;
        let bytes = check(response, "Export failed").await?.bytes().await?;
        debug!("Downloaded registrations PDF ({} bytes)", bytes.len());
        Ok(bytes.to_vec())
    }

    /// Fetch a photo by its stored URL.
    pub async fn fetch_photo(&self, photo_url: &str) -> Result<Vec<u8>> {
        let url = resolve_photo_url(&self.base_url, photo_url)
            .ok_or_else(|| ClientError::InvalidUrl("empty photo URL".to_string()))?;
        let response = self.http.get(&url).send().await?;
        let bytes = check(response, "Photo not found").await?.bytes().await?;
        debug!("Fetched photo {} ({} bytes)", url, bytes.len());
        Ok(bytes.to_vec())
    }

    /// Build a renderable card, fetching the photo so the capture can draw it.
    pub async fn card_record(&self, registration: &Registration) -> Result<CardRecord> {
        let photo = match registration.photo_url.as_deref().filter(|u| !u.trim().is_empty()) {
            Some(url) => Some(PhotoRef::Bytes(self.fetch_photo(url).await?)),
            None => None,
        };
        Ok(registration.card_record(photo))
    }
}

/// Turn a non-2xx response into [`ClientError::Status`], preferring the server's `message`.
async fn check(response: Response, fallback: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| fallback.to_string());
    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))
}
