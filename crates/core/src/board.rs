//! Admin screen state: loaded registrations, notifications and the export trigger.

use crate::registration::Registration;
use serde::Serialize;
use std::fmt::Display;
use tracing::{error, info, warn};

/// Shown when the registration list cannot be fetched.
pub const LOAD_FAILED_MESSAGE: &str = "Unable to load registrations. Try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
}

/// A transient message for the admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub severity: Severity,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

/// The two admin exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// Bulk ID cards rendered locally.
    IdCards,
    /// The backend-generated registrations PDF.
    RegistrationsPdf,
}

impl ExportKind {
    pub fn failure_message(self) -> &'static str {
        match self {
            ExportKind::IdCards => "Failed to export ID cards. Please try again.",
            ExportKind::RegistrationsPdf => "Failed to download registrations PDF.",
        }
    }
}

/// Proof that an export is in flight. Hand it back to [`AdminBoard::finish_export`].
#[derive(Debug)]
#[must_use = "an unfinished export keeps the trigger disabled"]
pub struct ExportTicket {
    kind: ExportKind,
}

impl ExportTicket {
    pub fn kind(&self) -> ExportKind {
        self.kind
    }
}

/// State behind the admin registrations and ID card screens.
#[derive(Debug, Default)]
pub struct AdminBoard {
    registrations: Vec<Registration>,
    load_error: Option<String>,
    notifications: Vec<Notification>,
    exporting: bool,
}

impl AdminBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Drain pending notifications.
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Whether the export trigger is disabled.
    pub fn is_exporting(&self) -> bool {
        self.exporting
    }

    /// Replace the list with a fetch result. A failed fetch keeps the previous list.
    pub fn apply_loaded<E: Display>(&mut self, result: Result<Vec<Registration>, E>) {
        match result {
            Ok(registrations) => {
                info!("Loaded {} registrations", registrations.len());
                self.registrations = registrations;
                self.load_error = None;
            }
            Err(e) => {
                error!("Failed to load registrations: {}", e);
                self.load_error = Some(LOAD_FAILED_MESSAGE.to_string());
            }
        }
    }

    /// Start an export, unless one is already running.
    pub fn begin_export(&mut self, kind: ExportKind) -> Option<ExportTicket> {
        if self.exporting {
            warn!("Export already in progress; ignoring {:?}", kind);
            return None;
        }
        self.exporting = true;
        Some(ExportTicket { kind })
    }

    /// Finish an export. A failure adds exactly one error notification and
    /// never touches the registration list.
    pub fn finish_export<T, E: Display>(&mut self, ticket: ExportTicket, result: Result<T, E>) -> Option<T> {
        self.exporting = false;
        match result {
            Ok(value) => Some(value),
            Err(e) => {
                error!("{:?} export failed: {}", ticket.kind, e);
                self.notifications
                    .push(Notification::error(ticket.kind.failure_message()));
                None
            }
        }
    }

    /// Run a synchronous export between [`begin_export`](Self::begin_export)
    /// and [`finish_export`](Self::finish_export).
    pub fn run_export<T, E: Display>(
        &mut self,
        kind: ExportKind,
        export: impl FnOnce(&[Registration]) -> Result<T, E>,
    ) -> Option<T> {
        let ticket = self.begin_export(kind)?;
        let result = export(&self.registrations);
        self.finish_export(ticket, result)
    }

    /// Apply the result of an update in place.
    pub fn apply_updated<E: Display>(&mut self, result: Result<Registration, E>) {
        match result {
            Ok(updated) => {
                if let Some(slot) = self.registrations.iter_mut().find(|r| r.id == updated.id) {
                    *slot = updated;
                }
                self.notifications
                    .push(Notification::success("Registration updated successfully"));
            }
            Err(e) => self
                .notifications
                .push(Notification::error(format!("Error updating: {}", e))),
        }
    }

    /// Apply the result of a delete in place.
    pub fn apply_deleted<E: Display>(&mut self, id: &str, result: Result<(), E>) {
        match result {
            Ok(()) => {
                self.registrations.retain(|r| r.id != id);
                self.notifications
                    .push(Notification::success("Registration deleted successfully"));
            }
            Err(e) => self
                .notifications
                .push(Notification::error(format!("Error deleting: {}", e))),
        }
    }
}
