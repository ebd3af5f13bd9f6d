//! `idcard admin`: registration management and exports behind the admin gate.

use crate::args::{AdminAction, AdminArgs};
use crate::commands::exporter;
use crate::config::AppConfig;
use crate::prompt;
use anyhow::{bail, Context, Result};
use idcard_client::{AdminGate, AdminSession, ApiClient};
use idcard_core::export::write_atomically;
use idcard_core::{AdminBoard, ExportKind, Notification, Registration, RegistrationUpdate, Severity};
use std::path::Path;
use tracing::info;

pub async fn run(config: &AppConfig, args: AdminArgs) -> Result<()> {
    let password = match args.password {
        Some(password) => password,
        None => prompt::ask("Password: ")?,
    };
    let gate = AdminGate::new(config.admin.clone());
    let session = gate.login(&args.username, &password)?;
    let client = ApiClient::new(&config.api)?;
    let mut board = AdminBoard::new();

    let result = dispatch(config, &client, &session, &mut board, args.action).await;
    gate.logout(session);
    result?;
    flush(board.take_notifications())
}

async fn dispatch(
    config: &AppConfig,
    client: &ApiClient,
    session: &AdminSession,
    board: &mut AdminBoard,
    action: AdminAction,
) -> Result<()> {
    match action {
        AdminAction::ExportPdf { out } => {
            export_registrations_pdf(client, session, board, &out).await?;
        }
        AdminAction::List => {
            load(client, board).await?;
            print_table(board.registrations());
        }
        AdminAction::Edit {
            id,
            name,
            cluster,
            unit,
            designations,
        } => {
            load(client, board).await?;
            let current = find(board, &id)?;
            let update = edited(
                current,
                name.as_deref(),
                cluster.as_deref(),
                unit.as_deref(),
                designations.as_deref(),
            )?;
            let result = client.update_registration(session, &id, &update).await;
            board.apply_updated(result);
        }
        AdminAction::Delete { id, yes } => {
            load(client, board).await?;
            find(board, &id)?;
            if !yes && !prompt::confirm("Are you sure you want to delete this registration?")? {
                println!("Nothing deleted.");
                return Ok(());
            }
            let result = client.delete_registration(session, &id).await;
            board.apply_deleted(&id, result);
        }
        AdminAction::Card { id, out } => {
            load(client, board).await?;
            let registration = find(board, &id)?.clone();
            let ticket = board
                .begin_export(ExportKind::IdCards)
                .context("An export is already running")?;
            let result = async {
                let record = client.card_record(&registration).await?;
                let card = exporter(config)?.export_card_png(&record)?;
                card.save(&out)?;
                Ok::<_, anyhow::Error>(card)
            }
            .await;
            if let Some(card) = board.finish_export(ticket, result) {
                println!("Saved {} ({}x{})", out.display(), card.width, card.height);
            }
        }
        AdminAction::Cards { cluster, out } => {
            load(client, board).await?;
            let selected: Vec<Registration> = board
                .registrations()
                .iter()
                .filter(|r| cluster.as_deref().map_or(true, |c| r.cluster == c))
                .cloned()
                .collect();
            let ticket = board
                .begin_export(ExportKind::IdCards)
                .context("An export is already running")?;
            let result = async {
                let exporter = exporter(config)?;
                let mut records = Vec::with_capacity(selected.len());
                for registration in &selected {
                    records.push(client.card_record(registration).await?);
                }
                let pdf = exporter.export_bulk_pdf(&records)?;
                pdf.save(&out)?;
                Ok::<_, anyhow::Error>(pdf)
            }
            .await;
            if let Some(pdf) = board.finish_export(ticket, result) {
                info!("Bulk export wrote {} cards", pdf.card_count);
                println!(
                    "Saved {} ({} cards on {} pages)",
                    out.display(),
                    pdf.card_count,
                    pdf.page_count
                );
            }
        }
    }
    Ok(())
}

async fn export_registrations_pdf(
    client: &ApiClient,
    session: &AdminSession,
    board: &mut AdminBoard,
    out: &Path,
) -> Result<()> {
    let ticket = board
        .begin_export(ExportKind::RegistrationsPdf)
        .context("An export is already running")?;
    let result = async {
        let bytes = client.download_registrations_pdf(session).await?;
        write_atomically(out, &bytes)?;
        Ok::<_, anyhow::Error>(bytes.len())
    }
    .await;
    if let Some(size) = board.finish_export(ticket, result) {
        println!("Saved {} ({} bytes)", out.display(), size);
    }
    Ok(())
}

async fn load(client: &ApiClient, board: &mut AdminBoard) -> Result<()> {
    board.apply_loaded(client.list_registrations().await);
    match board.load_error() {
        Some(message) => bail!("{}", message),
        None => Ok(()),
    }
}

fn find<'a>(board: &'a AdminBoard, id: &str) -> Result<&'a Registration> {
    board
        .registrations()
        .iter()
        .find(|r| r.id == id)
        .with_context(|| format!("Registration {} not found", id))
}

/// Apply the edited fields to `current`; omitted fields keep their value.
fn edited(
    current: &Registration,
    name: Option<&str>,
    cluster: Option<&str>,
    unit: Option<&str>,
    designations: Option<&str>,
) -> Result<RegistrationUpdate> {
    let defaults = RegistrationUpdate::from_registration(current);
    let designations_csv = defaults.designations.join(",");
    RegistrationUpdate::from_form(
        name.unwrap_or(&defaults.name),
        cluster.unwrap_or(&defaults.cluster),
        unit.unwrap_or(&defaults.unit),
        designations.unwrap_or(&designations_csv),
    )
    .map_err(|errors| {
        for (field, message) in errors.iter() {
            eprintln!("  {}: {}", field.as_str(), message);
        }
        anyhow::anyhow!("Edit has {} invalid field(s)", errors.len())
    })
}

fn print_table(registrations: &[Registration]) {
    if registrations.is_empty() {
        println!("No registrations.");
        return;
    }
    println!(
        "{:<26} {:<24} {:<10} {:<12} Designations",
        "ID", "Name", "Cluster", "Unit"
    );
    for r in registrations {
        println!(
            "{:<26} {:<24} {:<10} {:<12} {}",
            r.id,
            r.name,
            r.cluster,
            r.unit,
            r.designations.join(", ")
        );
    }
}

/// Print notifications; the last error becomes the command's failure.
fn flush(notifications: Vec<Notification>) -> Result<()> {
    let mut failure = None;
    for notification in notifications {
        match notification.severity {
            Severity::Success => println!("{}", notification.message),
            Severity::Error => {
                eprintln!("{}", notification.message);
                failure = Some(notification.message);
            }
        }
    }
    match failure {
        Some(message) => bail!("{}", message),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asha() -> Registration {
        Registration {
            id: "r1".to_string(),
            name: "Asha".to_string(),
            cluster: "Kunthoor".to_string(),
            unit: "Kadaba".to_string(),
            designations: vec!["Unit President".to_string(), "Zone Councilor".to_string()],
            photo_url: None,
        }
    }

    #[test]
    fn test_edit_keeps_omitted_fields() {
        let update = edited(&asha(), Some("Asha K"), None, None, None).unwrap();
        assert_eq!(update.name, "Asha K");
        assert_eq!(update.cluster, "Kunthoor");
        assert_eq!(update.unit, "Kadaba");
        assert_eq!(update.designations.len(), 2);
    }

    #[test]
    fn test_edit_parses_designations() {
        let update = edited(&asha(), None, None, None, Some("Unit Treasurer, Zone Councilor")).unwrap();
        assert_eq!(
            update.designations,
            vec!["Unit Treasurer".to_string(), "Zone Councilor".to_string()]
        );
    }

    #[test]
    fn test_edit_rejects_unit_of_other_cluster() {
        let err = edited(&asha(), None, Some("Mardala"), None, None).unwrap_err();
        assert!(err.to_string().contains("1 invalid field"));
    }

    #[test]
    fn test_flush_fails_on_error() {
        assert!(flush(vec![Notification::success("Registration updated successfully")]).is_ok());
        let err = flush(vec![
            Notification::success("Registration deleted successfully"),
            Notification::error("Failed to download registrations PDF."),
        ])
        .unwrap_err();
        assert_eq!(err.to_string(), "Failed to download registrations PDF.");
    }
}
