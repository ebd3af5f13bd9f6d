//! `idcard register`: form, confirmation, submission and the ID card.

use crate::args::RegisterArgs;
use crate::commands::exporter;
use crate::config::AppConfig;
use crate::prompt;
use anyhow::{bail, Context, Result};
use idcard_client::ApiClient;
use idcard_core::{NewRegistration, PhotoUpload, RegistrationDraft};
use tracing::info;

pub async fn run(config: &AppConfig, args: RegisterArgs) -> Result<()> {
    let registration = validate(&args)?;
    print_summary(&registration);

    if !args.yes && !prompt::confirm("Submit this registration?")? {
        println!("Registration not submitted.");
        return Ok(());
    }

    let client = ApiClient::new(&config.api)?;
    let outcome = client
        .register(&registration)
        .await
        .context("Registration failed")?;
    println!("{}", outcome.message);

    let card = exporter(config)?.export_card_png(&registration.card_record())?;
    card.save(&args.out)?;
    info!("Saved ID card for {}", registration.name);
    println!(
        "ID card downloaded successfully: {} ({}x{})",
        args.out.display(),
        card.width,
        card.height
    );
    Ok(())
}

/// Build and validate the form, reporting every invalid field.
fn validate(args: &RegisterArgs) -> Result<NewRegistration> {
    let photo = match &args.photo {
        Some(path) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read photo {}", path.display()))?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "photo".to_string());
            Some(PhotoUpload::new(file_name, bytes))
        }
        None => None,
    };

    let draft = RegistrationDraft {
        name: args.name.clone(),
        cluster: args.cluster.clone(),
        unit: args.unit.clone(),
        designations: args.designations.clone(),
        photo,
    };

    match draft.validate() {
        Ok(registration) => Ok(registration),
        Err(errors) => {
            for (field, message) in errors.iter() {
                eprintln!("  {}: {}", field.as_str(), message);
            }
            bail!("Registration form has {} invalid field(s)", errors.len())
        }
    }
}

fn print_summary(registration: &NewRegistration) {
    println!("Please confirm your details:");
    println!("  Name:         {}", registration.name);
    println!("  Cluster:      {}", registration.cluster);
    println!("  Unit:         {}", registration.unit);
    println!("  Designations: {}", registration.designations.join(", "));
    println!(
        "  Photo:        {} ({}, {} bytes)",
        registration.photo.file_name,
        registration.photo.content_type,
        registration.photo.bytes.len()
    );
}
