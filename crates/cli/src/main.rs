//! `idcard`: register attendees, administer registrations and export ID cards.

mod args;
mod commands;
mod config;
mod prompt;

use anyhow::Result;
use args::{Cli, Commands};
use clap::Parser;
use config::AppConfig;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    idcard_core::init_logging();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?.with_overrides(&cli);
    config.validate()?;

    match cli.command {
        Commands::Register(args) => commands::register::run(&config, args).await,
        Commands::Render { record, photo, out } => {
            commands::render::run_render(&config, &record, photo.as_deref(), &out).await
        }
        Commands::Preview {
            record,
            photo,
            template_url,
            out,
        } => commands::render::run_preview(&record, photo.as_deref(), &template_url, &out),
        Commands::Admin(args) => commands::admin::run(&config, args).await,
    }
}
