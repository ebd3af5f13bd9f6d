//! Command-line argument definitions.

use clap::{Args, Parser, Subcommand};
use idcard_core::{BULK_FILE_NAME, CARD_FILE_NAME};
use std::path::PathBuf;

/// The main CLI structure.
#[derive(Debug, Parser)]
#[command(name = "idcard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Event registration and ID card export")]
pub struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL
    #[arg(long, global = true, env = "IDCARD_API_BASE_URL")]
    pub base_url: Option<String>,

    #[command(flatten)]
    pub assets: AssetArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides for the card assets and export settings.
#[derive(Debug, Default, Args)]
pub struct AssetArgs {
    /// Card template image (696 x 992 px)
    #[arg(long, global = true)]
    pub template: Option<PathBuf>,

    /// Flag emblem image
    #[arg(long, global = true)]
    pub flag: Option<PathBuf>,

    /// Logo emblem image
    #[arg(long, global = true)]
    pub logo: Option<PathBuf>,

    /// Font file for card text (repeatable)
    #[arg(long = "font", global = true)]
    pub fonts: Vec<PathBuf>,

    /// Oversampling factor for single-card PNGs (1-10)
    #[arg(long, global = true)]
    pub oversampling: Option<u32>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate, confirm and submit a registration, then save its ID card
    Register(RegisterArgs),
    /// Render an ID card PNG from a JSON card record
    Render {
        /// Card record JSON (name, cluster, unit, designations, photoPreview)
        #[arg(long)]
        record: PathBuf,
        /// Photo file, overriding the record's photo
        #[arg(long)]
        photo: Option<PathBuf>,
        #[arg(short, long, default_value = CARD_FILE_NAME)]
        out: PathBuf,
    },
    /// Write the on-screen preview of a card record as HTML
    Preview {
        #[arg(long)]
        record: PathBuf,
        #[arg(long)]
        photo: Option<PathBuf>,
        /// URL the preview loads the template from
        #[arg(long, default_value = "/idcard-template.png")]
        template_url: String,
        #[arg(short, long, default_value = "id_card_preview.html")]
        out: PathBuf,
    },
    /// Administer registrations
    Admin(AdminArgs),
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub cluster: String,
    #[arg(long)]
    pub unit: String,
    /// Designation (repeatable)
    #[arg(long = "designation")]
    pub designations: Vec<String>,
    /// Photo file
    #[arg(long)]
    pub photo: Option<PathBuf>,
    /// Where to save the ID card
    #[arg(short, long, default_value = CARD_FILE_NAME)]
    pub out: PathBuf,
    /// Submit without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Debug, Args)]
pub struct AdminArgs {
    #[arg(long, env = "IDCARD_ADMIN_USERNAME", default_value = "admin")]
    pub username: String,
    /// Prompted for when omitted
    #[arg(long, env = "IDCARD_ADMIN_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
    #[command(subcommand)]
    pub action: AdminAction,
}

#[derive(Debug, Subcommand)]
pub enum AdminAction {
    /// List all registrations
    List,
    /// Edit a registration; omitted fields keep their current value
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        cluster: Option<String>,
        #[arg(long)]
        unit: Option<String>,
        /// Comma-separated designations
        #[arg(long)]
        designations: Option<String>,
    },
    /// Delete a registration
    Delete {
        id: String,
        #[arg(short, long)]
        yes: bool,
    },
    /// Download the backend's registrations PDF
    ExportPdf {
        #[arg(short, long, default_value = idcard_client::REGISTRATIONS_FILE_NAME)]
        out: PathBuf,
    },
    /// Render one registration's ID card
    Card {
        id: String,
        #[arg(short, long, default_value = CARD_FILE_NAME)]
        out: PathBuf,
    },
    /// Render every registration's ID card into one paginated PDF
    Cards {
        /// Only registrations of this cluster
        #[arg(long)]
        cluster: Option<String>,
        #[arg(short, long, default_value = BULK_FILE_NAME)]
        out: PathBuf,
    },
}
