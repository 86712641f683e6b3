//! vanatlas CLI - Command-line interface
//!
//! This binary provides command-line access to the vanatlas engine:
//! fetching administrative boundaries, listing region names, measuring
//! coordinate sequences, converting KML⇄GeoJSON, and rendering map
//! screenshots.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use vanatlas::claims::ClaimsClient;
use vanatlas::config::AtlasConfig;
use vanatlas::logging::{default_log_dir, default_log_file, init_logging};
use vanatlas::service::DefaultAtlasService;

mod commands;
mod error;

use error::CliError;

#[derive(Debug, Clone, ValueEnum)]
enum MeasureKind {
    /// Total great-circle length of the point sequence
    Line,
    /// Spherical area and perimeter of the closed ring
    Polygon,
}

#[derive(Parser)]
#[command(name = "vanatlas")]
#[command(version = vanatlas::VERSION)]
#[command(about = "Boundary and annotation tooling for the FRA claims atlas", long_about = None)]
struct Cli {
    /// Boundary repository base URL override
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Static data directory holding village/CFR files
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Claims API base URL override
    #[arg(long, global = true)]
    claims_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Download a boundary FeatureCollection to a file
    Fetch {
        /// Boundary level: states, districts, subdistricts, villages,
        /// cfr-potential
        #[arg(long, default_value = "districts")]
        level: String,

        /// State name (required for every level except states)
        #[arg(long)]
        state: Option<String>,

        /// Output file path
        #[arg(long)]
        output: PathBuf,
    },

    /// List a state's district names
    Districts {
        #[arg(long)]
        state: String,
    },

    /// List a district's subdistrict names
    Subdistricts {
        #[arg(long)]
        state: String,

        #[arg(long)]
        district: String,
    },

    /// Measure a sequence of lat,lon points
    Measure {
        #[arg(long, value_enum, default_value = "line")]
        kind: MeasureKind,

        /// Points as lat,lon (e.g. 20.2961,85.8245)
        #[arg(required = true, allow_negative_numbers = true)]
        points: Vec<String>,
    },

    /// Convert between KML/KMZ and GeoJSON (directions inferred from
    /// file extensions)
    Convert {
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        output: PathBuf,
    },

    /// Render a state's district boundaries over base tiles to a PNG
    Screenshot {
        #[arg(long)]
        state: String,

        #[arg(long)]
        output: PathBuf,

        #[arg(long, default_value = "1200")]
        width: u32,

        #[arg(long, default_value = "800")]
        height: u32,

        /// Use the dark base map theme
        #[arg(long)]
        dark: bool,
    },

    /// Talk to the claims REST API
    Claims {
        #[command(subcommand)]
        action: ClaimsAction,
    },
}

#[derive(Subcommand)]
enum ClaimsAction {
    /// List all claims
    List,
    /// Search claims by free text
    Search {
        #[arg(long)]
        query: String,
    },
    /// Check the claims API health endpoint
    Health,
}

fn build_config(cli: &Cli) -> AtlasConfig {
    let mut config = AtlasConfig::default();
    if let Some(base_url) = &cli.base_url {
        config = config.with_boundary_base_url(base_url.clone());
    }
    if let Some(data_dir) = &cli.data_dir {
        config = config.with_data_dir(data_dir.clone());
    }
    if let Some(claims_url) = &cli.claims_url {
        config = config.with_claims_api_url(claims_url.clone());
    }
    config
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = build_config(&cli);
    let claims_url = config.claims_api_url.clone();
    let service = DefaultAtlasService::new(config).map_err(CliError::Service)?;

    match cli.command {
        Command::Fetch {
            level,
            state,
            output,
        } => {
            let key = commands::fetch_key(&level, state.as_deref())?;
            commands::fetch(&service, key, &output).await
        }

        Command::Districts { state } => commands::districts(&service, &state).await,

        Command::Subdistricts { state, district } => {
            commands::subdistricts(&service, &state, &district).await
        }

        Command::Measure { kind, points } => {
            let parsed = commands::parse_points(&points)?;
            match kind {
                MeasureKind::Line => commands::measure_line(&parsed),
                MeasureKind::Polygon => commands::measure_polygon(&parsed),
            }
        }

        Command::Convert { input, output } => commands::convert(&input, &output),

        Command::Screenshot {
            state,
            output,
            width,
            height,
            dark,
        } => commands::screenshot(&service, &state, &output, width, height, dark).await,

        Command::Claims { action } => {
            let client = ClaimsClient::new(claims_url)?;
            match action {
                ClaimsAction::List => commands::claims_list(&client).await,
                ClaimsAction::Search { query } => commands::claims_search(&client, &query).await,
                ClaimsAction::Health => commands::claims_health(&client).await,
            }
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let _guard = match init_logging(default_log_dir(), default_log_file()) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: logging unavailable: {}", e);
            None
        }
    };

    if let Err(e) = run(cli).await {
        e.exit();
    }
}
