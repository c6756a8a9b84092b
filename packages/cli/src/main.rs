#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line front end for the emissions dashboard.
//!
//! Every subcommand can also be reached from the interactive menu shown
//! when `carbon_dash` is run without arguments.
//!
//! Uses `indicatif-log-bridge` (via [`carbon_dash_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and progress bars never fight for the terminal.

mod commands;
mod interactive;

use std::path::PathBuf;

use carbon_dash_cli_utils::IndicatifProgress;
use carbon_dash_dashboard::{AppContext, DashboardConfig, default_registry};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "carbon_dash", about = "Carbon emission analysis and projection")]
struct Cli {
    /// Configuration file (overrides `CARBON_DASH_CONFIG` and `./carbon_dash.toml`)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the nations in the dataset
    Nations,
    /// Project one nation's emissions onto future years
    Project {
        /// Nation name as it appears in the dataset (e.g., "CHINA")
        nation: String,
        /// Comma-separated target years (e.g., "2022, 2023, 2024")
        #[arg(long)]
        years: Option<String>,
    },
    /// Export every nation's series with projections where the history allows
    ProjectAll {
        /// Comma-separated target years (e.g., "2022, 2023, 2024")
        #[arg(long)]
        years: Option<String>,
        /// CSV file to write. Prints to stdout if not set.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show every dashboard callback with its inputs and outputs
    Callbacks,
    /// Start the dashboard API server
    Serve,
}

/// Runs the API server on its own actix system.
///
/// The server uses actix-web's runtime, so it runs in a blocking task to
/// avoid nesting tokio runtimes.
async fn serve(
    config: DashboardConfig,
    interactive: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    tokio::task::spawn_blocking(move || {
        let server = async move {
            if interactive {
                carbon_dash_server::interactive::run(config).await
            } else {
                carbon_dash_server::run_server(config).await
            }
        };
        actix_web::rt::System::new().block_on(server)
    })
    .await??;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = carbon_dash_cli_utils::init_logger();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => DashboardConfig::from_path(path)?,
        None => DashboardConfig::load()?,
    };

    let Some(command) = cli.command else {
        return interactive::run(&multi, config).await;
    };

    match command {
        Commands::Nations => {
            commands::print_nations(&commands::load_dataset(&config)?);
        }
        Commands::Project { nation, years } => {
            let ctx = AppContext::load(config)?;
            let series = commands::project(&ctx, &nation, years.as_deref())?;
            commands::print_series(&series);
        }
        Commands::ProjectAll { years, output } => {
            let ctx = AppContext::load(config)?;
            let progress = IndicatifProgress::nations_bar(&multi, "Projecting nations...");
            let series = commands::project_all(&ctx, years.as_deref(), progress.as_ref())?;
            commands::export_series(&series, output.as_deref())?;
        }
        Commands::Callbacks => {
            commands::print_callbacks(&default_registry(&config)?);
        }
        Commands::Serve => serve(config, false).await?,
    }

    Ok(())
}
