//! Menu-driven mode, used when no subcommand is given.

use std::path::PathBuf;

use carbon_dash_cli_utils::{IndicatifProgress, MultiProgress};
use carbon_dash_dashboard::{AppContext, DashboardConfig, default_registry};
use carbon_dash_projection::periods::format_periods;
use dialoguer::{Input, Select};

use crate::commands;

/// Top-level actions offered by the menu.
enum Tool {
    Nations,
    Project,
    ProjectAll,
    Callbacks,
    Server,
}

impl Tool {
    const ALL: &[Self] = &[
        Self::Nations,
        Self::Project,
        Self::ProjectAll,
        Self::Callbacks,
        Self::Server,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Nations => "List nations",
            Self::Project => "Project a nation",
            Self::ProjectAll => "Project every nation",
            Self::Callbacks => "Show dashboard callbacks",
            Self::Server => "Start server",
        }
    }
}

fn prompt_years(config: &DashboardConfig) -> Result<String, dialoguer::Error> {
    Input::new()
        .with_prompt("Target years (comma-separated)")
        .default(format_periods(&config.projection.default_years))
        .interact_text()
}

fn prompt_nation(ctx: &AppContext) -> Result<String, dialoguer::Error> {
    let nations = ctx.dataset().nations();
    let default = ctx
        .default_nation()
        .and_then(|d| nations.iter().position(|n| *n == d))
        .unwrap_or(0);

    let idx = Select::new()
        .with_prompt("Nation")
        .items(&nations)
        .default(default)
        .interact()?;

    Ok(nations[idx].to_string())
}

/// Asks what to do and runs it.
///
/// # Errors
///
/// Returns an error if a prompt fails or the selected action fails.
#[allow(clippy::future_not_send)]
pub async fn run(
    multi: &MultiProgress,
    config: DashboardConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("Carbon Emission Analysis");
    println!();

    let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Tool::ALL[idx] {
        Tool::Nations => commands::print_nations(&commands::load_dataset(&config)?),
        Tool::Project => {
            let ctx = AppContext::load(config)?;
            let nation = prompt_nation(&ctx)?;
            let years = prompt_years(ctx.config())?;
            let series = commands::project(&ctx, &nation, Some(&years))?;
            commands::print_series(&series);
        }
        Tool::ProjectAll => {
            let ctx = AppContext::load(config)?;
            let years = prompt_years(ctx.config())?;
            let output: String = Input::new()
                .with_prompt("Output CSV (empty for stdout)")
                .allow_empty(true)
                .interact_text()?;
            let output = Some(output.trim())
                .filter(|o| !o.is_empty())
                .map(PathBuf::from);

            let progress = IndicatifProgress::nations_bar(multi, "Projecting nations...");
            let series = commands::project_all(&ctx, Some(&years), progress.as_ref())?;
            commands::export_series(&series, output.as_deref())?;
        }
        Tool::Callbacks => commands::print_callbacks(&default_registry(&config)?),
        Tool::Server => crate::serve(config, true).await?,
    }

    Ok(())
}
