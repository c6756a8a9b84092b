//! Subcommand implementations shared by the flag-driven and interactive
//! front ends.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use carbon_dash_dashboard::{AppContext, CallbackRegistry, DashboardConfig, DashboardError};
use carbon_dash_dataset::{Dataset, DatasetError};
use carbon_dash_dataset_models::{NATION, YEAR};
use carbon_dash_projection::ProjectionError;
use carbon_dash_projection::periods::require_periods;
use carbon_dash_projection::progress::ProgressCallback;
use carbon_dash_projection_models::{SeriesPoint, SourceTag};

/// Target years from user input, or the configured defaults.
///
/// # Errors
///
/// Returns [`ProjectionError::NoValidPeriods`] if `years` holds no valid
/// year.
pub fn resolve_years(
    config: &DashboardConfig,
    years: Option<&str>,
) -> Result<Vec<i32>, ProjectionError> {
    match years {
        Some(input) => require_periods(input),
        None => Ok(config.projection.default_years.clone()),
    }
}

/// Loads only the dataset named by `config`.
///
/// # Errors
///
/// Returns [`DatasetError`] if the dataset cannot be read.
pub fn load_dataset(config: &DashboardConfig) -> Result<Dataset, DatasetError> {
    Dataset::from_path(&config.data.dataset, &config.projection.settings)
}

pub fn print_nations(dataset: &Dataset) {
    if let Some(bounds) = dataset.year_bounds() {
        println!(
            "{} nations, {} rows, {} to {}",
            dataset.nations().len(),
            dataset.len(),
            bounds.min,
            bounds.max
        );
        println!();
    }
    for nation in dataset.nations() {
        let periods = dataset.history(nation).map_or(0, |h| h.len());
        println!("{nation:<48} {periods:>4} years");
    }
}

/// Actual and projected series for one nation.
///
/// # Errors
///
/// Returns [`DashboardError::UnknownNation`] if the nation is not in the
/// dataset, or [`DashboardError::Projection`] for invalid years or a
/// predictor failure.
pub fn project(
    ctx: &AppContext,
    nation: &str,
    years: Option<&str>,
) -> Result<Vec<SeriesPoint>, DashboardError> {
    let years = resolve_years(ctx.config(), years)?;
    let history = ctx
        .dataset()
        .history(nation)
        .ok_or_else(|| DashboardError::UnknownNation {
            nation: nation.to_string(),
        })?;

    let series = ctx.engine().merged_series(history, &years)?;
    if series.iter().all(|p| p.source == SourceTag::Actual) {
        log::warn!(
            "{nation} has {} year(s) of data; at least 2 are needed to project",
            history.len()
        );
    }
    Ok(series)
}

/// Actual series of every nation, followed by the projections of those
/// with at least two years of data.
///
/// # Errors
///
/// Returns [`DashboardError::Projection`] for invalid years or a
/// predictor failure.
pub fn project_all(
    ctx: &AppContext,
    years: Option<&str>,
    progress: &dyn ProgressCallback,
) -> Result<Vec<SeriesPoint>, DashboardError> {
    let years = resolve_years(ctx.config(), years)?;
    Ok(ctx
        .engine()
        .combined_series(ctx.dataset().histories(), &years, progress)?)
}

pub fn print_series(series: &[SeriesPoint]) {
    println!("{:<6} {:>16} {:>9}  SOURCE", "YEAR", "CO2", "CHANGE");
    println!("{}", "-".repeat(42));
    for point in series {
        let value = point
            .value
            .map_or_else(|| "-".to_string(), |v| format!("{v:.2}"));
        let change = point
            .pct_change
            .map_or_else(String::new, |c| format!("{:+.1}%", c * 100.0));
        println!("{:<6} {value:>16} {change:>9}  {}", point.period, point.source);
    }
}

/// Writes `series` as CSV with the dataset's nation and year columns
/// followed by `CO2` and `Source`. Missing values are written as empty
/// cells.
///
/// # Errors
///
/// Returns [`csv::Error`] if writing fails.
pub fn write_series_csv<W: Write>(writer: W, series: &[SeriesPoint]) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record([NATION, YEAR, "CO2", "Source"])?;
    for point in series {
        wtr.write_record([
            point.entity.clone(),
            point.period.to_string(),
            point.value.map(|v| v.to_string()).unwrap_or_default(),
            point.source.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes `series` to `output`, or to stdout when no path is given.
///
/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn export_series(
    series: &[SeriesPoint],
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => {
            write_series_csv(File::create(path)?, series)?;
            log::info!("Wrote {} points to {}", series.len(), path.display());
        }
        None => write_series_csv(std::io::stdout().lock(), series)?,
    }
    Ok(())
}

pub fn print_callbacks(registry: &CallbackRegistry) {
    for info in registry.describe() {
        let initial = if info.prevent_initial_call {
            ""
        } else {
            " (initial)"
        };
        println!("{}{initial}", info.name);
        for input in &info.inputs {
            println!("  <- {input}");
        }
        for output in &info.outputs {
            println!("  -> {output}");
        }
    }
}
