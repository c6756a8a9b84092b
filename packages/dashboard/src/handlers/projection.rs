//! Actual vs predicted emissions for the selected nation.

use carbon_dash_dashboard_models::{PropKey, ids};
use carbon_dash_projection::merge::merge_series;
use carbon_dash_projection::periods::{format_periods, require_periods};
use serde_json::json;

use crate::DashboardError;
use crate::context::AppContext;
use crate::figures::{figure_value, placeholder, projection_figure};
use crate::registry::{CallbackContext, CallbackSpec, Outputs, no_update};

#[must_use]
pub fn projection_graph_spec() -> CallbackSpec {
    CallbackSpec::new("projection_graph", projection_graph)
        .input(PropKey::value(ids::COUNTRY_DROPDOWN))
        .input(PropKey::value(ids::PROJECTION_YEARS))
        .output(PropKey::figure(ids::PROJECTION_GRAPH))
        .output(PropKey::children(ids::PROJECTION_MESSAGE))
}

/// Projects the selected nation onto the entered years.
///
/// Bad year input and histories too short to trend render a placeholder
/// with an explanatory message instead of failing. A cleared years box is
/// bad input; only a missing value falls back to the configured years.
///
/// # Errors
///
/// Returns [`DashboardError::UnknownNation`] if the nation is not in the
/// dataset, or [`DashboardError::Projection`] if the predictor fails.
pub fn projection_graph(
    ctx: &AppContext,
    cb: &CallbackContext<'_>,
) -> Result<Outputs, DashboardError> {
    let Some(nation) = cb.text(&PropKey::value(ids::COUNTRY_DROPDOWN))? else {
        return Ok(no_update(2));
    };

    let years = match cb.raw_text(&PropKey::value(ids::PROJECTION_YEARS))? {
        Some(input) => match require_periods(input) {
            Ok(years) => years,
            Err(err) => return explain(&format!("No projection for {nation}"), &err.to_string()),
        },
        None => ctx.config().projection.default_years.clone(),
    };

    let history = ctx
        .dataset()
        .history(nation)
        .ok_or_else(|| DashboardError::UnknownNation {
            nation: nation.to_string(),
        })?;

    let projected = ctx.engine().project_entity(history, &years)?;
    if projected.is_empty() {
        return explain(
            &format!("Not enough data to project {nation}"),
            &format!(
                "{nation} has {} year(s) of data; at least 2 are needed to estimate a trend",
                history.len()
            ),
        );
    }

    log::debug!("projection_graph: {nation} onto {}", format_periods(&years));
    let series = merge_series(
        &history.actual_series(&ctx.settings().total_field),
        &projected,
    );

    Ok(vec![
        Some(figure_value(&projection_figure(nation, &series))?),
        Some(json!(format!(
            "Projected {} year(s) for {nation}: {}",
            projected.len(),
            format_periods(&years)
        ))),
    ])
}

fn explain(title: &str, message: &str) -> Result<Outputs, DashboardError> {
    Ok(vec![
        Some(figure_value(&placeholder(title))?),
        Some(json!(message)),
    ])
}
