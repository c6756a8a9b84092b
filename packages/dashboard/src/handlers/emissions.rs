//! Total and per-fuel emission charts for the selected nation and range.

use carbon_dash_dashboard_models::{PropKey, ids};
use carbon_dash_dataset_models::FuelType;
use strum::IntoEnumIterator;

use crate::DashboardError;
use crate::context::AppContext;
use crate::figures::{figure_value, hidden, line_figure};
use crate::registry::{CallbackContext, CallbackSpec, Outputs, no_update};

const FUEL_GRAPHS: [(FuelType, &str); 3] = [
    (FuelType::Solid, ids::SOLID_GRAPH),
    (FuelType::Liquid, ids::LIQUID_GRAPH),
    (FuelType::Gas, ids::GAS_GRAPH),
];

/// The nation and year range picked by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection<'a> {
    pub nation: &'a str,
    pub from: i32,
    pub to: i32,
}

/// Reads nation, from-year and to-year. Returns `None` when any is
/// missing or zero; a reversed range is swapped.
///
/// # Errors
///
/// Returns [`DashboardError::InvalidValue`] for malformed values.
pub fn selection<'a>(cb: &CallbackContext<'a>) -> Result<Option<Selection<'a>>, DashboardError> {
    let nation = cb.text(&PropKey::value(ids::COUNTRY_DROPDOWN))?;
    let from = cb.year(&PropKey::value(ids::FROM_YEAR))?.filter(|y| *y != 0);
    let to = cb.year(&PropKey::value(ids::TO_YEAR))?.filter(|y| *y != 0);

    let (Some(nation), Some(from), Some(to)) = (nation, from, to) else {
        return Ok(None);
    };

    let (from, to) = if from > to { (to, from) } else { (from, to) };
    Ok(Some(Selection { nation, from, to }))
}

fn range_inputs() -> [PropKey; 3] {
    [
        PropKey::value(ids::FROM_YEAR),
        PropKey::value(ids::TO_YEAR),
        PropKey::value(ids::COUNTRY_DROPDOWN),
    ]
}

#[must_use]
pub fn emission_graph_spec() -> CallbackSpec {
    CallbackSpec::new("emission_graph", emission_graph)
        .inputs(range_inputs())
        .output(PropKey::figure(ids::EMISSION_GRAPH))
}

/// Total emissions of the selected nation over the selected range.
///
/// # Errors
///
/// Returns [`DashboardError::InvalidValue`] for malformed control values.
pub fn emission_graph(ctx: &AppContext, cb: &CallbackContext<'_>) -> Result<Outputs, DashboardError> {
    let Some(Selection { nation, from, to }) = selection(cb)? else {
        return Ok(no_update(1));
    };

    let records = ctx.dataset().range(nation, from, to);
    log::debug!("emission_graph: {nation} {from}-{to}, {} rows", records.len());

    let figure = line_figure(
        &format!("{nation} - CO₂ Emissions ({from} to {to})"),
        &ctx.settings().total_field,
        "Total CO₂ Emissions",
        &records,
    );
    Ok(vec![Some(figure_value(&figure)?)])
}

#[must_use]
pub fn fuel_graphs_spec() -> CallbackSpec {
    CallbackSpec::new("fuel_graphs", fuel_graphs)
        .inputs(range_inputs())
        .input(PropKey::value(ids::FUEL_TYPES))
        .outputs(FUEL_GRAPHS.iter().map(|(_, id)| PropKey::figure(*id)))
}

/// Solid, liquid and gas charts; unticked fuels get a hidden placeholder.
///
/// # Errors
///
/// Returns [`DashboardError::InvalidValue`] for malformed control values.
pub fn fuel_graphs(ctx: &AppContext, cb: &CallbackContext<'_>) -> Result<Outputs, DashboardError> {
    let Some(Selection { nation, from, to }) = selection(cb)? else {
        return Ok(no_update(FUEL_GRAPHS.len()));
    };

    let ticked: Vec<FuelType> = cb
        .strings(&PropKey::value(ids::FUEL_TYPES))?
        .into_iter()
        .filter_map(|value| value.parse().ok())
        .collect();

    let records = ctx.dataset().range(nation, from, to);

    FUEL_GRAPHS
        .iter()
        .map(|(fuel, _)| {
            let figure = if ticked.contains(fuel) {
                line_figure(fuel.title(), fuel.column(), fuel.title(), &records)
            } else {
                hidden()
            };
            figure_value(&figure).map(Some)
        })
        .collect()
}

/// Every fuel type, the checklist's initial value.
#[must_use]
pub fn all_fuel_types() -> Vec<String> {
    FuelType::iter().map(|f| f.to_string()).collect()
}
