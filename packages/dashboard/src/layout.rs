//! Page structure and initial property values.

use std::collections::BTreeMap;

use carbon_dash_dashboard_models::{ControlOption, Layout, PropKey, ids};
use carbon_dash_dataset_models::FuelType;
use carbon_dash_projection::periods::format_periods;
use serde_json::{Value, json};
use strum::IntoEnumIterator;

use crate::context::AppContext;
use crate::handlers::emissions::all_fuel_types;
use crate::registry::CallbackRegistry;

pub const TITLE: &str = "Carbon Emission Analysis";

/// Control values before any callback has run.
#[must_use]
pub fn default_values(ctx: &AppContext) -> BTreeMap<String, Value> {
    let controls = &ctx.config().controls;
    let mut values = BTreeMap::new();
    let mut set = |key: PropKey, value: Value| {
        values.insert(key.to_string(), value);
    };

    if let Some(nation) = ctx.default_nation() {
        set(PropKey::value(ids::COUNTRY_DROPDOWN), json!(nation));
    }
    if let Some(max) = ctx.max_year() {
        let span = controls.preset_spans.first().copied().unwrap_or(0);
        set(PropKey::value(ids::FROM_YEAR), json!(max.saturating_sub(span)));
        set(PropKey::value(ids::TO_YEAR), json!(max));
    }
    set(PropKey::value(ids::FUEL_TYPES), json!(all_fuel_types()));
    for span in &controls.preset_spans {
        set(PropKey::clicks(ids::preset_button(*span)), json!(0));
    }
    set(
        PropKey::value(ids::PROJECTION_YEARS),
        json!(format_periods(&ctx.config().projection.default_years)),
    );
    set(PropKey::clicks(ids::DISMISS_BUTTON), json!(0));
    set(PropKey::style(ids::ERROR_BANNER), json!({ "display": "none" }));
    set(PropKey::children(ids::ERROR_TEXT), json!(""));

    values
}

/// Full page description with the initial render already applied.
#[must_use]
pub fn build_layout(ctx: &AppContext, registry: &CallbackRegistry) -> Layout {
    let mut values = default_values(ctx);
    let initial = registry.initial(ctx, values.clone());
    if !initial.errors.is_empty() {
        log::warn!("{} callback(s) failed on the initial render", initial.errors.len());
    }
    values.extend(initial.updates);

    Layout {
        title: TITLE.to_string(),
        nations: ctx
            .dataset()
            .nations()
            .into_iter()
            .map(|nation| ControlOption {
                label: nation.to_string(),
                value: nation.to_string(),
            })
            .collect(),
        fuel_types: FuelType::iter().map(ControlOption::from).collect(),
        preset_spans: ctx.config().controls.preset_spans.clone(),
        year_bounds: ctx.dataset().year_bounds(),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::test_support::context;
    use crate::handlers::default_registry;

    #[test]
    fn defaults_cover_every_control() {
        let values = default_values(&context());
        assert_eq!(values["country-dropdown.value"], json!("ALPHA"));
        assert_eq!(values["from-year.value"], json!(2010));
        assert_eq!(values["to-year.value"], json!(2020));
        assert_eq!(values["fuel-types.value"], json!(["solid", "liquid", "gas"]));
        assert_eq!(values["btn-50.n_clicks"], json!(0));
        assert_eq!(values["projection-years.value"], json!("2021, 2022"));
        assert_eq!(
            values["callback-error-banner-wrapper.style"],
            json!({ "display": "none" })
        );
    }

    #[test]
    fn layout_includes_initial_figures() {
        let ctx = context();
        let registry = default_registry(ctx.config()).unwrap();
        let layout = build_layout(&ctx, &registry);

        assert_eq!(layout.title, "Carbon Emission Analysis");
        let nations: Vec<&str> = layout.nations.iter().map(|n| n.value.as_str()).collect();
        assert_eq!(nations, vec!["ALPHA", "BETA"]);
        assert_eq!(layout.fuel_types[0].label, "Solid");
        assert_eq!(layout.year_bounds.map(|b| (b.min, b.max)), Some((1990, 2020)));

        assert_eq!(
            layout.values["emission-graph.figure"]["title"],
            "ALPHA - CO₂ Emissions (2010 to 2020)"
        );
        assert_eq!(layout.values["btn-10.outline"], json!(false));
        assert_eq!(
            layout.values["projection-message.children"],
            json!("Projected 2 year(s) for ALPHA: 2021, 2022")
        );
    }
}
