//! Year-span preset buttons.

use carbon_dash_dashboard_models::{PropKey, ids};
use serde_json::json;

use crate::DashboardError;
use crate::context::AppContext;
use crate::registry::{CallbackContext, CallbackSpec, Outputs, no_update};

fn preset_clicks(spans: &[i32]) -> impl Iterator<Item = PropKey> + '_ {
    spans
        .iter()
        .map(|span| PropKey::clicks(ids::preset_button(*span)))
}

/// Span closest to `diff`; ties go to the earlier span.
#[must_use]
pub fn nearest_span(spans: &[i32], diff: i64) -> Option<i32> {
    spans
        .iter()
        .copied()
        .min_by_key(|span| i64::from(*span).abs_diff(diff))
}

/// Span the buttons should highlight.
///
/// A click on a preset selects it. Otherwise the span nearest to the
/// distance between `from_year` and the latest year is selected, or the
/// first span when there is no from-year.
#[must_use]
pub fn selected_span(
    spans: &[i32],
    clicked: Option<i32>,
    from_year: Option<i32>,
    max_year: Option<i32>,
) -> Option<i32> {
    if let Some(span) = clicked.filter(|s| spans.contains(s)) {
        return Some(span);
    }
    match (from_year, max_year) {
        (Some(from), Some(max)) => nearest_span(spans, i64::from(max) - i64::from(from)),
        _ => spans.first().copied(),
    }
}

#[must_use]
pub fn highlight_presets_spec(spans: &[i32]) -> CallbackSpec {
    let colors = spans
        .iter()
        .map(|span| PropKey::new(ids::preset_button(*span), "color"));
    let outlines = spans
        .iter()
        .map(|span| PropKey::new(ids::preset_button(*span), "outline"));

    CallbackSpec::new("highlight_presets", highlight_presets)
        .inputs(preset_clicks(spans))
        .input(PropKey::value(ids::FROM_YEAR))
        .outputs(colors)
        .outputs(outlines)
}

/// Colours every preset `info` and outlines all but the selected one.
///
/// # Errors
///
/// Returns [`DashboardError::InvalidValue`] if the from-year is not a
/// whole number.
pub fn highlight_presets(
    ctx: &AppContext,
    cb: &CallbackContext<'_>,
) -> Result<Outputs, DashboardError> {
    let spans = &ctx.config().controls.preset_spans;
    let clicked = cb.triggered_id().and_then(ids::preset_span);
    let from_year = cb.year(&PropKey::value(ids::FROM_YEAR))?;
    let selected = selected_span(spans, clicked, from_year, ctx.max_year());

    let colors = spans.iter().map(|_| Some(json!("info")));
    let outlines = spans.iter().map(|span| Some(json!(Some(*span) != selected)));
    Ok(colors.chain(outlines).collect())
}

#[must_use]
pub fn preset_from_year_spec(spans: &[i32]) -> CallbackSpec {
    CallbackSpec::new("preset_from_year", preset_from_year)
        .inputs(preset_clicks(spans))
        .output(PropKey::value(ids::FROM_YEAR))
        .prevent_initial_call()
}

/// Moves the from-year to `latest year - span` when a preset is clicked.
///
/// # Errors
///
/// This handler does not fail.
pub fn preset_from_year(
    ctx: &AppContext,
    cb: &CallbackContext<'_>,
) -> Result<Outputs, DashboardError> {
    let spans = &ctx.config().controls.preset_spans;
    let span = cb
        .triggered_id()
        .and_then(ids::preset_span)
        .filter(|s| spans.contains(s));

    match (span, ctx.max_year()) {
        (Some(span), Some(max)) => Ok(vec![Some(json!(max.saturating_sub(span)))]),
        _ => Ok(no_update(1)),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::Value;

    use super::*;
    use crate::context::test_support::context;

    const SPANS: [i32; 5] = [10, 20, 30, 40, 50];

    #[test]
    fn selects_nearest_span_with_ties_to_the_earlier() {
        assert_eq!(selected_span(&SPANS, None, Some(2011), Some(2021)), Some(10));
        assert_eq!(selected_span(&SPANS, None, Some(1990), Some(2021)), Some(30));
        assert_eq!(selected_span(&SPANS, None, Some(2006), Some(2021)), Some(10));
        assert_eq!(selected_span(&SPANS, None, Some(1800), Some(2021)), Some(50));
        assert_eq!(selected_span(&SPANS, None, Some(2030), Some(2021)), Some(10));
    }

    #[test]
    fn extreme_from_years_select_the_outer_spans() {
        assert_eq!(
            selected_span(&SPANS, None, Some(-2_147_483_000), Some(2021)),
            Some(50)
        );
        assert_eq!(selected_span(&SPANS, None, Some(i32::MAX), Some(2021)), Some(10));
        assert_eq!(nearest_span(&[i32::MIN, 10], i64::from(i32::MAX)), Some(10));
    }

    #[test]
    fn highlight_survives_a_far_past_from_year() {
        let ctx = context();
        let values: BTreeMap<String, Value> =
            [("from-year.value".to_string(), json!(-2_147_483_000))]
                .into_iter()
                .collect();
        let outputs = highlight_presets(&ctx, &CallbackContext::new(None, &values)).unwrap();
        let outlines: Vec<Value> = outputs[5..].iter().flatten().cloned().collect();
        assert_eq!(
            outlines,
            vec![json!(true), json!(true), json!(true), json!(true), json!(false)]
        );
    }

    #[test]
    fn click_wins_and_missing_from_year_selects_first() {
        assert_eq!(selected_span(&SPANS, Some(40), Some(2011), Some(2021)), Some(40));
        assert_eq!(selected_span(&SPANS, Some(15), None, Some(2021)), Some(10));
        assert_eq!(selected_span(&SPANS, None, None, Some(2021)), Some(10));
    }

    #[test]
    fn highlight_outputs_colors_then_outlines() {
        let ctx = context();
        let values: BTreeMap<String, Value> =
            [("from-year.value".to_string(), json!(1990))].into_iter().collect();
        let outputs = highlight_presets(&ctx, &CallbackContext::new(None, &values)).unwrap();

        assert_eq!(outputs.len(), 10);
        assert!(outputs[..5].iter().all(|o| o == &Some(json!("info"))));
        let outlines: Vec<Value> = outputs[5..].iter().flatten().cloned().collect();
        assert_eq!(
            outlines,
            vec![json!(true), json!(true), json!(false), json!(true), json!(true)]
        );
    }

    #[test]
    fn preset_click_sets_from_year() {
        let ctx = context();
        let values = BTreeMap::new();
        let trigger = PropKey::clicks("btn-30");
        let outputs = preset_from_year(&ctx, &CallbackContext::new(Some(&trigger), &values)).unwrap();
        assert_eq!(outputs, vec![Some(json!(1990))]);
    }

    #[test]
    fn other_triggers_leave_from_year_alone() {
        let ctx = context();
        let values = BTreeMap::new();
        let trigger = PropKey::value(ids::TO_YEAR);
        let outputs = preset_from_year(&ctx, &CallbackContext::new(Some(&trigger), &values)).unwrap();
        assert_eq!(outputs, vec![None]);
        let outputs = preset_from_year(&ctx, &CallbackContext::new(None, &values)).unwrap();
        assert_eq!(outputs, vec![None]);
    }

    #[test]
    fn spec_declares_every_preset() {
        let spec = highlight_presets_spec(&SPANS);
        assert_eq!(spec.inputs.len(), 6);
        assert_eq!(spec.outputs.len(), 10);
        assert_eq!(spec.outputs[0].to_string(), "btn-10.color");
        assert_eq!(spec.outputs[9].to_string(), "btn-50.outline");
        assert!(preset_from_year_spec(&SPANS).prevent_initial_call);
    }
}
