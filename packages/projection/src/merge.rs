//! Merging of actual and projected points into one display series.

use carbon_dash_projection_models::{ProjectedRecord, SeriesPoint};

/// Fractional change between consecutive values relative to the magnitude
/// of the earlier one, if both exist and the earlier one is non-zero.
fn pct_change(previous: Option<f64>, current: Option<f64>) -> Option<f64> {
    match (previous, current) {
        (Some(prev), Some(cur)) if prev.abs() > 0.0 => Some((cur - prev) / prev.abs()),
        _ => None,
    }
}

/// Sorts one source's points by period and fills in `pct_change`.
fn with_pct_change(mut points: Vec<SeriesPoint>) -> Vec<SeriesPoint> {
    points.sort_by_key(|p| p.period);

    let mut previous = None;
    for point in &mut points {
        point.pct_change = pct_change(previous, point.value);
        previous = point.value;
    }

    points
}

/// Returns the actual points followed by the projected ones, each group
/// sorted by period with its own percent-change chain.
///
/// Predicted periods overlapping actual ones are kept as-is; both points
/// appear in the result.
#[must_use]
pub fn merge_series(actual: &[SeriesPoint], predicted: &[ProjectedRecord]) -> Vec<SeriesPoint> {
    let actual = with_pct_change(actual.to_vec());
    let predicted = with_pct_change(
        predicted
            .iter()
            .map(ProjectedRecord::to_series_point)
            .collect(),
    );

    if let (Some(last_actual), Some(first_predicted)) = (actual.last(), predicted.first())
        && first_predicted.period <= last_actual.period
    {
        log::warn!(
            "Predicted period {} of '{}' overlaps actual data ending at {}",
            first_predicted.period,
            first_predicted.entity,
            last_actual.period
        );
    }

    let mut merged = actual;
    merged.extend(predicted);
    merged
}
