//! First-difference trend estimation.
//!
//! Only the latest two periods of a history are consulted; older periods
//! have no influence on the ratios.

use carbon_dash_projection_models::{EntityHistory, TrendRatios};

/// Fractional change from `previous` to `latest`.
///
/// Returns `0.0` when either value is missing or non-finite, or when
/// `previous` is zero.
#[must_use]
pub fn change_ratio(previous: Option<f64>, latest: Option<f64>) -> f64 {
    match (previous, latest) {
        (Some(prev), Some(last)) if prev.is_finite() && last.is_finite() && prev.abs() > 0.0 => {
            (last - prev) / prev.abs()
        }
        _ => 0.0,
    }
}

/// Computes one ratio per component from the last two periods of
/// `history`.
///
/// Returns `None` when the history has fewer than two periods.
#[must_use]
pub fn estimate_trend(history: &EntityHistory, components: &[String]) -> Option<TrendRatios> {
    let (previous, latest) = history.latest_two()?;

    let mut ratios = TrendRatios::default();
    for component in components {
        ratios.insert(
            component.clone(),
            change_ratio(previous.number(component), latest.number(component)),
        );
    }

    Some(ratios)
}

#[cfg(test)]
mod tests {
    use carbon_dash_projection_models::HistoryRecord;

    use super::*;

    fn components() -> Vec<String> {
        vec!["solid".to_string(), "liquid".to_string()]
    }

    #[test]
    fn computes_ratio_from_last_two_periods() {
        let history = EntityHistory::new(
            "A",
            vec![
                HistoryRecord::new("A", 2018)
                    .with_number("solid", Some(1.0))
                    .with_number("liquid", Some(1000.0)),
                HistoryRecord::new("A", 2019)
                    .with_number("solid", Some(100.0))
                    .with_number("liquid", Some(50.0)),
                HistoryRecord::new("A", 2020)
                    .with_number("solid", Some(110.0))
                    .with_number("liquid", Some(45.0)),
            ],
        )
        .unwrap();

        let ratios = estimate_trend(&history, &components()).unwrap();
        assert!((ratios.get("solid") - 0.10).abs() < 1e-12);
        assert!((ratios.get("liquid") + 0.10).abs() < 1e-12);
    }

    #[test]
    fn insufficient_history_yields_none() {
        let empty = EntityHistory::new("A", Vec::new()).unwrap();
        assert!(estimate_trend(&empty, &components()).is_none());

        let single = EntityHistory::new(
            "A",
            vec![HistoryRecord::new("A", 2020).with_number("solid", Some(1.0))],
        )
        .unwrap();
        assert!(estimate_trend(&single, &components()).is_none());
    }

    #[test]
    fn degenerate_inputs_have_zero_ratio() {
        assert!(change_ratio(Some(0.0), Some(5.0)).abs() < f64::EPSILON);
        assert!(change_ratio(None, Some(5.0)).abs() < f64::EPSILON);
        assert!(change_ratio(Some(5.0), None).abs() < f64::EPSILON);
        assert!(change_ratio(Some(f64::NAN), Some(5.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn negative_previous_uses_absolute_denominator() {
        // -10 -> -5 is an increase of half the magnitude.
        assert!((change_ratio(Some(-10.0), Some(-5.0)) - 0.5).abs() < 1e-12);
    }
}
