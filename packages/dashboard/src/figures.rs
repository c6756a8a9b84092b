//! Figure builders.

use carbon_dash_dashboard_models::{Annotation, Figure, LineStyle, Trace};
use carbon_dash_projection_models::{HistoryRecord, SeriesPoint, SourceTag};
use serde_json::Value;

use crate::DashboardError;

const ACTUAL_COLOR: &str = "#00FFFF";
const PREDICTED_COLOR: &str = "#FFA500";
const CONNECTOR_COLOR: &str = "gray";

/// Serializes a figure into a property value.
///
/// # Errors
///
/// Returns [`DashboardError::InvalidValue`] if serialization fails.
pub fn figure_value(figure: &Figure) -> Result<Value, DashboardError> {
    serde_json::to_value(figure).map_err(|e| DashboardError::InvalidValue {
        key: "figure".to_string(),
        message: e.to_string(),
    })
}

/// Line chart of `column` over `records`.
#[must_use]
pub fn line_figure(
    title: &str,
    column: &str,
    y_label: &str,
    records: &[&HistoryRecord],
) -> Figure {
    Figure {
        title: Some(title.to_string()),
        x_label: Some("Year".to_string()),
        y_label: Some(y_label.to_string()),
        traces: vec![Trace {
            name: y_label.to_string(),
            x: records.iter().map(|r| r.period).collect(),
            y: records.iter().map(|r| r.number(column)).collect(),
            line: LineStyle::Solid,
            color: None,
            show_legend: false,
        }],
        axes_visible: true,
        ..Figure::default()
    }
}

/// Empty chart with hidden axes and a centred message.
#[must_use]
pub fn placeholder(message: &str) -> Figure {
    Figure {
        annotations: vec![Annotation::centered(message)],
        axes_visible: false,
        ..Figure::default()
    }
}

/// Placeholder for a chart the user has unticked.
#[must_use]
pub fn hidden() -> Figure {
    placeholder("Hidden")
}

fn trace(
    name: &str,
    points: &[&SeriesPoint],
    line: LineStyle,
    color: &str,
    show_legend: bool,
) -> Trace {
    Trace {
        name: name.to_string(),
        x: points.iter().map(|p| p.period).collect(),
        y: points.iter().map(|p| p.value).collect(),
        line,
        color: Some(color.to_string()),
        show_legend,
    }
}

/// Actual line, dashed predicted line and a dotted connector between the
/// last actual and the first predicted point.
///
/// Expects `series` in merged order: every actual point before every
/// predicted one.
#[must_use]
pub fn projection_figure(nation: &str, series: &[SeriesPoint]) -> Figure {
    let (actual, predicted): (Vec<&SeriesPoint>, Vec<&SeriesPoint>) = series
        .iter()
        .partition(|p| p.source == SourceTag::Actual);

    let mut traces = vec![trace(
        SourceTag::Actual.as_ref(),
        &actual,
        LineStyle::Solid,
        ACTUAL_COLOR,
        true,
    )];

    if let (Some(last), Some(first)) = (actual.last(), predicted.first()) {
        traces.push(trace(
            "",
            &[*last, *first],
            LineStyle::Dot,
            CONNECTOR_COLOR,
            false,
        ));
    }

    if !predicted.is_empty() {
        traces.push(trace(
            SourceTag::Predicted.as_ref(),
            &predicted,
            LineStyle::Dash,
            PREDICTED_COLOR,
            true,
        ));
    }

    Figure {
        title: Some(format!("{nation} - Actual vs Predicted CO₂ Emissions")),
        x_label: Some("Year".to_string()),
        y_label: Some("Total CO₂ Emissions".to_string()),
        traces,
        axes_visible: true,
        ..Figure::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(period: i32, value: f64, source: SourceTag) -> SeriesPoint {
        SeriesPoint {
            entity: "A".to_string(),
            period,
            value: Some(value),
            source,
            pct_change: None,
        }
    }

    #[test]
    fn placeholder_hides_axes() {
        let figure = hidden();
        assert!(!figure.axes_visible);
        assert!(figure.traces.is_empty());
        assert_eq!(figure.annotations[0].text, "Hidden");
        assert_eq!(figure.annotations[0].font_color, "gray");
        assert_eq!(figure.annotations[0].font_size, 18);
        assert_eq!(figure.theme.paper_bgcolor, "#2a2a2a");
    }

    #[test]
    fn line_figure_keeps_missing_values_as_gaps() {
        let a = HistoryRecord::new("A", 2019).with_number("x", Some(1.0));
        let b = HistoryRecord::new("A", 2020);
        let figure = line_figure("A", "x", "X", &[&a, &b]);
        assert_eq!(figure.traces[0].x, vec![2019, 2020]);
        assert_eq!(figure.traces[0].y, vec![Some(1.0), None]);
    }

    #[test]
    fn projection_figure_connects_actual_and_predicted() {
        let series = vec![
            point(2019, 1.0, SourceTag::Actual),
            point(2020, 2.0, SourceTag::Actual),
            point(2021, 3.0, SourceTag::Predicted),
            point(2022, 4.0, SourceTag::Predicted),
        ];
        let figure = projection_figure("A", &series);
        assert_eq!(figure.traces.len(), 3);

        let connector = &figure.traces[1];
        assert_eq!(connector.x, vec![2020, 2021]);
        assert_eq!(connector.line, LineStyle::Dot);
        assert!(!connector.show_legend);

        let predicted = &figure.traces[2];
        assert_eq!(predicted.name, "Predicted");
        assert_eq!(predicted.line, LineStyle::Dash);
        assert_eq!(predicted.x, vec![2021, 2022]);
    }

    #[test]
    fn projection_figure_without_predictions_has_one_trace() {
        let figure = projection_figure("A", &[point(2020, 2.0, SourceTag::Actual)]);
        assert_eq!(figure.traces.len(), 1);
        assert_eq!(figure.traces[0].name, "Actual");
    }
}
