//! Multi-period projection.
//!
//! [`project_periods`] chains target periods: each period's reconstructed
//! record is the base of the next, never the original last-known record.
//! [`ProjectionEngine`] bundles the settings, schema and predictor that
//! every projection needs.

use std::collections::{BTreeMap, BTreeSet};

use carbon_dash_projection_models::{
    EntityHistory, HistoryRecord, ProjectedRecord, ProjectionSettings, SeriesPoint, TrendRatios,
};

use crate::encode::{FeatureSchema, encode_record};
use crate::merge::merge_series;
use crate::progress::ProgressCallback;
use crate::trend::estimate_trend;
use crate::{Predictor, ProjectionError};

/// Projects one record per distinct target period, in ascending order.
///
/// For every component, `next = max(previous * (1 + ratio), 0)`; a
/// missing previous value counts as zero. All other fields are carried
/// forward unchanged apart from the period.
///
/// # Errors
///
/// Returns [`ProjectionError::Predictor`] if the predictor fails on any
/// reconstructed record.
pub fn project_periods(
    last_known: &HistoryRecord,
    ratios: &TrendRatios,
    targets: &[i32],
    settings: &ProjectionSettings,
    schema: &FeatureSchema,
    predictor: &dyn Predictor,
) -> Result<Vec<ProjectedRecord>, ProjectionError> {
    let targets: BTreeSet<i32> = targets.iter().copied().collect();
    let mut projected = Vec::with_capacity(targets.len());
    let mut previous = last_known.clone();

    for period in targets {
        let mut next = previous.clone();
        next.period = period;

        let mut components = BTreeMap::new();
        for component in &settings.components {
            let base = previous.number(component).unwrap_or(0.0);
            let value = (base * (1.0 + ratios.get(component))).max(0.0);
            next.set_number(component, value);
            components.insert(component.clone(), value);
        }

        let encoded = encode_record(&next, settings, schema);
        let value = predictor
            .predict(&encoded)
            .map_err(|source| ProjectionError::Predictor {
                entity: next.entity.clone(),
                period,
                source,
            })?;

        projected.push(ProjectedRecord {
            entity: next.entity.clone(),
            period,
            components,
            value,
        });

        previous = next;
    }

    Ok(projected)
}

/// Read-only bundle of everything a projection needs.
#[derive(Clone, Copy)]
pub struct ProjectionEngine<'a> {
    settings: &'a ProjectionSettings,
    schema: &'a FeatureSchema,
    predictor: &'a dyn Predictor,
}

impl<'a> ProjectionEngine<'a> {
    /// Creates an engine over borrowed settings, schema and predictor.
    #[must_use]
    pub const fn new(
        settings: &'a ProjectionSettings,
        schema: &'a FeatureSchema,
        predictor: &'a dyn Predictor,
    ) -> Self {
        Self {
            settings,
            schema,
            predictor,
        }
    }

    /// Settings the engine was built with.
    #[must_use]
    pub const fn settings(&self) -> &ProjectionSettings {
        self.settings
    }

    /// Projects `history` onto `targets`.
    ///
    /// Returns an empty list when the history has fewer than two periods
    /// or no targets were requested.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::Predictor`] if the predictor fails.
    pub fn project_entity(
        &self,
        history: &EntityHistory,
        targets: &[i32],
    ) -> Result<Vec<ProjectedRecord>, ProjectionError> {
        let (Some(ratios), Some(last_known)) = (
            estimate_trend(history, &self.settings.components),
            history.last(),
        ) else {
            log::debug!(
                "Not enough history to project '{}' ({} period(s))",
                history.entity(),
                history.len()
            );
            return Ok(Vec::new());
        };

        if let Some(first) = targets.iter().min()
            && *first <= last_known.period
        {
            log::warn!(
                "Projection for '{}' starts at {first}, which is not after the last actual period {}",
                history.entity(),
                last_known.period
            );
        }

        project_periods(
            last_known,
            &ratios,
            targets,
            self.settings,
            self.schema,
            self.predictor,
        )
    }

    /// Projects `history` and merges the result with its actual series.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::Predictor`] if the predictor fails.
    pub fn merged_series(
        &self,
        history: &EntityHistory,
        targets: &[i32],
    ) -> Result<Vec<SeriesPoint>, ProjectionError> {
        let projected = self.project_entity(history, targets)?;
        Ok(merge_series(
            &history.actual_series(&self.settings.total_field),
            &projected,
        ))
    }

    /// Projects every history, skipping those too short to trend.
    ///
    /// # Errors
    ///
    /// Returns the first [`ProjectionError`] encountered.
    pub fn project_all<'h>(
        &self,
        histories: impl IntoIterator<Item = &'h EntityHistory>,
        targets: &[i32],
        progress: &dyn ProgressCallback,
    ) -> Result<Vec<ProjectedRecord>, ProjectionError> {
        let histories: Vec<&EntityHistory> = histories.into_iter().collect();
        progress.set_total(histories.len() as u64);

        let mut projected = Vec::new();
        for history in histories {
            progress.set_message(history.entity().to_string());
            projected.extend(self.project_entity(history, targets)?);
            progress.inc(1);
        }

        progress.finish(format!("Projected {} record(s)", projected.len()));
        Ok(projected)
    }

    /// All actual points of every history followed by all projected
    /// points, without percent change.
    ///
    /// # Errors
    ///
    /// Returns the first [`ProjectionError`] encountered.
    pub fn combined_series<'h>(
        &self,
        histories: impl IntoIterator<Item = &'h EntityHistory>,
        targets: &[i32],
        progress: &dyn ProgressCallback,
    ) -> Result<Vec<SeriesPoint>, ProjectionError> {
        let histories: Vec<&EntityHistory> = histories.into_iter().collect();

        let mut series: Vec<SeriesPoint> = histories
            .iter()
            .flat_map(|h| h.actual_series(&self.settings.total_field))
            .collect();

        let projected = self.project_all(histories, targets, progress)?;
        series.extend(projected.iter().map(ProjectedRecord::to_series_point));

        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use carbon_dash_projection_models::SourceTag;

    use super::*;
    use crate::encode::EncodedRecord;
    use crate::PredictError;
    use crate::progress::NullProgress;

    const SOLID: &str = "solid";
    const LIQUID: &str = "liquid";

    fn settings() -> ProjectionSettings {
        ProjectionSettings {
            entity_field: "Nation".to_string(),
            period_field: "Year".to_string(),
            total_field: "Total".to_string(),
            components: vec![SOLID.to_string(), LIQUID.to_string()],
        }
    }

    fn schema() -> FeatureSchema {
        FeatureSchema::parse("Year\nTotal\nsolid\nliquid\nNation_A").unwrap()
    }

    /// Returns the sum of the component columns and records every input.
    #[derive(Default)]
    struct RecordingPredictor {
        seen: Mutex<Vec<EncodedRecord>>,
    }

    impl Predictor for RecordingPredictor {
        fn predict(&self, record: &EncodedRecord) -> Result<f64, PredictError> {
            self.seen.lock().unwrap().push(record.clone());
            Ok(record.get(SOLID).unwrap_or(0.0) + record.get(LIQUID).unwrap_or(0.0))
        }
    }

    fn history(rows: &[(i32, Option<f64>, Option<f64>)]) -> EntityHistory {
        EntityHistory::new(
            "A",
            rows.iter()
                .map(|(year, solid, liquid)| {
                    HistoryRecord::new("A", *year)
                        .with_number("Total", Some(1000.0))
                        .with_number(SOLID, *solid)
                        .with_number(LIQUID, *liquid)
                })
                .collect(),
        )
        .unwrap()
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn projects_chained_periods_and_feeds_predictor() {
        let settings = settings();
        let schema = schema();
        let predictor = RecordingPredictor::default();
        let engine = ProjectionEngine::new(&settings, &schema, &predictor);

        let history = history(&[(2019, Some(100.0), Some(50.0)), (2020, Some(110.0), Some(45.0))]);
        let ratios = estimate_trend(&history, &settings.components).unwrap();
        assert!(approx(ratios.get(SOLID), 0.10));
        assert!(approx(ratios.get(LIQUID), -0.10));

        let projected = engine.project_entity(&history, &[2021, 2022]).unwrap();
        assert_eq!(projected.len(), 2);
        assert_eq!(projected[0].period, 2021);
        assert_eq!(projected[1].period, 2022);
        assert!(approx(projected[0].components[SOLID], 121.0));
        assert!(approx(projected[1].components[SOLID], 133.1));
        assert!(approx(projected[0].components[LIQUID], 40.5));
        assert!(approx(projected[1].components[LIQUID], 36.45));
        assert!(approx(projected[0].value, 161.5));
        assert_eq!(projected[0].source(), SourceTag::Predicted);

        let seen = predictor.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(approx(seen[0].get(SOLID).unwrap(), 121.0));
        assert!(approx(seen[0].get(LIQUID).unwrap(), 40.5));
        assert!(approx(seen[0].get("Year").unwrap(), 2021.0));
        assert!(approx(seen[0].get("Nation_A").unwrap(), 1.0));
        // Non-component fields are carried forward unchanged.
        assert!(approx(seen[0].get("Total").unwrap(), 1000.0));
        assert!(approx(seen[1].get(SOLID).unwrap(), 133.1));
        assert!(approx(seen[1].get(LIQUID).unwrap(), 36.45));
        assert!(approx(seen[1].get("Year").unwrap(), 2022.0));
    }

    #[test]
    fn short_history_projects_nothing() {
        let settings = settings();
        let schema = schema();
        let predictor = RecordingPredictor::default();
        let engine = ProjectionEngine::new(&settings, &schema, &predictor);

        let history = history(&[(2020, Some(1.0), Some(1.0))]);
        assert!(engine.project_entity(&history, &[2021]).unwrap().is_empty());
        assert!(predictor.seen.lock().unwrap().is_empty());
    }

    #[test]
    fn empty_targets_project_nothing() {
        let settings = settings();
        let schema = schema();
        let predictor = RecordingPredictor::default();
        let engine = ProjectionEngine::new(&settings, &schema, &predictor);

        let history = history(&[(2019, Some(1.0), Some(1.0)), (2020, Some(2.0), Some(2.0))]);
        assert!(engine.project_entity(&history, &[]).unwrap().is_empty());
    }

    #[test]
    fn targets_are_deduplicated_and_sorted() {
        let settings = settings();
        let schema = schema();
        let predictor = RecordingPredictor::default();
        let engine = ProjectionEngine::new(&settings, &schema, &predictor);

        let history = history(&[(2019, Some(10.0), Some(10.0)), (2020, Some(20.0), Some(5.0))]);
        let projected = engine
            .project_entity(&history, &[2023, 2021, 2023, 2022])
            .unwrap();
        let periods: Vec<i32> = projected.iter().map(|p| p.period).collect();
        assert_eq!(periods, vec![2021, 2022, 2023]);

        // Chaining: each solid value doubles the one before it.
        assert!(approx(projected[0].components[SOLID], 40.0));
        assert!(approx(projected[1].components[SOLID], 80.0));
        assert!(approx(projected[2].components[SOLID], 160.0));
    }

    #[test]
    fn projected_components_never_go_negative() {
        let settings = settings();
        let schema = schema();
        let predictor = RecordingPredictor::default();
        let engine = ProjectionEngine::new(&settings, &schema, &predictor);

        // Extrapolating the negative liquid value yields -7.5.
        let history = history(&[(2019, Some(10.0), Some(-10.0)), (2020, Some(10.0), Some(-5.0))]);
        let projected = engine
            .project_entity(&history, &[2021, 2022, 2023])
            .unwrap();
        for record in &projected {
            assert!(record.components.values().all(|v| *v >= 0.0));
        }
        assert!(approx(projected[0].components[LIQUID], 0.0));
        assert!(approx(projected[2].components[LIQUID], 0.0));
    }

    #[test]
    fn zero_previous_value_keeps_latest_value() {
        let settings = settings();
        let schema = schema();
        let predictor = RecordingPredictor::default();
        let engine = ProjectionEngine::new(&settings, &schema, &predictor);

        let history = history(&[(2019, Some(0.0), None), (2020, Some(5.0), Some(7.0))]);
        let projected = engine
            .project_entity(&history, &[2021, 2022, 2023, 2024])
            .unwrap();
        for record in &projected {
            assert!(approx(record.components[SOLID], 5.0));
            assert!(approx(record.components[LIQUID], 7.0));
        }
    }

    #[test]
    fn missing_latest_values_reconstruct_as_zero() {
        let settings = settings();
        let schema = schema();
        let predictor = RecordingPredictor::default();
        let engine = ProjectionEngine::new(&settings, &schema, &predictor);

        let history = history(&[(2019, Some(3.0), Some(3.0)), (2020, None, Some(3.0))]);
        let projected = engine.project_entity(&history, &[2021]).unwrap();
        assert!(approx(projected[0].components[SOLID], 0.0));
        let seen = predictor.seen.lock().unwrap();
        assert!(seen[0].values().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn predictor_failure_is_propagated() {
        let settings = settings();
        let schema = schema();
        let failing = |_: &EncodedRecord| -> Result<f64, PredictError> {
            Err(PredictError::Model {
                message: "boom".to_string(),
            })
        };
        let engine = ProjectionEngine::new(&settings, &schema, &failing);

        let history = history(&[(2019, Some(1.0), Some(1.0)), (2020, Some(2.0), Some(2.0))]);
        let err = engine.project_entity(&history, &[2021]).unwrap_err();
        assert!(matches!(
            err,
            ProjectionError::Predictor { period: 2021, .. }
        ));
        assert_eq!(err.to_string(), "Predictor failed for A in 2021: boom");
    }

    #[test]
    fn merged_series_places_predictions_after_actuals() {
        let settings = settings();
        let schema = schema();
        let predictor = RecordingPredictor::default();
        let engine = ProjectionEngine::new(&settings, &schema, &predictor);

        let history = history(&[(2019, Some(100.0), Some(50.0)), (2020, Some(110.0), Some(45.0))]);
        let merged = engine.merged_series(&history, &[2021, 2022]).unwrap();
        let tags: Vec<SourceTag> = merged.iter().map(|p| p.source).collect();
        assert_eq!(
            tags,
            vec![
                SourceTag::Actual,
                SourceTag::Actual,
                SourceTag::Predicted,
                SourceTag::Predicted
            ]
        );
        assert_eq!(merged[2].pct_change, None);
    }

    #[test]
    fn combined_series_skips_short_histories() {
        let settings = settings();
        let schema = schema();
        let predictor = RecordingPredictor::default();
        let engine = ProjectionEngine::new(&settings, &schema, &predictor);

        let long = history(&[(2019, Some(1.0), Some(1.0)), (2020, Some(2.0), Some(2.0))]);
        let short = EntityHistory::new(
            "B",
            vec![HistoryRecord::new("B", 2020).with_number("Total", Some(5.0))],
        )
        .unwrap();

        let combined = engine
            .combined_series([&long, &short], &[2021, 2022], &NullProgress)
            .unwrap();
        assert_eq!(combined.len(), 3 + 2);
        assert!(combined[..3].iter().all(|p| p.source == SourceTag::Actual));
        assert!(combined[3..]
            .iter()
            .all(|p| p.source == SourceTag::Predicted && p.entity == "A"));
    }
}
