#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Record types shared by the emissions projection engine.
//!
//! A dataset is viewed as a set of per-entity histories (one
//! [`HistoryRecord`] per entity and period). The engine derives
//! [`TrendRatios`] from each history, extrapolates [`ProjectedRecord`]s,
//! and flattens both into [`SeriesPoint`]s for display.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Distinguishes observed values from extrapolated ones.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum SourceTag {
    /// Value read from the loaded dataset.
    Actual,
    /// Value produced by the projection engine.
    Predicted,
}

/// A single field of a history record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Numeric field. `None` marks a missing cell.
    Number(Option<f64>),
    /// Categorical field, one-hot encoded before scoring.
    Text(String),
}

impl FieldValue {
    /// Returns the numeric value, if this is a present numeric field.
    #[must_use]
    pub const fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(value) => *value,
            Self::Text(_) => None,
        }
    }
}

/// One observed period for one entity.
///
/// The entity and period are kept out of `fields`; encoders add them back
/// under the configured field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRecord {
    /// Entity key (e.g. a nation name).
    pub entity: String,
    /// Period key (a calendar year).
    pub period: i32,
    /// Every other column of the source row, keyed by column name.
    pub fields: BTreeMap<String, FieldValue>,
}

impl HistoryRecord {
    /// Creates a record with no fields.
    #[must_use]
    pub fn new(entity: impl Into<String>, period: i32) -> Self {
        Self {
            entity: entity.into(),
            period,
            fields: BTreeMap::new(),
        }
    }

    /// Builder-style helper that sets a numeric field.
    #[must_use]
    pub fn with_number(mut self, name: impl Into<String>, value: Option<f64>) -> Self {
        self.fields.insert(name.into(), FieldValue::Number(value));
        self
    }

    /// Builder-style helper that sets a text field.
    #[must_use]
    pub fn with_text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields
            .insert(name.into(), FieldValue::Text(value.into()));
        self
    }

    /// Returns a numeric field, or `None` when it is missing, textual, or
    /// not finite.
    #[must_use]
    pub fn number(&self, name: &str) -> Option<f64> {
        self.fields
            .get(name)
            .and_then(FieldValue::as_number)
            .filter(|v| v.is_finite())
    }

    /// Overwrites (or inserts) a numeric field.
    pub fn set_number(&mut self, name: &str, value: f64) {
        self.fields
            .insert(name.to_string(), FieldValue::Number(Some(value)));
    }
}

/// Error returned when an entity history contains the same period twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicatePeriodError {
    /// Entity whose history is malformed.
    pub entity: String,
    /// The repeated period.
    pub period: i32,
}

impl std::fmt::Display for DuplicatePeriodError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "duplicate period {} in history of '{}'",
            self.period, self.entity
        )
    }
}

impl std::error::Error for DuplicatePeriodError {}

/// All records of one entity, sorted by period ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityHistory {
    entity: String,
    records: Vec<HistoryRecord>,
}

impl EntityHistory {
    /// Builds a history, sorting records by period.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicatePeriodError`] if two records share a period.
    pub fn new(
        entity: impl Into<String>,
        mut records: Vec<HistoryRecord>,
    ) -> Result<Self, DuplicatePeriodError> {
        let entity = entity.into();
        records.sort_by_key(|r| r.period);

        if let Some(pair) = records.windows(2).find(|w| w[0].period == w[1].period) {
            return Err(DuplicatePeriodError {
                entity,
                period: pair[0].period,
            });
        }

        Ok(Self { entity, records })
    }

    /// Entity key.
    #[must_use]
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Records in period order.
    #[must_use]
    pub fn records(&self) -> &[HistoryRecord] {
        &self.records
    }

    /// Number of periods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the history has no periods at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Most recent record.
    #[must_use]
    pub fn last(&self) -> Option<&HistoryRecord> {
        self.records.last()
    }

    /// The `(previous, latest)` pair, or `None` with fewer than two periods.
    #[must_use]
    pub fn latest_two(&self) -> Option<(&HistoryRecord, &HistoryRecord)> {
        match self.records.as_slice() {
            [.., previous, latest] => Some((previous, latest)),
            _ => None,
        }
    }

    /// Flattens the history into actual series points using `total_field`
    /// as the metric value.
    #[must_use]
    pub fn actual_series(&self, total_field: &str) -> Vec<SeriesPoint> {
        self.records
            .iter()
            .map(|r| SeriesPoint {
                entity: self.entity.clone(),
                period: r.period,
                value: r.number(total_field),
                source: SourceTag::Actual,
                pct_change: None,
            })
            .collect()
    }
}

/// Per-component fractional change derived from the last two periods.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendRatios(BTreeMap<String, f64>);

impl TrendRatios {
    /// Records the ratio for a component.
    pub fn insert(&mut self, component: impl Into<String>, ratio: f64) {
        self.0.insert(component.into(), ratio);
    }

    /// Ratio for `component`; components without a ratio do not change.
    #[must_use]
    pub fn get(&self, component: &str) -> f64 {
        self.0.get(component).copied().unwrap_or(0.0)
    }

    /// Iterates `(component, ratio)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of components with a ratio.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no ratios were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One extrapolated period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedRecord {
    /// Entity key.
    pub entity: String,
    /// Target period.
    pub period: i32,
    /// Reconstructed sub-component values (clamped at zero).
    pub components: BTreeMap<String, f64>,
    /// Predictor output for the reconstructed record.
    pub value: f64,
}

impl ProjectedRecord {
    /// Projected records are always tagged [`SourceTag::Predicted`].
    #[must_use]
    pub const fn source(&self) -> SourceTag {
        SourceTag::Predicted
    }

    /// Converts into a display point without percent change.
    #[must_use]
    pub fn to_series_point(&self) -> SeriesPoint {
        SeriesPoint {
            entity: self.entity.clone(),
            period: self.period,
            value: Some(self.value),
            source: self.source(),
            pct_change: None,
        }
    }
}

/// A labelled point of a display series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    /// Entity key.
    pub entity: String,
    /// Period key.
    pub period: i32,
    /// Metric value; `None` for a missing observation.
    pub value: Option<f64>,
    /// Whether the value is observed or projected.
    pub source: SourceTag,
    /// Fractional change from the previous point of the same source.
    pub pct_change: Option<f64>,
}

/// Names that tie generic history records to the projection engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", default)]
pub struct ProjectionSettings {
    /// Field name the entity is encoded under (one-hot prefix).
    pub entity_field: String,
    /// Field name the period is encoded under.
    pub period_field: String,
    /// Field holding the total metric of actual records.
    pub total_field: String,
    /// Sub-components extrapolated by the trend ratios, in order.
    pub components: Vec<String>,
}

impl Default for ProjectionSettings {
    fn default() -> Self {
        Self {
            entity_field: "Nation".to_string(),
            period_field: "Year".to_string(),
            total_field:
                "Total CO2 emissions from fossil-fuels and cement production (thousand metric tons of C)"
                    .to_string(),
            components: vec![
                "Emissions from solid fuel consumption".to_string(),
                "Emissions from liquid fuel consumption".to_string(),
                "Emissions from gas fuel consumption".to_string(),
                "Emissions from cement production".to_string(),
                "Emissions from gas flaring".to_string(),
                "Emissions from bunker fuels (not included in the totals)".to_string(),
            ],
        }
    }
}
