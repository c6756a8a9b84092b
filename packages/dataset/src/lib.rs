#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Loads the per-nation, per-year emissions table.
//!
//! The table is read once at startup into one [`EntityHistory`] per
//! nation. Every column other than the entity and period columns is kept:
//! cells that parse as numbers become numeric fields, empty cells become
//! missing values, and anything else is kept as text (or treated as
//! missing in a known numeric column).

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use carbon_dash_dataset_models::{NUMERIC_COLUMNS, YearBounds};
use carbon_dash_projection_models::{
    DuplicatePeriodError, EntityHistory, FieldValue, HistoryRecord, ProjectionSettings,
};
use thiserror::Error;

/// Errors that can occur while loading the dataset.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// The file could not be opened.
    #[error("Failed to read dataset {path}: {source}")]
    Io {
        /// Path of the dataset.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The CSV structure is invalid.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A required column is absent from the header row.
    #[error("Dataset has no '{column}' column")]
    MissingColumn {
        /// The column that was expected.
        column: String,
    },

    /// A nation has two rows for the same year.
    #[error("Invalid dataset: {0}")]
    DuplicatePeriod(#[from] DuplicatePeriodError),
}

/// The loaded dataset: one history per nation.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    histories: BTreeMap<String, EntityHistory>,
    bounds: Option<YearBounds>,
    rows: usize,
}

impl Dataset {
    /// Reads the dataset from a CSV file.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if the file cannot be read, is not valid
    /// CSV, lacks the entity or period column, or repeats a period.
    pub fn from_path(path: &Path, settings: &ProjectionSettings) -> Result<Self, DatasetError> {
        let file = std::fs::File::open(path).map_err(|source| DatasetError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let dataset = Self::from_reader(file, settings)?;
        log::info!(
            "Loaded {} rows for {} nations from {}",
            dataset.rows,
            dataset.histories.len(),
            path.display()
        );
        Ok(dataset)
    }

    /// Parses the dataset from CSV text.
    ///
    /// # Errors
    ///
    /// See [`Dataset::from_path`].
    pub fn parse(text: &str, settings: &ProjectionSettings) -> Result<Self, DatasetError> {
        Self::from_reader(text.as_bytes(), settings)
    }

    /// Parses the dataset from any CSV source.
    ///
    /// # Errors
    ///
    /// See [`Dataset::from_path`].
    pub fn from_reader(
        reader: impl Read,
        settings: &ProjectionSettings,
    ) -> Result<Self, DatasetError> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_owned())
            .collect();

        let column = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| DatasetError::MissingColumn {
                    column: name.to_string(),
                })
        };
        let entity_idx = column(&settings.entity_field)?;
        let period_idx = column(&settings.period_field)?;

        let mut grouped: BTreeMap<String, Vec<HistoryRecord>> = BTreeMap::new();
        let mut rows = 0;

        for (line, result) in reader.records().enumerate() {
            let record = result?;

            let entity = record.get(entity_idx).unwrap_or("").trim();
            if entity.is_empty() {
                log::warn!("Skipping row {}: no {}", line + 2, settings.entity_field);
                continue;
            }

            let raw_period = record.get(period_idx).unwrap_or("").trim();
            let Some(period) = parse_period(raw_period) else {
                log::warn!(
                    "Skipping row {} of '{entity}': invalid {} '{raw_period}'",
                    line + 2,
                    settings.period_field
                );
                continue;
            };

            let mut history_record = HistoryRecord::new(entity, period);
            for (i, header) in headers.iter().enumerate() {
                if i == entity_idx || i == period_idx {
                    continue;
                }
                let cell = record.get(i).unwrap_or("").trim();
                history_record
                    .fields
                    .insert(header.clone(), parse_cell(header, cell, settings));
            }

            grouped
                .entry(entity.to_string())
                .or_default()
                .push(history_record);
            rows += 1;
        }

        let mut histories = BTreeMap::new();
        for (entity, records) in grouped {
            let history = EntityHistory::new(entity.clone(), records)?;
            histories.insert(entity, history);
        }

        let bounds = histories
            .values()
            .flat_map(|h| h.records().iter().map(|r| r.period))
            .fold(None, |bounds: Option<YearBounds>, year| {
                Some(bounds.map_or(YearBounds { min: year, max: year }, |b| YearBounds {
                    min: b.min.min(year),
                    max: b.max.max(year),
                }))
            });

        Ok(Self {
            histories,
            bounds,
            rows,
        })
    }

    /// Nation names in ascending order.
    #[must_use]
    pub fn nations(&self) -> Vec<&str> {
        self.histories.keys().map(String::as_str).collect()
    }

    /// Whether `nation` appears in the dataset.
    #[must_use]
    pub fn contains(&self, nation: &str) -> bool {
        self.histories.contains_key(nation)
    }

    /// Earliest and latest year across every nation.
    #[must_use]
    pub const fn year_bounds(&self) -> Option<YearBounds> {
        self.bounds
    }

    /// History of one nation.
    #[must_use]
    pub fn history(&self, nation: &str) -> Option<&EntityHistory> {
        self.histories.get(nation)
    }

    /// Every history, ordered by nation name.
    pub fn histories(&self) -> impl Iterator<Item = &EntityHistory> {
        self.histories.values()
    }

    /// Rows of `nation` between `from` and `to` inclusive, in year order.
    /// A reversed range is treated as if it were given the right way
    /// round.
    #[must_use]
    pub fn range(&self, nation: &str, from: i32, to: i32) -> Vec<&HistoryRecord> {
        let (from, to) = if from > to { (to, from) } else { (from, to) };
        self.history(nation)
            .map(|h| {
                h.records()
                    .iter()
                    .filter(|r| r.period >= from && r.period <= to)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Total number of rows loaded.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.rows
    }

    /// Whether no rows were loaded.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.rows == 0
    }
}

/// Parses a year cell. Spreadsheet exports sometimes write integral
/// years as `2021.0`, which is accepted.
fn parse_period(raw: &str) -> Option<i32> {
    if let Ok(year) = raw.parse::<i32>() {
        return Some(year);
    }
    let value = raw.parse::<f64>().ok()?;
    if value.fract().abs() > 0.0 || !value.is_finite() {
        return None;
    }
    format!("{value:.0}").parse().ok()
}

fn is_numeric_column(name: &str, settings: &ProjectionSettings) -> bool {
    NUMERIC_COLUMNS.contains(&name)
        || name == settings.total_field
        || settings.components.iter().any(|c| c == name)
}

fn parse_cell(column: &str, cell: &str, settings: &ProjectionSettings) -> FieldValue {
    if cell.is_empty() {
        return FieldValue::Number(None);
    }
    if let Ok(value) = cell.parse::<f64>() {
        return FieldValue::Number(Some(value));
    }
    if is_numeric_column(column, settings) {
        log::trace!("Treating '{cell}' in '{column}' as missing");
        return FieldValue::Number(None);
    }
    FieldValue::Text(cell.to_string())
}
