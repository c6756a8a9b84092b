//! Feature schema handling and record encoding.
//!
//! The predictor is trained on a fixed, ordered list of input columns.
//! [`encode_record`] maps a [`HistoryRecord`] onto that list: numeric
//! fields by name, text fields one-hot as `<field>_<value>`. The schema
//! is authoritative, so absent columns are zero-filled and unknown ones
//! are dropped.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use carbon_dash_projection_models::{FieldValue, HistoryRecord, ProjectionSettings};

use crate::model::ModelError;

/// Ordered list of input columns the predictor expects.
#[derive(Debug, Clone)]
pub struct FeatureSchema {
    columns: Arc<[String]>,
    index: HashMap<String, usize>,
}

impl FeatureSchema {
    /// Builds a schema from column names in model order.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EmptySchema`] for an empty list and
    /// [`ModelError::DuplicateFeature`] if a name repeats.
    pub fn new(columns: Vec<String>) -> Result<Self, ModelError> {
        if columns.is_empty() {
            return Err(ModelError::EmptySchema);
        }

        let mut index = HashMap::with_capacity(columns.len());
        for (i, name) in columns.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(ModelError::DuplicateFeature { name: name.clone() });
            }
        }

        Ok(Self {
            columns: columns.into(),
            index,
        })
    }

    /// Parses a schema file: one column name per line, blank lines ignored.
    ///
    /// # Errors
    ///
    /// See [`FeatureSchema::new`].
    pub fn parse(text: &str) -> Result<Self, ModelError> {
        Self::new(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Reads and parses a schema file.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Io`] if the file cannot be read, or any error
    /// from [`FeatureSchema::parse`].
    pub fn from_path(path: &Path) -> Result<Self, ModelError> {
        let text = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let schema = Self::parse(&text)?;
        log::info!(
            "Loaded feature schema with {} columns from {}",
            schema.len(),
            path.display()
        );
        Ok(schema)
    }

    /// Column names in model order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Always `false`; empty schemas are rejected on construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of `name` in the schema.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// An all-zero record, used to probe a freshly loaded predictor.
    #[must_use]
    pub fn zeros(&self) -> EncodedRecord {
        EncodedRecord {
            columns: Arc::clone(&self.columns),
            values: vec![0.0; self.columns.len()],
        }
    }
}

/// A record aligned to a [`FeatureSchema`]. Every value is finite.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedRecord {
    columns: Arc<[String]>,
    values: Vec<f64>,
}

impl EncodedRecord {
    /// Values in schema order.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Column names in schema order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Value of column `name`, if the schema has it.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|i| self.values[i])
    }

    /// Iterates `(column, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }
}

/// Encodes `record` against `schema`.
///
/// The period is written under `settings.period_field` and the entity is
/// one-hot encoded under `settings.entity_field`. Missing and non-finite
/// values become `0.0`.
#[must_use]
pub fn encode_record(
    record: &HistoryRecord,
    settings: &ProjectionSettings,
    schema: &FeatureSchema,
) -> EncodedRecord {
    let mut encoded = schema.zeros();

    let mut put = |name: &str, value: f64| {
        if let Some(i) = schema.position(name) {
            encoded.values[i] = if value.is_finite() { value } else { 0.0 };
        } else {
            log::trace!("Dropping column '{name}' not present in feature schema");
        }
    };

    put(&settings.period_field, f64::from(record.period));
    put(
        &format!("{}_{}", settings.entity_field, record.entity),
        1.0,
    );

    for (name, field) in &record.fields {
        match field {
            FieldValue::Number(value) => put(name, value.unwrap_or(0.0)),
            FieldValue::Text(text) => put(&format!("{name}_{text}"), 1.0),
        }
    }

    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ProjectionSettings {
        ProjectionSettings {
            entity_field: "Nation".to_string(),
            period_field: "Year".to_string(),
            total_field: "Total".to_string(),
            components: vec!["solid".to_string()],
        }
    }

    #[test]
    fn parses_schema_lines() {
        let schema = FeatureSchema::parse("Year\n\n  solid  \nNation_CHINA\n").unwrap();
        assert_eq!(schema.columns(), ["Year", "solid", "Nation_CHINA"]);
        assert_eq!(schema.position("solid"), Some(1));
    }

    #[test]
    fn rejects_duplicate_and_empty_schemas() {
        assert!(matches!(
            FeatureSchema::parse("a\nb\na"),
            Err(ModelError::DuplicateFeature { name }) if name == "a"
        ));
        assert!(matches!(
            FeatureSchema::parse("\n\n"),
            Err(ModelError::EmptySchema)
        ));
    }

    #[test]
    fn encodes_against_schema_order() {
        let schema =
            FeatureSchema::parse("solid\nYear\nNation_CHINA\nNation_INDIA\nper_capita\nregion_ASIA")
                .unwrap();
        let record = HistoryRecord::new("CHINA", 2020)
            .with_number("solid", Some(12.5))
            .with_number("not_in_schema", Some(99.0))
            .with_number("per_capita", None)
            .with_text("region", "ASIA");

        let encoded = encode_record(&record, &settings(), &schema);
        assert_eq!(encoded.values(), [12.5, 2020.0, 1.0, 0.0, 0.0, 1.0]);
        assert_eq!(encoded.get("not_in_schema"), None);
    }

    #[test]
    fn replaces_non_finite_values_with_zero() {
        let schema = FeatureSchema::parse("solid\nliquid").unwrap();
        let record = HistoryRecord::new("A", 2020)
            .with_number("solid", Some(f64::INFINITY))
            .with_number("liquid", Some(f64::NAN));

        let encoded = encode_record(&record, &settings(), &schema);
        assert!(encoded.values().iter().all(|v| v.is_finite()));
        assert_eq!(encoded.values(), [0.0, 0.0]);
    }
}
