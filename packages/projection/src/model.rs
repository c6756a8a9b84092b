//! File-backed linear predictor.
//!
//! The model artifact is a JSON document:
//!
//! ```json
//! { "intercept": 12.0, "coefficients": { "Emissions from solid fuel consumption": 1.0 } }
//! ```
//!
//! Every coefficient must name a column of the companion
//! [`FeatureSchema`]; a coefficient the schema cannot supply is a
//! mismatch that zero-filling cannot repair, so loading fails.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::encode::{EncodedRecord, FeatureSchema};
use crate::{PredictError, Predictor};

/// Errors that can occur while loading model artifacts.
#[derive(Debug, Error)]
pub enum ModelError {
    /// An artifact could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path of the artifact.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The model file is not valid JSON for a linear model.
    #[error("Invalid model file: {0}")]
    Json(#[from] serde_json::Error),

    /// The schema lists no columns.
    #[error("Feature schema is empty")]
    EmptySchema,

    /// The schema lists a column twice.
    #[error("Feature schema lists '{name}' more than once")]
    DuplicateFeature {
        /// The repeated column.
        name: String,
    },

    /// The model references a column the schema does not provide.
    #[error("Model coefficient '{name}' is not part of the feature schema")]
    UnknownFeature {
        /// The unknown column.
        name: String,
    },

    /// Probing the loaded predictor failed.
    #[error("Predictor probe failed: {0}")]
    Probe(#[from] PredictError),
}

/// Linear regression over schema columns.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LinearModel {
    /// Constant term.
    pub intercept: f64,
    /// Weight per schema column; columns without a weight contribute 0.
    #[serde(default)]
    pub coefficients: BTreeMap<String, f64>,
}

impl LinearModel {
    /// Parses a model from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Json`] if the document is malformed.
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a model file.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::Io`] or [`ModelError::Json`].
    pub fn from_path(path: &Path) -> Result<Self, ModelError> {
        let json = std::fs::read_to_string(path).map_err(|source| ModelError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let model = Self::from_json(&json)?;
        log::info!(
            "Loaded linear model with {} coefficients from {}",
            model.coefficients.len(),
            path.display()
        );
        Ok(model)
    }

    /// Checks that every coefficient names a schema column.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownFeature`] for the first offending name.
    pub fn validate(&self, schema: &FeatureSchema) -> Result<(), ModelError> {
        match self
            .coefficients
            .keys()
            .find(|name| schema.position(name).is_none())
        {
            Some(name) => Err(ModelError::UnknownFeature { name: name.clone() }),
            None => Ok(()),
        }
    }
}

impl Predictor for LinearModel {
    fn predict(&self, record: &EncodedRecord) -> Result<f64, PredictError> {
        let value = record.iter().fold(self.intercept, |acc, (name, x)| {
            acc + self.coefficients.get(name).copied().unwrap_or(0.0) * x
        });

        if value.is_finite() {
            Ok(value)
        } else {
            Err(PredictError::NonFinite { value })
        }
    }
}

/// Loads the schema and model artifacts, validates them against each
/// other, and probes the model once with an all-zero record.
///
/// # Errors
///
/// Returns [`ModelError`] if either artifact is missing or malformed, the
/// model references unknown columns, or the probe prediction fails.
pub fn load_artifacts(
    model_path: &Path,
    schema_path: &Path,
) -> Result<(FeatureSchema, LinearModel), ModelError> {
    let schema = FeatureSchema::from_path(schema_path)?;
    let model = LinearModel::from_path(model_path)?;
    model.validate(&schema)?;
    probe(&model, &schema)?;
    Ok((schema, model))
}

/// Runs one prediction on an all-zero record so a broken predictor is
/// caught at startup rather than on the first request.
///
/// # Errors
///
/// Returns [`ModelError::Probe`] if the predictor fails.
pub fn probe(predictor: &dyn Predictor, schema: &FeatureSchema) -> Result<(), ModelError> {
    predictor.predict(&schema.zeros())?;
    Ok(())
}
