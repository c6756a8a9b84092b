#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Emissions projection engine.
//!
//! Given per-entity histories, the engine estimates a per-component trend
//! from the last two periods ([`trend`]), extrapolates the requested
//! future periods and scores each reconstructed record with an injected
//! [`Predictor`] ([`projector`]), then merges actual and projected points
//! into one display series ([`merge`]).
//!
//! Nothing here knows about HTTP, callbacks or files other than the model
//! and schema artifacts in [`model`] and [`encode`].

pub mod encode;
pub mod merge;
pub mod model;
pub mod periods;
pub mod progress;
pub mod projector;
pub mod trend;

use thiserror::Error;

pub use encode::{EncodedRecord, FeatureSchema};
pub use projector::ProjectionEngine;

/// Errors that can occur while projecting an entity.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// The predictor rejected a reconstructed record. Model and schema are
    /// required inputs, so callers treat this as a configuration fault.
    #[error("Predictor failed for {entity} in {period}: {source}")]
    Predictor {
        /// Entity being projected.
        entity: String,
        /// Target period being scored.
        period: i32,
        /// Underlying predictor error.
        source: PredictError,
    },

    /// The user supplied no usable target periods.
    #[error(
        "No valid years in '{input}'. Enter years as comma-separated integers (e.g. 2022, 2023, 2024)"
    )]
    NoValidPeriods {
        /// The raw input as typed.
        input: String,
    },
}

/// Errors raised by a [`Predictor`] implementation.
#[derive(Debug, Error)]
pub enum PredictError {
    /// The encoded record does not have the width the model expects.
    #[error("Expected {expected} features, got {actual}")]
    Shape {
        /// Width the model was trained on.
        expected: usize,
        /// Width of the record it received.
        actual: usize,
    },

    /// The model produced NaN or an infinity.
    #[error("Prediction is not finite: {value}")]
    NonFinite {
        /// The offending output.
        value: f64,
    },

    /// Any other failure reported by the model.
    #[error("{message}")]
    Model {
        /// Description of what went wrong.
        message: String,
    },
}

/// Pre-trained point estimator: one schema-aligned record in, one scalar
/// out.
///
/// Implementations must be `Send + Sync`; the loaded predictor is shared
/// read-only across server workers.
pub trait Predictor: Send + Sync {
    /// Scores one encoded record.
    ///
    /// # Errors
    ///
    /// Returns [`PredictError`] if the record cannot be scored.
    fn predict(&self, record: &EncodedRecord) -> Result<f64, PredictError>;
}

impl<F> Predictor for F
where
    F: Fn(&EncodedRecord) -> Result<f64, PredictError> + Send + Sync,
{
    fn predict(&self, record: &EncodedRecord) -> Result<f64, PredictError> {
        self(record)
    }
}
