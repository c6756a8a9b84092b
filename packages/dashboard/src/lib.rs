#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Emissions dashboard core.
//!
//! Startup loads a [`config::DashboardConfig`], builds an immutable
//! [`context::AppContext`] (dataset, feature schema, predictor) and a
//! [`registry::CallbackRegistry`] holding every reactive handler. The
//! caller's own loop (HTTP server or CLI) then feeds user interactions
//! to [`registry::CallbackRegistry::dispatch`].

pub mod config;
pub mod context;
pub mod figures;
pub mod handlers;
pub mod layout;
pub mod registry;

use carbon_dash_dataset::DatasetError;
use carbon_dash_projection::ProjectionError;
use carbon_dash_projection::model::ModelError;
use thiserror::Error;

pub use config::{ConfigError, DashboardConfig};
pub use context::AppContext;
pub use handlers::default_registry;
pub use registry::CallbackRegistry;

/// Errors raised while starting or driving the dashboard.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// The configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The dataset could not be loaded.
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// The model or feature schema could not be loaded.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// A projection failed.
    #[error(transparent)]
    Projection(#[from] ProjectionError),

    /// The selected nation is not in the dataset.
    #[error("Unknown nation '{nation}'")]
    UnknownNation {
        /// The requested nation.
        nation: String,
    },

    /// A control holds a value of the wrong type.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue {
        /// The property holding the value.
        key: String,
        /// What was wrong with it.
        message: String,
    },

    /// Two callbacks declare the same output.
    #[error("Output {key} of '{callback}' is already written by '{owner}'")]
    DuplicateOutput {
        /// The contested property.
        key: String,
        /// Callback being registered.
        callback: String,
        /// Callback that already owns the output.
        owner: String,
    },

    /// A handler returned a different number of values than it declares.
    #[error("Callback '{callback}' returned {actual} values for {expected} outputs")]
    OutputArity {
        /// The offending callback.
        callback: String,
        /// Number of declared outputs.
        expected: usize,
        /// Number of values returned.
        actual: usize,
    },
}
