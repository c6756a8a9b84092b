//! Dashboard configuration.
//!
//! Read from the TOML file named by `CARBON_DASH_CONFIG`, else from
//! `carbon_dash.toml` in the working directory, else built-in defaults.
//! Every key is optional.
//!
//! ```toml
//! [data]
//! dataset = "data/nation.1751_2021.csv"
//! model = "data/model.json"
//! schema = "data/training_cols.txt"
//!
//! [projection]
//! default_years = [2022, 2023, 2024]
//!
//! [controls]
//! preset_spans = [10, 20, 30, 40, 50]
//! default_nation = "UNITED STATES OF AMERICA"
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use carbon_dash_projection_models::ProjectionSettings;
use serde::Deserialize;
use thiserror::Error;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "CARBON_DASH_CONFIG";

/// Configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "carbon_dash.toml";

/// Errors that can occur while loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config {path}: {source}")]
    Io {
        /// Path of the file.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid TOML for this configuration.
    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value is out of range.
    #[error("Invalid config: {message}")]
    Invalid {
        /// What is wrong.
        message: String,
    },
}

/// Locations of the startup artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Per-nation, per-year CSV table.
    pub dataset: PathBuf,
    /// JSON linear model.
    pub model: PathBuf,
    /// Feature schema, one column per line.
    pub schema: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            dataset: PathBuf::from("data/nation.1751_2021.csv"),
            model: PathBuf::from("data/model.json"),
            schema: PathBuf::from("data/training_cols.txt"),
        }
    }
}

/// Projection field names and the years projected when none are given.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Field names shared with the projection engine.
    #[serde(flatten)]
    pub settings: ProjectionSettings,
    /// Years projected when the user has not entered any.
    pub default_years: Vec<i32>,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            settings: ProjectionSettings::default(),
            default_years: vec![2022, 2023, 2024],
        }
    }
}

/// Control defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    /// Year-span presets, in button order.
    pub preset_spans: Vec<i32>,
    /// Nation selected on first load.
    pub default_nation: String,
    /// Prefix of the error banner text.
    pub error_text: String,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            preset_spans: vec![10, 20, 30, 40, 50],
            default_nation: "UNITED STATES OF AMERICA".to_string(),
            error_text: "there was an error".to_string(),
        }
    }
}

/// Complete dashboard configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// `[data]`
    pub data: DataConfig,
    /// `[projection]`
    pub projection: ProjectionConfig,
    /// `[controls]`
    pub controls: ControlsConfig,
}

impl DashboardConfig {
    /// Loads the configuration from the usual locations.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a configuration file exists but cannot
    /// be read or is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Self::from_path(Path::new(&path));
        }

        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            return Self::from_path(local);
        }

        log::info!("No configuration file found, using defaults");
        Ok(Self::default())
    }

    /// Reads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or is invalid.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml(&text)?;
        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parses and validates a configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first problem.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| Err(ConfigError::Invalid { message });

        let spans = &self.controls.preset_spans;
        if spans.is_empty() {
            return invalid("controls.preset_spans must not be empty".to_string());
        }
        if let Some(span) = spans.iter().find(|s| **s <= 0) {
            return invalid(format!(
                "controls.preset_spans contains {span}, spans must be positive"
            ));
        }
        if spans.iter().collect::<BTreeSet<_>>().len() != spans.len() {
            return invalid("controls.preset_spans contains duplicates".to_string());
        }

        if self.projection.default_years.is_empty() {
            return invalid("projection.default_years must not be empty".to_string());
        }
        if self.projection.settings.components.is_empty() {
            return invalid("projection.components must not be empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = DashboardConfig::from_toml("").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.controls.preset_spans, vec![10, 20, 30, 40, 50]);
        assert_eq!(config.projection.default_years, vec![2022, 2023, 2024]);
        assert_eq!(config.projection.settings.entity_field, "Nation");
        assert_eq!(config.projection.settings.components.len(), 6);
    }

    #[test]
    fn overrides_individual_keys() {
        let config = DashboardConfig::from_toml(
            r#"
            [data]
            dataset = "fixtures/nations.csv"

            [projection]
            default_years = [2030]
            components = ["Emissions from solid fuel consumption"]

            [controls]
            preset_spans = [5, 15]
            "#,
        )
        .unwrap();

        assert_eq!(config.data.dataset, PathBuf::from("fixtures/nations.csv"));
        assert_eq!(config.data.model, PathBuf::from("data/model.json"));
        assert_eq!(config.projection.default_years, vec![2030]);
        assert_eq!(config.projection.settings.components.len(), 1);
        assert_eq!(config.projection.settings.period_field, "Year");
        assert_eq!(config.controls.preset_spans, vec![5, 15]);
        assert_eq!(config.controls.error_text, "there was an error");
    }

    #[test]
    fn rejects_invalid_spans() {
        for doc in [
            "[controls]\npreset_spans = []",
            "[controls]\npreset_spans = [10, 0]",
            "[controls]\npreset_spans = [10, 10]",
        ] {
            assert!(matches!(
                DashboardConfig::from_toml(doc),
                Err(ConfigError::Invalid { .. })
            ));
        }
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(
            DashboardConfig::from_toml("[controls"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(
            DashboardConfig::from_path(Path::new("/nonexistent/carbon_dash.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
