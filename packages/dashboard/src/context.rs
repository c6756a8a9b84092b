//! Read-only application context shared by every handler.

use carbon_dash_dataset::Dataset;
use carbon_dash_projection::model::{load_artifacts, probe};
use carbon_dash_projection::{FeatureSchema, Predictor, ProjectionEngine};
use carbon_dash_projection_models::ProjectionSettings;

use crate::DashboardError;
use crate::config::DashboardConfig;

/// Dataset, feature schema, predictor and configuration. Built once at
/// startup and never mutated afterwards.
pub struct AppContext {
    config: DashboardConfig,
    dataset: Dataset,
    schema: FeatureSchema,
    predictor: Box<dyn Predictor>,
}

impl AppContext {
    /// Loads every artifact named by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError`] if the dataset, model or schema cannot
    /// be loaded, or if the model fails its startup probe.
    pub fn load(config: DashboardConfig) -> Result<Self, DashboardError> {
        log::info!("Loading dataset from {}", config.data.dataset.display());
        let dataset = Dataset::from_path(&config.data.dataset, &config.projection.settings)?;

        log::info!(
            "Loading model from {} with schema {}",
            config.data.model.display(),
            config.data.schema.display()
        );
        let (schema, model) = load_artifacts(&config.data.model, &config.data.schema)?;

        Self::new(config, dataset, schema, Box::new(model))
    }

    /// Assembles a context from already loaded parts, probing the
    /// predictor once with an all-zero record.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Model`] if the probe fails.
    pub fn new(
        config: DashboardConfig,
        dataset: Dataset,
        schema: FeatureSchema,
        predictor: Box<dyn Predictor>,
    ) -> Result<Self, DashboardError> {
        probe(predictor.as_ref(), &schema)?;
        log::info!(
            "Dashboard ready: {} nations, {} feature columns",
            dataset.nations().len(),
            schema.len()
        );
        Ok(Self {
            config,
            dataset,
            schema,
            predictor,
        })
    }

    #[must_use]
    pub const fn config(&self) -> &DashboardConfig {
        &self.config
    }

    #[must_use]
    pub const fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    #[must_use]
    pub const fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    #[must_use]
    pub const fn settings(&self) -> &ProjectionSettings {
        &self.config.projection.settings
    }

    /// A projection engine over this context's schema and predictor.
    #[must_use]
    pub fn engine(&self) -> ProjectionEngine<'_> {
        ProjectionEngine::new(self.settings(), &self.schema, self.predictor.as_ref())
    }

    /// Latest year of the dataset.
    #[must_use]
    pub fn max_year(&self) -> Option<i32> {
        self.dataset.year_bounds().map(|b| b.max)
    }

    /// The configured default nation if the dataset has it, otherwise the
    /// first nation alphabetically.
    #[must_use]
    pub fn default_nation(&self) -> Option<&str> {
        let configured = self.config.controls.default_nation.as_str();
        if self.dataset.contains(configured) {
            Some(configured)
        } else {
            self.dataset.nations().first().copied()
        }
    }
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppContext")
            .field("config", &self.config)
            .field("nations", &self.dataset.nations().len())
            .field("schema", &self.schema.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Fixture context shared by the handler tests.

    use carbon_dash_dataset_models::{LIQUID_FUEL, SOLID_FUEL};
    use carbon_dash_projection::{EncodedRecord, PredictError};

    use super::*;

    pub const FIXTURE: &str = "\
Nation,Year,Total CO2 emissions from fossil-fuels and cement production (thousand metric tons of C),Emissions from solid fuel consumption,Emissions from liquid fuel consumption,Emissions from gas fuel consumption
ALPHA,1990,100,50,30,20
ALPHA,2000,150,80,40,30
ALPHA,2010,180,100,45,35
ALPHA,2019,200,100,50,50
ALPHA,2020,210,110,45,55
BETA,2020,5,1,2,2
";

    /// Sum of the solid and liquid columns.
    pub fn sum_predictor(record: &EncodedRecord) -> Result<f64, PredictError> {
        Ok(record.get(SOLID_FUEL).unwrap_or(0.0) + record.get(LIQUID_FUEL).unwrap_or(0.0))
    }

    pub fn config() -> DashboardConfig {
        let mut config = DashboardConfig::default();
        config.controls.default_nation = "ALPHA".to_string();
        config.projection.default_years = vec![2021, 2022];
        config
    }

    pub fn schema() -> FeatureSchema {
        FeatureSchema::parse(&format!("Year\n{SOLID_FUEL}\n{LIQUID_FUEL}\nNation_ALPHA")).unwrap()
    }

    pub fn context_with(predictor: Box<dyn Predictor>) -> AppContext {
        let config = config();
        let dataset = Dataset::parse(FIXTURE, &config.projection.settings).unwrap();
        AppContext::new(config, dataset, schema(), predictor).unwrap()
    }

    pub fn context() -> AppContext {
        context_with(Box::new(sum_predictor))
    }
}
