#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Shared vocabulary of the national emissions dataset.
//!
//! Column names match the headers of the published per-nation CO₂ table
//! (thousand metric tons of carbon unless noted otherwise).

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

// ── Column names ────────────────────────────────────────────────────

/// Nation name.
pub const NATION: &str = "Nation";
/// Calendar year.
pub const YEAR: &str = "Year";
/// Total emissions from fossil fuels and cement.
pub const TOTAL: &str =
    "Total CO2 emissions from fossil-fuels and cement production (thousand metric tons of C)";
/// Solid fuel consumption.
pub const SOLID_FUEL: &str = "Emissions from solid fuel consumption";
/// Liquid fuel consumption.
pub const LIQUID_FUEL: &str = "Emissions from liquid fuel consumption";
/// Gas fuel consumption.
pub const GAS_FUEL: &str = "Emissions from gas fuel consumption";
/// Cement production.
pub const CEMENT: &str = "Emissions from cement production";
/// Gas flaring.
pub const GAS_FLARING: &str = "Emissions from gas flaring";
/// Per capita emissions (metric tons of carbon).
pub const PER_CAPITA: &str = "Per capita CO2 emissions (metric tons of carbon)";
/// Bunker fuels, reported separately from the totals.
pub const BUNKER_FUELS: &str = "Emissions from bunker fuels (not included in the totals)";

/// Columns that always hold numbers; unparseable cells in them are
/// treated as missing values.
pub const NUMERIC_COLUMNS: [&str; 8] = [
    TOTAL,
    SOLID_FUEL,
    LIQUID_FUEL,
    GAS_FUEL,
    CEMENT,
    GAS_FLARING,
    PER_CAPITA,
    BUNKER_FUELS,
];

/// Fuel categories with a dedicated chart.
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
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FuelType {
    Solid,
    Liquid,
    Gas,
}

impl FuelType {
    /// Dataset column holding this fuel's emissions.
    #[must_use]
    pub const fn column(self) -> &'static str {
        match self {
            Self::Solid => SOLID_FUEL,
            Self::Liquid => LIQUID_FUEL,
            Self::Gas => GAS_FUEL,
        }
    }

    /// Chart title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Solid => "Solid Fuel Emissions",
            Self::Liquid => "Liquid Fuel Emissions",
            Self::Gas => "Gas Fuel Emissions",
        }
    }

    /// Checklist label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Solid => "Solid",
            Self::Liquid => "Liquid",
            Self::Gas => "Gas",
        }
    }
}

/// Inclusive range of years present in a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearBounds {
    /// Earliest year.
    pub min: i32,
    /// Latest year.
    pub max: i32,
}

impl YearBounds {
    /// Whether `year` lies within the bounds.
    #[must_use]
    pub const fn contains(&self, year: i32) -> bool {
        year >= self.min && year <= self.max
    }

    /// Number of years covered.
    #[must_use]
    pub const fn span(&self) -> i32 {
        self.max - self.min
    }
}
