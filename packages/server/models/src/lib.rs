#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the emissions dashboard server.
//!
//! Dashboard wire types (layout, callback dispatch) live in
//! `carbon_dash_dashboard_models`; this crate only holds what the
//! server adds on top.

use carbon_dash_dataset_models::YearBounds;
use carbon_dash_projection_models::SeriesPoint;
use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Nations available in the loaded dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NationsResponse {
    /// Nation names, sorted.
    pub nations: Vec<String>,
    /// Years covered by the dataset, if it has any rows.
    pub year_bounds: Option<YearBounds>,
}

/// Query parameters for the single-nation projection endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionParams {
    /// Nation to project.
    pub nation: String,
    /// Comma-separated target years. Defaults to the configured years.
    pub years: Option<String>,
}

/// Query parameters for the all-nations projection endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllProjectionParams {
    /// Comma-separated target years. Defaults to the configured years.
    pub years: Option<String>,
}

/// A projected series.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResponse {
    /// Nation projected, or `None` for the all-nations series.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nation: Option<String>,
    /// Target years actually used.
    pub years: Vec<i32>,
    /// Actual points followed by predicted points.
    pub series: Vec<SeriesPoint>,
}
