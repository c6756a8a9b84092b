#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Wire types of the emissions dashboard.
//!
//! Controls are addressed by [`PropKey`] (`"<id>.<property>"`), values are
//! plain JSON, and charts are described by [`Figure`] so any frontend can
//! render them.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use carbon_dash_dataset_models::{FuelType, YearBounds};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Element ids of the dashboard page.
pub mod ids {
    pub const COUNTRY_DROPDOWN: &str = "country-dropdown";
    pub const FROM_YEAR: &str = "from-year";
    pub const TO_YEAR: &str = "to-year";
    pub const EMISSION_GRAPH: &str = "emission-graph";
    pub const FUEL_TYPES: &str = "fuel-types";
    pub const SOLID_GRAPH: &str = "solid-graph";
    pub const LIQUID_GRAPH: &str = "liquid-graph";
    pub const GAS_GRAPH: &str = "gas-graph";
    pub const PROJECTION_YEARS: &str = "projection-years";
    pub const PROJECTION_GRAPH: &str = "projection-graph";
    pub const PROJECTION_MESSAGE: &str = "projection-message";
    pub const ERROR_BANNER: &str = "callback-error-banner-wrapper";
    pub const ERROR_TEXT: &str = "error-text";
    pub const DISMISS_BUTTON: &str = "dismiss-button";

    /// Prefix shared by the year-span preset buttons.
    pub const PRESET_PREFIX: &str = "btn-";

    /// Id of the preset button for a span of `years`.
    #[must_use]
    pub fn preset_button(years: i32) -> String {
        format!("{PRESET_PREFIX}{years}")
    }

    /// Span encoded in a preset button id, if `id` is one.
    #[must_use]
    pub fn preset_span(id: &str) -> Option<i32> {
        id.strip_prefix(PRESET_PREFIX)?.parse().ok()
    }
}

// ── Property keys ───────────────────────────────────────────────────

/// Address of one property of one element, written `id.prop`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PropKey {
    /// Element id.
    pub id: String,
    /// Property name.
    pub prop: String,
}

impl PropKey {
    /// Builds a key from its parts.
    #[must_use]
    pub fn new(id: impl Into<String>, prop: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            prop: prop.into(),
        }
    }

    /// `<id>.value`
    #[must_use]
    pub fn value(id: impl Into<String>) -> Self {
        Self::new(id, "value")
    }

    /// `<id>.n_clicks`
    #[must_use]
    pub fn clicks(id: impl Into<String>) -> Self {
        Self::new(id, "n_clicks")
    }

    /// `<id>.figure`
    #[must_use]
    pub fn figure(id: impl Into<String>) -> Self {
        Self::new(id, "figure")
    }

    /// `<id>.children`
    #[must_use]
    pub fn children(id: impl Into<String>) -> Self {
        Self::new(id, "children")
    }

    /// `<id>.style`
    #[must_use]
    pub fn style(id: impl Into<String>) -> Self {
        Self::new(id, "style")
    }
}

impl fmt::Display for PropKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.id, self.prop)
    }
}

/// Error returned when a string is not of the form `id.prop`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidPropKeyError(pub String);

impl fmt::Display for InvalidPropKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid property key '{}', expected 'id.prop'", self.0)
    }
}

impl std::error::Error for InvalidPropKeyError {}

impl FromStr for PropKey {
    type Err = InvalidPropKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((id, prop)) if !id.is_empty() && !prop.is_empty() => Ok(Self::new(id, prop)),
            _ => Err(InvalidPropKeyError(s.to_string())),
        }
    }
}

impl TryFrom<String> for PropKey {
    type Error = InvalidPropKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PropKey> for String {
    fn from(key: PropKey) -> Self {
        key.to_string()
    }
}

// ── Figures ─────────────────────────────────────────────────────────

/// Colours shared by every chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    /// Background around the plot area.
    pub paper_bgcolor: String,
    /// Background of the plot area.
    pub plot_bgcolor: String,
    /// Text colour.
    pub font_color: String,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            paper_bgcolor: "#2a2a2a".to_string(),
            plot_bgcolor: "#2a2a2a".to_string(),
            font_color: "white".to_string(),
        }
    }
}

/// How a trace's line is drawn.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dash,
    Dot,
}

/// One line of a chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    /// Legend label.
    pub name: String,
    /// Years along the x axis.
    pub x: Vec<i32>,
    /// Values along the y axis; `None` leaves a gap.
    pub y: Vec<Option<f64>>,
    /// Line style.
    pub line: LineStyle,
    /// Explicit colour, or the renderer's palette when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Whether the trace appears in the legend.
    pub show_legend: bool,
}

/// Free-floating text positioned in paper coordinates (0..1).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    /// Text shown.
    pub text: String,
    /// Horizontal position.
    pub x: f64,
    /// Vertical position.
    pub y: f64,
    /// Text colour.
    pub font_color: String,
    /// Text size in points.
    pub font_size: u32,
}

impl Annotation {
    /// Grey, centred text used by placeholder charts.
    #[must_use]
    pub fn centered(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            x: 0.5,
            y: 0.5,
            font_color: "gray".to_string(),
            font_size: 18,
        }
    }
}

/// Serializable description of a chart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Figure {
    /// Chart title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// X axis label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_label: Option<String>,
    /// Y axis label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_label: Option<String>,
    /// Lines to draw.
    pub traces: Vec<Trace>,
    /// Text overlays.
    pub annotations: Vec<Annotation>,
    /// Whether the axes are drawn.
    pub axes_visible: bool,
    /// Colours.
    pub theme: Theme,
}

// ── Layout ──────────────────────────────────────────────────────────

/// A dropdown or checklist entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlOption {
    /// Text shown to the user.
    pub label: String,
    /// Value submitted when selected.
    pub value: String,
}

impl From<FuelType> for ControlOption {
    fn from(fuel: FuelType) -> Self {
        Self {
            label: fuel.label().to_string(),
            value: fuel.to_string(),
        }
    }
}

/// Static structure of the page plus the initial value of every property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    /// Page heading.
    pub title: String,
    /// Nation dropdown entries, sorted.
    pub nations: Vec<ControlOption>,
    /// Fuel checklist entries.
    pub fuel_types: Vec<ControlOption>,
    /// Year-span presets, in button order.
    pub preset_spans: Vec<i32>,
    /// Years available in the dataset.
    pub year_bounds: Option<YearBounds>,
    /// Initial value of every property, keyed by `id.prop`.
    pub values: BTreeMap<String, serde_json::Value>,
}

// ── Callback wire types ─────────────────────────────────────────────

/// Declared shape of a registered callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackInfo {
    /// Callback name.
    pub name: String,
    /// Properties that trigger it.
    pub inputs: Vec<PropKey>,
    /// Properties it writes.
    pub outputs: Vec<PropKey>,
    /// Whether it is skipped on the initial render.
    pub prevent_initial_call: bool,
}

/// One user interaction: the property that changed and the current value
/// of every property the page knows about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchRequest {
    /// The property that changed.
    pub trigger: PropKey,
    /// Current values keyed by `id.prop`.
    #[serde(default)]
    pub values: BTreeMap<String, serde_json::Value>,
}

/// A callback that failed during a dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackFailure {
    /// Name of the failing callback.
    pub callback: String,
    /// Error message.
    pub message: String,
}

/// Property updates produced by a dispatch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchResponse {
    /// New values keyed by `id.prop`. Properties left unchanged are absent.
    pub updates: BTreeMap<String, serde_json::Value>,
    /// Callbacks that failed; their outputs are left unchanged.
    pub errors: Vec<CallbackFailure>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prop_keys_parse_at_the_first_dot() {
        let key: PropKey = "callback-error-banner-wrapper.style".parse().unwrap();
        assert_eq!(key, PropKey::style(ids::ERROR_BANNER));
        assert_eq!(key.to_string(), "callback-error-banner-wrapper.style");
        assert!("no-prop".parse::<PropKey>().is_err());
        assert!(".value".parse::<PropKey>().is_err());
        assert!("id.".parse::<PropKey>().is_err());
    }

    #[test]
    fn prop_keys_serialize_as_strings() {
        let json = serde_json::to_string(&PropKey::clicks("btn-10")).unwrap();
        assert_eq!(json, r#""btn-10.n_clicks""#);
        let key: PropKey = serde_json::from_str(r#""from-year.value""#).unwrap();
        assert_eq!(key, PropKey::value(ids::FROM_YEAR));
        assert!(serde_json::from_str::<PropKey>(r#""broken""#).is_err());
    }

    #[test]
    fn preset_ids_round_trip() {
        assert_eq!(ids::preset_button(30), "btn-30");
        assert_eq!(ids::preset_span("btn-30"), Some(30));
        assert_eq!(ids::preset_span("from-year"), None);
        assert_eq!(ids::preset_span("btn-x"), None);
    }

    #[test]
    fn dispatch_request_values_default_to_empty() {
        let request: DispatchRequest =
            serde_json::from_str(r#"{ "trigger": "btn-10.n_clicks" }"#).unwrap();
        assert_eq!(request.trigger, PropKey::clicks("btn-10"));
        assert!(request.values.is_empty());
    }

    #[test]
    fn figures_use_the_dark_theme_and_camel_case() {
        let value = serde_json::to_value(Figure::default()).unwrap();
        assert_eq!(value["theme"]["paperBgcolor"], "#2a2a2a");
        assert_eq!(value["theme"]["fontColor"], "white");
        assert_eq!(value["axesVisible"], false);
        assert!(value.get("title").is_none());
        assert_eq!(serde_json::to_value(LineStyle::Dash).unwrap(), "dash");
    }
}
