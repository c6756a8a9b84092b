//! Reactive handlers of the dashboard page.
//!
//! | Callback | Module |
//! |---|---|
//! | `highlight_presets`, `preset_from_year` | [`range`] |
//! | `emission_graph`, `fuel_graphs` | [`emissions`] |
//! | `projection_graph` | [`projection`] |
//! | `dismiss_error` | [`banner`] |

pub mod banner;
pub mod emissions;
pub mod projection;
pub mod range;

use crate::DashboardError;
use crate::config::DashboardConfig;
use crate::registry::CallbackRegistry;

/// Registry holding every dashboard callback.
///
/// # Errors
///
/// Returns [`DashboardError::DuplicateOutput`] if two callbacks claim the
/// same output, which only happens with duplicate preset spans.
pub fn default_registry(config: &DashboardConfig) -> Result<CallbackRegistry, DashboardError> {
    let spans = &config.controls.preset_spans;
    let mut registry = CallbackRegistry::new(config.controls.error_text.clone());

    registry.register(range::highlight_presets_spec(spans))?;
    registry.register(range::preset_from_year_spec(spans))?;
    registry.register(emissions::emission_graph_spec())?;
    registry.register(emissions::fuel_graphs_spec())?;
    registry.register(projection::projection_graph_spec())?;
    registry.register(banner::dismiss_error_spec())?;

    log::info!("Registered {} callbacks", registry.len());
    Ok(registry)
}
