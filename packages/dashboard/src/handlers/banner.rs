//! Callback error banner.

use carbon_dash_dashboard_models::{PropKey, ids};
use serde_json::{Value, json};

use crate::DashboardError;
use crate::context::AppContext;
use crate::registry::{CallbackContext, CallbackSpec, Outputs, no_update};

#[must_use]
pub fn dismiss_error_spec() -> CallbackSpec {
    CallbackSpec::new("dismiss_error", dismiss_error)
        .input(PropKey::clicks(ids::DISMISS_BUTTON))
        .output(PropKey::style(ids::ERROR_BANNER))
        .prevent_initial_call()
}

/// Hides the banner once the dismiss button has been clicked.
///
/// # Errors
///
/// This handler does not fail.
pub fn dismiss_error(_: &AppContext, cb: &CallbackContext<'_>) -> Result<Outputs, DashboardError> {
    let clicked = match cb.get(&PropKey::clicks(ids::DISMISS_BUTTON)) {
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n > 0.0),
        Some(Value::Bool(b)) => *b,
        _ => false,
    };

    if clicked {
        Ok(vec![Some(json!({ "display": "none" }))])
    } else {
        Ok(no_update(1))
    }
}
