//! Explicit reactive callback registry.
//!
//! Each [`CallbackSpec`] declares the properties it reads and writes. A
//! dispatch runs every callback listening to the changed property, then
//! every callback listening to what those wrote, and so on. Each callback
//! runs at most once per dispatch.
//!
//! A failing callback never aborts the dispatch: its outputs are left
//! unchanged, the failure is reported in
//! [`DispatchResponse::errors`], and the error banner is shown.

use std::collections::{BTreeMap, VecDeque};

use carbon_dash_dashboard_models::{
    CallbackFailure, CallbackInfo, DispatchRequest, DispatchResponse, PropKey, ids,
};
use serde_json::{Value, json};

use crate::DashboardError;
use crate::context::AppContext;

/// One value per declared output; `None` leaves that output unchanged.
pub type Outputs = Vec<Option<Value>>;

/// Signature shared by every callback handler.
pub type Handler = fn(&AppContext, &CallbackContext<'_>) -> Result<Outputs, DashboardError>;

/// Outputs that leave all `count` properties unchanged.
#[must_use]
pub fn no_update(count: usize) -> Outputs {
    vec![None; count]
}

/// What a handler sees: the property that fired and the current value of
/// every known property.
#[derive(Debug, Clone, Copy)]
pub struct CallbackContext<'a> {
    trigger: Option<&'a PropKey>,
    values: &'a BTreeMap<String, Value>,
}

impl<'a> CallbackContext<'a> {
    /// Wraps a trigger and the current values.
    #[must_use]
    pub const fn new(trigger: Option<&'a PropKey>, values: &'a BTreeMap<String, Value>) -> Self {
        Self { trigger, values }
    }

    /// The property that fired, or `None` on the initial render.
    #[must_use]
    pub const fn trigger(&self) -> Option<&'a PropKey> {
        self.trigger
    }

    /// Element id of the property that fired.
    #[must_use]
    pub fn triggered_id(&self) -> Option<&'a str> {
        self.trigger.map(|key| key.id.as_str())
    }

    /// Current value of `key`; JSON `null` reads as absent.
    #[must_use]
    pub fn get(&self, key: &PropKey) -> Option<&'a Value> {
        self.values.get(&key.to_string()).filter(|v| !v.is_null())
    }

    /// String value of `key` as entered, including an empty string.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::InvalidValue`] if the value is not a
    /// string.
    pub fn raw_text(&self, key: &PropKey) -> Result<Option<&'a str>, DashboardError> {
        match self.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(invalid(key, format!("expected text, got {other}"))),
        }
    }

    /// Non-empty string value of `key`.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::InvalidValue`] if the value is not a
    /// string.
    pub fn text(&self, key: &PropKey) -> Result<Option<&'a str>, DashboardError> {
        Ok(self.raw_text(key)?.filter(|s| !s.trim().is_empty()))
    }

    /// Year value of `key`, given either as a JSON number or a numeric
    /// string.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::InvalidValue`] if the value is not a
    /// whole number within `i32` range.
    pub fn year(&self, key: &PropKey) -> Result<Option<i32>, DashboardError> {
        let raw = match self.get(key) {
            None => return Ok(None),
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::String(s)) if s.trim().is_empty() => return Ok(None),
            Some(Value::String(s)) => s.trim().to_string(),
            Some(other) => return Err(invalid(key, format!("expected a year, got {other}"))),
        };

        let whole = raw.strip_suffix(".0").unwrap_or(&raw);
        whole
            .parse::<i32>()
            .map(Some)
            .map_err(|_| invalid(key, format!("'{raw}' is not a whole year")))
    }

    /// List-of-strings value of `key`; absent reads as empty.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::InvalidValue`] if the value is not an
    /// array of strings.
    pub fn strings(&self, key: &PropKey) -> Result<Vec<&'a str>, DashboardError> {
        match self.get(key) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .ok_or_else(|| invalid(key, format!("expected text items, got {item}")))
                })
                .collect(),
            Some(other) => Err(invalid(key, format!("expected a list, got {other}"))),
        }
    }
}

fn invalid(key: &PropKey, message: String) -> DashboardError {
    DashboardError::InvalidValue {
        key: key.to_string(),
        message,
    }
}

/// A registered callback.
#[derive(Debug, Clone)]
pub struct CallbackSpec {
    /// Unique name, used in logs and error reports.
    pub name: String,
    /// Properties that trigger the callback.
    pub inputs: Vec<PropKey>,
    /// Properties the callback writes, in handler output order.
    pub outputs: Vec<PropKey>,
    /// Whether the callback is skipped on the initial render.
    pub prevent_initial_call: bool,
    /// The handler itself.
    pub handler: Handler,
}

impl CallbackSpec {
    /// Creates a callback with no inputs or outputs yet.
    #[must_use]
    pub fn new(name: impl Into<String>, handler: Handler) -> Self {
        Self {
            name: name.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            prevent_initial_call: false,
            handler,
        }
    }

    #[must_use]
    pub fn input(mut self, key: PropKey) -> Self {
        self.inputs.push(key);
        self
    }

    #[must_use]
    pub fn inputs(mut self, keys: impl IntoIterator<Item = PropKey>) -> Self {
        self.inputs.extend(keys);
        self
    }

    #[must_use]
    pub fn output(mut self, key: PropKey) -> Self {
        self.outputs.push(key);
        self
    }

    #[must_use]
    pub fn outputs(mut self, keys: impl IntoIterator<Item = PropKey>) -> Self {
        self.outputs.extend(keys);
        self
    }

    /// Skips the callback on the initial render.
    #[must_use]
    pub const fn prevent_initial_call(mut self) -> Self {
        self.prevent_initial_call = true;
        self
    }

    /// Declared shape, without the handler.
    #[must_use]
    pub fn info(&self) -> CallbackInfo {
        CallbackInfo {
            name: self.name.clone(),
            inputs: self.inputs.clone(),
            outputs: self.outputs.clone(),
            prevent_initial_call: self.prevent_initial_call,
        }
    }
}

/// Ordered set of callbacks. Every output property has exactly one
/// owner.
#[derive(Debug, Default)]
pub struct CallbackRegistry {
    callbacks: Vec<CallbackSpec>,
    owners: BTreeMap<PropKey, usize>,
    error_text: String,
}

impl CallbackRegistry {
    /// Creates an empty registry whose error banner text starts with
    /// `error_text`.
    #[must_use]
    pub fn new(error_text: impl Into<String>) -> Self {
        Self {
            error_text: error_text.into(),
            ..Self::default()
        }
    }

    /// Adds a callback.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::DuplicateOutput`] if another callback
    /// already writes one of its outputs.
    pub fn register(&mut self, spec: CallbackSpec) -> Result<(), DashboardError> {
        for key in &spec.outputs {
            if let Some(owner) = self.owners.get(key) {
                return Err(DashboardError::DuplicateOutput {
                    key: key.to_string(),
                    callback: spec.name.clone(),
                    owner: self.callbacks[*owner].name.clone(),
                });
            }
        }

        let index = self.callbacks.len();
        for key in &spec.outputs {
            self.owners.insert(key.clone(), index);
        }
        log::debug!(
            "Registered callback '{}' ({} inputs, {} outputs)",
            spec.name,
            spec.inputs.len(),
            spec.outputs.len()
        );
        self.callbacks.push(spec);
        Ok(())
    }

    /// Registered callbacks in registration order.
    #[must_use]
    pub fn callbacks(&self) -> &[CallbackSpec] {
        &self.callbacks
    }

    /// Declared shape of every callback.
    #[must_use]
    pub fn describe(&self) -> Vec<CallbackInfo> {
        self.callbacks.iter().map(CallbackSpec::info).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Handles one user interaction.
    #[must_use]
    pub fn dispatch(&self, ctx: &AppContext, request: DispatchRequest) -> DispatchResponse {
        log::debug!("Dispatching {}", request.trigger);

        let mut state = request.values;
        let mut response = DispatchResponse::default();
        let mut ran = vec![false; self.callbacks.len()];
        let mut queue = VecDeque::from([request.trigger]);

        while let Some(key) = queue.pop_front() {
            for (index, spec) in self.callbacks.iter().enumerate() {
                if ran[index] || !spec.inputs.contains(&key) {
                    continue;
                }
                ran[index] = true;
                queue.extend(self.run(spec, ctx, Some(&key), &mut state, &mut response));
            }
        }

        response
    }

    /// Runs every callback not marked `prevent_initial_call`, in
    /// registration order, starting from `values`. Outputs of earlier
    /// callbacks are visible to later ones.
    #[must_use]
    pub fn initial(
        &self,
        ctx: &AppContext,
        values: BTreeMap<String, Value>,
    ) -> DispatchResponse {
        let mut state = values;
        let mut response = DispatchResponse::default();

        for spec in self.callbacks.iter().filter(|s| !s.prevent_initial_call) {
            self.run(spec, ctx, None, &mut state, &mut response);
        }

        response
    }

    /// Runs one callback, applying its outputs to `state` and `response`.
    /// Returns the properties it changed.
    fn run(
        &self,
        spec: &CallbackSpec,
        ctx: &AppContext,
        trigger: Option<&PropKey>,
        state: &mut BTreeMap<String, Value>,
        response: &mut DispatchResponse,
    ) -> Vec<PropKey> {
        log::trace!("Running callback '{}'", spec.name);

        let cb = CallbackContext::new(trigger, state);
        let result = (spec.handler)(ctx, &cb).and_then(|outputs| {
            if outputs.len() == spec.outputs.len() {
                Ok(outputs)
            } else {
                Err(DashboardError::OutputArity {
                    callback: spec.name.clone(),
                    expected: spec.outputs.len(),
                    actual: outputs.len(),
                })
            }
        });

        match result {
            Ok(outputs) => {
                let mut changed = Vec::new();
                for (key, value) in spec.outputs.iter().zip(outputs) {
                    if let Some(value) = value {
                        state.insert(key.to_string(), value.clone());
                        response.updates.insert(key.to_string(), value);
                        changed.push(key.clone());
                    }
                }
                changed
            }
            Err(err) => {
                log::error!("Callback '{}' failed: {err}", spec.name);
                response.errors.push(CallbackFailure {
                    callback: spec.name.clone(),
                    message: err.to_string(),
                });
                response.updates.insert(
                    PropKey::style(ids::ERROR_BANNER).to_string(),
                    json!({ "display": "block" }),
                );
                response.updates.insert(
                    PropKey::children(ids::ERROR_TEXT).to_string(),
                    json!(format!("{}: {err}", self.error_text)),
                );
                Vec::new()
            }
        }
    }
}
