//! Progress reporting for batch projections.
//!
//! [`ProgressCallback`] decouples the engine from any rendering backend;
//! the CLI supplies an `indicatif` implementation, everything else uses
//! [`NullProgress`].

/// Receives progress updates from long-running projections.
pub trait ProgressCallback: Send + Sync {
    /// Sets the total number of units of work.
    fn set_total(&self, total: u64);

    /// Advances progress by `delta` units.
    fn inc(&self, delta: u64);

    /// Updates the message shown next to the indicator.
    fn set_message(&self, msg: String);

    /// Marks the work as complete.
    fn finish(&self, msg: String);
}

/// Ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}
