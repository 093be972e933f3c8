//! Progress reporting for batch runs.
//!
//! [`run_extraction`](crate::run_extraction) reports one unit of work per
//! `(file, table)` pair through a [`ProgressCallback`]. Rendering lives
//! in the CLI crates; library callers and tests pass [`null_progress`].

use std::sync::Arc;

/// Receives progress from a batch run.
pub trait ProgressCallback: Send + Sync {
    /// Set the total expected units of work.
    fn set_total(&self, total: u64);

    /// Advance progress by `delta` units.
    fn inc(&self, delta: u64);

    /// Update the message shown next to the indicator.
    fn set_message(&self, msg: String);

    /// Mark progress as complete with a final message.
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

#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
