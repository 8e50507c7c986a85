//! Progress reporting for page extraction.
//!
//! [`ProgressCallback`] decouples the pipeline from any rendering backend.
//! The CLI renders it with `indicatif`; library callers and tests can use
//! [`null_progress`].

use std::sync::Arc;

/// Receives page-level progress from a conversion.
pub trait ProgressCallback: Send + Sync {
    /// Set the total number of pages once it is known.
    fn set_total(&self, total: u64);

    /// Set the number of pages processed so far.
    fn set_position(&self, pos: u64);

    /// Update the message displayed alongside the progress indicator.
    fn set_message(&self, msg: String);

    /// Mark progress as complete with a final message.
    fn finish(&self, msg: String);
}

/// A [`ProgressCallback`] that ignores all updates.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn set_position(&self, _pos: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`] instance.
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
