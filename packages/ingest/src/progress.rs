//! Progress reporting for file loads.
//!
//! Keeps the loader independent of any rendering backend; the CLI plugs in
//! `indicatif` spinners, the server and tests use [`NullProgress`].

/// Receives progress updates while a file is read.
pub trait ProgressCallback: Send + Sync {
    /// Update the message displayed alongside the progress indicator.
    fn set_message(&self, msg: String);

    /// Advance progress by `delta` rows.
    fn inc(&self, delta: u64);

    /// Mark progress as complete with a final message.
    fn finish(&self, msg: String);
}

/// Ignores all progress updates.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_message(&self, _msg: String) {}
    fn inc(&self, _delta: u64) {}
    fn finish(&self, _msg: String) {}
}
