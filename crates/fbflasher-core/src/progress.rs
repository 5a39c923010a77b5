//! Progress reporting hooks
//!
//! The orchestrator reports what it is doing through [`FlashProgress`]. The
//! CLI renders these with a spinner; tests use [`NoProgress`].
//!
//! Implementations must not keep any session state. The orchestrator calls
//! [`FlashProgress::idle`] before every prompt, so a spinner never draws
//! while the operator is typing.

use crate::device::PartitionCategory;
use crate::partition::Resolution;

/// Callbacks for a flashing session
pub trait FlashProgress {
    /// A new stage of the procedure begins
    fn section(&mut self, title: &str);

    /// A group of blocking device commands is about to run
    fn busy(&mut self, message: &str);

    /// The current group of device commands finished (or a prompt is coming)
    fn idle(&mut self);

    /// A single partition target is being flashed
    fn flashing(&mut self, target: &str);

    /// Found/missing report for a category
    fn resolution(&mut self, category: PartitionCategory, resolution: &Resolution);

    /// Informational message for the operator
    fn note(&mut self, message: &str);

    /// Warning for the operator
    fn warn(&mut self, message: &str);
}

/// A no-op progress reporter
pub struct NoProgress;

impl FlashProgress for NoProgress {
    fn section(&mut self, _title: &str) {}
    fn busy(&mut self, _message: &str) {}
    fn idle(&mut self) {}
    fn flashing(&mut self, _target: &str) {}
    fn resolution(&mut self, _category: PartitionCategory, _resolution: &Resolution) {}
    fn note(&mut self, _message: &str) {}
    fn warn(&mut self, _message: &str) {}
}
