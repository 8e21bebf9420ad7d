//! Observer trait for per-stage pipeline events.
//!
//! Attach an [`Arc<dyn PipelineObserver>`] with
//! [`crate::Pipeline::with_observer`] to follow a run as it moves through
//! its stages: drive a spinner, record timings, or forward events elsewhere.
//!
//! # Example
//!
//! ```rust
//! use pdf_questions::{PipelineObserver, Stage};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Default)]
//! struct Recorder {
//!     started: Mutex<Vec<Stage>>,
//! }
//!
//! impl PipelineObserver for Recorder {
//!     fn on_stage_start(&self, stage: Stage) {
//!         self.started.lock().unwrap().push(stage);
//!     }
//! }
//!
//! let observer: Arc<dyn PipelineObserver> = Arc::new(Recorder::default());
//! ```

use crate::output::{PipelineState, Stage};
use std::sync::Arc;

/// Called by the runner as a run progresses.
///
/// All methods default to no-ops so implementors override only what they
/// need. Implementations must be `Send + Sync`; one observer may be shared
/// by concurrent runs.
pub trait PipelineObserver: Send + Sync {
    /// Called on every state change, before the new stage starts.
    fn on_transition(&self, from: PipelineState, to: PipelineState) {
        let _ = (from, to);
    }

    /// Called just before a stage does its work.
    fn on_stage_start(&self, stage: Stage) {
        let _ = stage;
    }

    /// Called when a stage succeeds.
    ///
    /// `summary` is a short human-readable description of its output,
    /// e.g. `"2215304 bytes"` or `"8 questions"`.
    fn on_stage_complete(&self, stage: Stage, summary: &str) {
        let _ = (stage, summary);
    }

    /// Called when a stage fails, whether or not the failure is fatal.
    fn on_stage_failed(&self, stage: Stage, error: &str) {
        let _ = (stage, error);
    }
}

/// Shared observer handle.
pub type Observer = Arc<dyn PipelineObserver>;

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}
