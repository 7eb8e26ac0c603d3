//! Observer trait for pipeline stage events.
//!
//! Pass an [`Arc<dyn PipelineObserver>`] to
//! [`crate::evaluate::Evaluator::with_observer`] to be told when each stage
//! starts, when the pipeline fails and in which stage, and when it completes.
//! The server uses this for metrics-style logging; tests use it to check stage
//! order.
//!
//! # Example
//!
//! ```rust
//! use resume_ranker::{PipelineObserver, PipelineStage};
//! use std::sync::Mutex;
//!
//! #[derive(Default)]
//! struct Recorder {
//!     stages: Mutex<Vec<PipelineStage>>,
//! }
//!
//! impl PipelineObserver for Recorder {
//!     fn on_stage_start(&self, stage: PipelineStage) {
//!         self.stages.lock().unwrap().push(stage);
//!     }
//! }
//! ```

use crate::error::PipelineError;
use crate::output::PublishedReportRef;
use crate::pipeline::PipelineStage;
use std::sync::Arc;

/// Called by the evaluator as a document moves through the stages.
///
/// Implementations must be `Send + Sync`: one observer is shared by every
/// request the server handles. All methods default to no-ops.
pub trait PipelineObserver: Send + Sync {
    /// Called on every transition, including the final move to
    /// [`PipelineStage::Done`] or [`PipelineStage::Failed`].
    fn on_stage_start(&self, stage: PipelineStage) {
        let _ = stage;
    }

    /// Called once when the pipeline fails, before the move to
    /// [`PipelineStage::Failed`]. `stage` is the stage that was running.
    fn on_failed(&self, stage: PipelineStage, error: &PipelineError) {
        let _ = (stage, error);
    }

    /// Called once after the move to [`PipelineStage::Done`].
    fn on_complete(&self, report: &PublishedReportRef) {
        let _ = report;
    }
}

/// A no-op observer; the default when none is configured.
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {}

/// Convenience alias for the shared observer handle.
pub type ObserverHandle = Arc<dyn PipelineObserver>;
