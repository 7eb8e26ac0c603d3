//! Pipeline stages for resume evaluation.
//!
//! Each submodule implements exactly one step, so each can be tested on its
//! own with fake collaborators.
//!
//! ## Data Flow
//!
//! ```text
//! ingest ──▶ extract ──────────────────▶ llm ──▶ postprocess ──▶ render ──▶ publish
//! (temp file) (create → copy → export)   (LLM)   (text cleanup)  (PDF)     (create)
//! ```
//!
//! 1. [`ingest`]      — write the uploaded bytes to a scoped transient file
//! 2. [`extract`]     — upload, convert (OCR) and export as plain text
//! 3. [`llm`]         — build the rubric prompt and take the first candidate
//! 4. [`postprocess`] — make the report safe for the PDF's built-in font
//! 5. [`render`]      — write the PDF off the executor and await its signal
//! 6. [`publish`]     — upload the PDF and return its reference

pub mod extract;
pub mod font;
pub mod ingest;
pub mod llm;
pub mod postprocess;
pub mod publish;
pub mod render;

use serde::Serialize;
use std::fmt;

/// Where a pipeline invocation currently is.
///
/// `Idle → Uploading → Converting → Extracting → Synthesizing → Rendering →
/// Publishing → CleaningUp → Done`, or `Failed` from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Idle,
    Uploading,
    Converting,
    Extracting,
    Synthesizing,
    Rendering,
    Publishing,
    CleaningUp,
    Done,
    Failed,
}

impl PipelineStage {
    /// The stage that follows this one on the success path.
    pub fn next(self) -> Option<PipelineStage> {
        use PipelineStage::*;
        match self {
            Idle => Some(Uploading),
            Uploading => Some(Converting),
            Converting => Some(Extracting),
            Extracting => Some(Synthesizing),
            Synthesizing => Some(Rendering),
            Rendering => Some(Publishing),
            Publishing => Some(CleaningUp),
            CleaningUp => Some(Done),
            Done | Failed => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PipelineStage::Done | PipelineStage::Failed)
    }

    pub fn as_str(self) -> &'static str {
        use PipelineStage::*;
        match self {
            Idle => "idle",
            Uploading => "uploading",
            Converting => "converting",
            Extracting => "extracting",
            Synthesizing => "synthesizing",
            Rendering => "rendering",
            Publishing => "publishing",
            CleaningUp => "cleaning_up",
            Done => "done",
            Failed => "failed",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_path_walks_every_stage_once() {
        let mut stage = PipelineStage::Idle;
        let mut seen = vec![stage];
        while let Some(next) = stage.next() {
            seen.push(next);
            stage = next;
        }
        assert_eq!(seen.len(), 9);
        assert_eq!(stage, PipelineStage::Done);
        assert!(!seen.contains(&PipelineStage::Failed));
    }

    #[test]
    fn terminal_states_have_no_successor() {
        assert!(PipelineStage::Failed.next().is_none());
        assert!(PipelineStage::Done.is_terminal());
        assert!(!PipelineStage::Rendering.is_terminal());
    }

    #[test]
    fn display_is_snake_case() {
        assert_eq!(PipelineStage::CleaningUp.to_string(), "cleaning_up");
    }
}
