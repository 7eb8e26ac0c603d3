//! Evaluation entry points.
//!
//! [`Evaluator`] owns the collaborators for one deployment (object store,
//! text generator, PDF sink) and runs a single uploaded document through
//! every stage:
//!
//! ```text
//! Uploading → Converting → Extracting → Synthesizing → Rendering → Publishing → CleaningUp → Done
//! ```
//!
//! Any stage error moves the run to `Failed` and is returned as-is; nothing
//! later runs. Both transient files (the upload and the rendered PDF) are
//! removed on every exit path.

use crate::config::EvaluationConfig;
use crate::error::PipelineError;
use crate::output::{EvaluationOutput, EvaluationStats, PublishedReportRef, RenderedArtifact};
use crate::pipeline::ingest::{self, UploadedFile};
use crate::pipeline::render::DocumentSink;
use crate::pipeline::{extract, llm, postprocess, publish, render, PipelineStage};
use crate::progress::{NoopObserver, ObserverHandle};
use crate::provider::TextGenerator;
use crate::store::ObjectStore;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Runs uploaded documents through the evaluation pipeline.
///
/// Cheap to share: wrap in an `Arc` and call [`Evaluator::evaluate`] from as
/// many tasks as needed. Runs share no mutable state.
pub struct Evaluator {
    store: Arc<dyn ObjectStore>,
    generator: Arc<dyn TextGenerator>,
    sink: Arc<dyn DocumentSink>,
    config: EvaluationConfig,
    observer: ObserverHandle,
}

impl Evaluator {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        generator: Arc<dyn TextGenerator>,
        sink: Arc<dyn DocumentSink>,
        config: EvaluationConfig,
    ) -> Self {
        Self {
            store,
            generator,
            sink,
            config,
            observer: Arc::new(NoopObserver),
        }
    }

    /// Attach an observer for stage events.
    pub fn with_observer(mut self, observer: ObserverHandle) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &EvaluationConfig {
        &self.config
    }

    /// Write `bytes` to a transient file and evaluate it.
    ///
    /// Empty input is rejected with [`PipelineError::EmptyUpload`] before any
    /// remote call is made.
    pub async fn evaluate_bytes(
        &self,
        file_name: &str,
        declared_mime: Option<&str>,
        bytes: &[u8],
    ) -> Result<EvaluationOutput, PipelineError> {
        let upload = ingest::ingest(&self.config.work_dir, file_name, declared_mime, bytes).await?;
        self.evaluate(upload).await
    }

    /// Evaluate one uploaded document and publish its report.
    ///
    /// Takes ownership of `upload` so the local file is deleted when the run
    /// ends, whatever the outcome.
    pub async fn evaluate(&self, upload: UploadedFile) -> Result<EvaluationOutput, PipelineError> {
        let total_start = Instant::now();
        let mut stage = PipelineStage::Idle;
        info!(
            "Evaluating '{}' ({} bytes, {})",
            upload.original_name, upload.size, upload.mime_type
        );

        let (report, artifact, mut stats) = match self.run(&upload, &mut stage).await {
            Ok(done) => done,
            Err(e) => {
                error!(
                    stage = %stage,
                    kind = %e.kind(),
                    "Evaluation of '{}' failed: {}",
                    upload.original_name,
                    e
                );
                self.observer.on_failed(stage, &e);
                self.enter(&mut stage, PipelineStage::Failed);
                return Err(e);
            }
        };

        self.enter(&mut stage, PipelineStage::CleaningUp);
        if let Err(e) = artifact.close() {
            warn!("Failed to remove rendered report: {}", e);
        }
        if let Err(e) = upload.close() {
            warn!("Failed to remove uploaded file: {}", e);
        }

        self.enter(&mut stage, PipelineStage::Done);
        stats.total_duration_ms = total_start.elapsed().as_millis() as u64;
        info!(
            "Evaluation complete: report {} in {}ms",
            report.id, stats.total_duration_ms
        );
        self.observer.on_complete(&report);

        Ok(EvaluationOutput { report, stats })
    }

    async fn run(
        &self,
        upload: &UploadedFile,
        stage: &mut PipelineStage,
    ) -> Result<(PublishedReportRef, RenderedArtifact, EvaluationStats), PipelineError> {
        let mut stats = EvaluationStats::default();

        // ── Upload, convert, export ──────────────────────────────────────
        let t = Instant::now();
        let text = extract::extract_text(self.store.as_ref(), upload, &self.config, |next| {
            self.enter(stage, next)
        })
        .await?;
        stats.extraction_duration_ms = t.elapsed().as_millis() as u64;
        stats.extracted_chars = text.as_str().chars().count();

        // ── Synthesize ───────────────────────────────────────────────────
        self.enter(stage, PipelineStage::Synthesizing);
        let t = Instant::now();
        let (mut report, usage) =
            llm::synthesize_report(self.generator.as_ref(), &text, &self.config).await?;
        report.content = postprocess::clean_report(&report.content);
        stats.synthesis_duration_ms = t.elapsed().as_millis() as u64;
        stats.report_chars = report.content.chars().count();
        stats.prompt_tokens = usage.prompt_tokens;
        stats.completion_tokens = usage.completion_tokens;

        // ── Render ───────────────────────────────────────────────────────
        self.enter(stage, PipelineStage::Rendering);
        let t = Instant::now();
        let artifact = render::render_report(self.sink.as_ref(), &report, &self.config).await?;
        stats.render_duration_ms = t.elapsed().as_millis() as u64;
        stats.artifact_bytes = artifact.bytes_written;

        // ── Publish ──────────────────────────────────────────────────────
        self.enter(stage, PipelineStage::Publishing);
        let t = Instant::now();
        let published = publish::publish_report(self.store.as_ref(), &artifact, &self.config).await?;
        stats.publish_duration_ms = t.elapsed().as_millis() as u64;

        Ok((published, artifact, stats))
    }

    fn enter(&self, stage: &mut PipelineStage, next: PipelineStage) {
        debug!("Stage {} → {}", stage, next);
        *stage = next;
        self.observer.on_stage_start(next);
    }
}
