//! # resume-ranker
//!
//! Evaluate uploaded resumes with a generative-text model and publish the
//! result as a PDF report.
//!
//! ## Why route the document through remote storage?
//!
//! Resumes arrive as PDFs, scans and word-processor files. Instead of
//! carrying a parser for each, the document is uploaded to a Drive-style
//! object store and copied to the store's native document type, which makes
//! the remote side run OCR and text extraction. The text is then exported
//! and scored against a fixed rubric by an LLM.
//!
//! ## Pipeline Overview
//!
//! ```text
//! upload
//!  │
//!  ├─ 1. Ingest      write the bytes to a scoped transient file
//!  ├─ 2. Extract     create → copy (OCR) → export text/plain
//!  ├─ 3. Synthesize  rubric prompt → first candidate
//!  ├─ 4. Polish      make the report printable with a built-in PDF font
//!  ├─ 5. Render      printpdf on the blocking pool, await the finish signal
//!  ├─ 6. Publish     create the PDF in the report folder
//!  └─ 7. Cleanup     delete both transient files
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use resume_ranker::store::{DriveAuth, DriveClient};
//! use resume_ranker::{EvaluationConfig, Evaluator, LlmTextGenerator, PdfSink};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EvaluationConfig::builder()
//!         .report_folder("1AbCdEf")
//!         .build()?;
//!     let auth = Arc::new(DriveAuth::static_token("ya29..."));
//!     let store = Arc::new(DriveClient::new(reqwest::Client::new(), auth));
//!     // Provider auto-detected from OPENAI_API_KEY / ANTHROPIC_API_KEY / GEMINI_API_KEY
//!     let generator = Arc::new(LlmTextGenerator::from_config(&config)?);
//!
//!     let evaluator = Evaluator::new(store, generator, Arc::new(PdfSink), config);
//!     let bytes = std::fs::read("cv.pdf")?;
//!     let output = evaluator.evaluate_bytes("cv.pdf", None, &bytes).await?;
//!     println!("report: {}", output.report.id);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature  | Default | Description |
//! |----------|---------|-------------|
//! | `server` | on      | HTTP server, MongoDB query store and the `resume-ranker` binary |
//!
//! Disable `server` when embedding only the pipeline:
//! ```toml
//! resume-ranker = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod evaluate;
pub mod output;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod provider;
pub mod query;
#[cfg(feature = "server")]
pub mod server;
pub mod store;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{
    CollectionPolicy, EvaluationConfig, EvaluationConfigBuilder, PageLayout, QueryConfig,
};
pub use error::{ErrorKind, PipelineError, QueryError, StoreOperation};
pub use evaluate::Evaluator;
pub use output::{
    EvaluationOutput, EvaluationStats, ExtractedText, PublishedReportRef, RenderedArtifact,
    ReportDocument,
};
pub use pipeline::render::{DocumentSink, PdfSink, RenderRequest, WriteCompletion};
pub use pipeline::PipelineStage;
pub use progress::{NoopObserver, ObserverHandle, PipelineObserver};
pub use provider::{Completion, CompletionRequest, LlmTextGenerator, TextGenerator};
pub use query::{execute_query, CollectionStore, QueryRequest};
pub use store::{ObjectMetadata, ObjectStore, RemoteFileRef};
