//! Error types for the resume-ranker library.
//!
//! Two error types reflect the two request surfaces:
//!
//! * [`PipelineError`] — anything that stops a document evaluation. Every
//!   variant is tagged with an [`ErrorKind`] so logs and tests can tell an
//!   input problem from a remote-service failure or a render failure, while
//!   the HTTP layer still answers with one generic message.
//!
//! * [`QueryError`] — validation and backend failures of the collection
//!   query passthrough.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of a [`PipelineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The caller sent something unusable (no file, empty file, no text).
    InputValidation,
    /// The object store, the conversion step or the generative-text call failed.
    ExternalService,
    /// The report could not be written to a PDF.
    Render,
    /// Local I/O or task failures outside the three categories above.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::InputValidation => "input_validation",
            ErrorKind::ExternalService => "external_service",
            ErrorKind::Render => "render",
            ErrorKind::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// All errors returned by the evaluation pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The multipart request carried no `file` field.
    #[error("No file uploaded")]
    MissingUpload,

    /// The `file` field was present but contained zero bytes.
    #[error("Uploaded file '{name}' is empty")]
    EmptyUpload { name: String },

    /// The multipart body itself could not be read.
    #[error("Malformed upload: {detail}")]
    MalformedUpload { detail: String },

    /// The request body went over the configured upload limit.
    #[error("Upload exceeds the body limit: {detail}")]
    UploadTooLarge { detail: String },

    /// Conversion succeeded but produced no text to evaluate.
    #[error("No text could be extracted from remote file '{file_id}'")]
    EmptyExtraction { file_id: String },

    // ── Remote object store ───────────────────────────────────────────────
    /// A create / copy / export call to the object store failed.
    #[error("Object store {operation} failed: {detail}")]
    RemoteStore {
        operation: StoreOperation,
        detail: String,
    },

    /// Obtaining an access token for the object store failed.
    #[error("Object store authentication failed: {detail}")]
    Auth { detail: String },

    // ── LLM errors ────────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// The LLM API returned an error.
    #[error("LLM API error: {message}")]
    LlmApiError { message: String },

    /// The LLM answered without a usable candidate.
    #[error("Generative-text service returned no candidates")]
    NoCandidates,

    // ── Render errors ─────────────────────────────────────────────────────
    /// The PDF writer reported an error.
    #[error("Failed to render report to '{path}': {detail}")]
    RenderFailed { path: PathBuf, detail: String },

    /// The PDF writer went away without reporting completion.
    #[error("Renderer for '{path}' stopped before signalling completion")]
    RenderAborted { path: PathBuf },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Reading or writing a transient local file failed.
    #[error("Local file error on '{path}': {source}")]
    LocalIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// Classify this error for logging and for the HTTP status mapping.
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::MissingUpload
            | PipelineError::EmptyUpload { .. }
            | PipelineError::MalformedUpload { .. }
            | PipelineError::UploadTooLarge { .. }
            | PipelineError::EmptyExtraction { .. }
            | PipelineError::InvalidConfig(_) => ErrorKind::InputValidation,
            PipelineError::RemoteStore { .. }
            | PipelineError::Auth { .. }
            | PipelineError::ProviderNotConfigured { .. }
            | PipelineError::LlmApiError { .. }
            | PipelineError::NoCandidates => ErrorKind::ExternalService,
            PipelineError::RenderFailed { .. } | PipelineError::RenderAborted { .. } => {
                ErrorKind::Render
            }
            PipelineError::LocalIo { .. } | PipelineError::Internal(_) => ErrorKind::Internal,
        }
    }

    pub(crate) fn store(operation: StoreOperation, detail: impl Into<String>) -> Self {
        PipelineError::RemoteStore {
            operation,
            detail: detail.into(),
        }
    }

    pub(crate) fn local_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::LocalIo {
            path: path.into(),
            source,
        }
    }
}

/// The object store call that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    Create,
    Copy,
    Export,
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StoreOperation::Create => "create",
            StoreOperation::Copy => "copy",
            StoreOperation::Export => "export",
        };
        f.write_str(s)
    }
}

/// Errors from the collection query passthrough.
#[derive(Debug, Error)]
pub enum QueryError {
    /// `query` or `collectionName` was missing or null.
    #[error("Query and collectionName are required")]
    MissingFields,

    /// `collectionName` is not on the allow-list.
    #[error("Invalid collection name")]
    InvalidCollection { name: String },

    /// `query` is not a JSON object, or uses a forbidden operator.
    #[error("Query must be a JSON object")]
    MalformedQuery { detail: String },

    /// The database call failed.
    #[error("Database error: {0}")]
    Backend(String),
}

impl QueryError {
    /// `true` when the caller sent a bad request, `false` for server faults.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, QueryError::Backend(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_upload_message_matches_http_contract() {
        assert_eq!(PipelineError::MissingUpload.to_string(), "No file uploaded");
    }

    #[test]
    fn kinds_cover_the_three_pipeline_categories() {
        assert_eq!(
            PipelineError::MissingUpload.kind(),
            ErrorKind::InputValidation
        );
        assert_eq!(
            PipelineError::NoCandidates.kind(),
            ErrorKind::ExternalService
        );
        assert_eq!(
            PipelineError::store(StoreOperation::Copy, "HTTP 500").kind(),
            ErrorKind::ExternalService
        );
        assert_eq!(
            PipelineError::RenderAborted {
                path: PathBuf::from("/tmp/r.pdf")
            }
            .kind(),
            ErrorKind::Render
        );
    }

    #[test]
    fn remote_store_display_names_operation() {
        let e = PipelineError::store(StoreOperation::Export, "HTTP 403");
        let msg = e.to_string();
        assert!(msg.contains("export"), "got: {msg}");
        assert!(msg.contains("HTTP 403"), "got: {msg}");
    }

    #[test]
    fn empty_extraction_is_input_validation() {
        let e = PipelineError::EmptyExtraction {
            file_id: "ocr-1".into(),
        };
        assert_eq!(e.kind(), ErrorKind::InputValidation);
        assert!(e.to_string().contains("ocr-1"));
    }

    #[test]
    fn query_error_messages_match_http_contract() {
        assert_eq!(
            QueryError::InvalidCollection {
                name: "invalid".into()
            }
            .to_string(),
            "Invalid collection name"
        );
        assert_eq!(
            QueryError::MissingFields.to_string(),
            "Query and collectionName are required"
        );
        assert!(QueryError::MissingFields.is_client_error());
        assert!(!QueryError::Backend("down".into()).is_client_error());
    }
}
