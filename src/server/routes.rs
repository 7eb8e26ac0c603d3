//! Request handlers.

use super::state::AppState;
use crate::error::{ErrorKind, PipelineError, QueryError};
use crate::query::{self, QueryRequest};
use axum::{
    body::Bytes,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
        Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{error, warn};

/// Multipart field holding the document.
pub const FILE_FIELD: &str = "file";

const UPLOAD_OK: &str = "File processed and report uploaded successfully";
const PROCESS_FAILED: &str = "Failed to process resume";
const QUERY_FAILED: &str = "Failed to execute query";

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: &'static str,
    #[serde(rename = "reportFileId")]
    pub report_file_id: String,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub results: Vec<Value>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
}

/// Error answered to the client: a status and a fixed message.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        let (status, message) = match e {
            PipelineError::MissingUpload | PipelineError::MalformedUpload { .. } => {
                (StatusCode::BAD_REQUEST, "No file uploaded")
            }
            PipelineError::EmptyUpload { .. } => (StatusCode::BAD_REQUEST, "Uploaded file is empty"),
            PipelineError::UploadTooLarge { .. } => {
                (StatusCode::PAYLOAD_TOO_LARGE, "Uploaded file is too large")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, PROCESS_FAILED),
        };
        Self { status, message }
    }
}

impl From<QueryError> for ApiError {
    fn from(e: QueryError) -> Self {
        let (status, message) = match e {
            QueryError::MissingFields => {
                (StatusCode::BAD_REQUEST, "Query and collectionName are required")
            }
            QueryError::InvalidCollection { .. } => {
                (StatusCode::BAD_REQUEST, "Invalid collection name")
            }
            QueryError::MalformedQuery { .. } => {
                (StatusCode::BAD_REQUEST, "Query must be a JSON object")
            }
            QueryError::Backend(_) => (StatusCode::INTERNAL_SERVER_ERROR, QUERY_FAILED),
        };
        Self { status, message }
    }
}

struct FilePart {
    name: String,
    content_type: Option<String>,
    data: Bytes,
}

/// Pull the `file` field out of the form. Other fields are ignored.
async fn read_file_part(mut multipart: Multipart) -> Result<FilePart, PipelineError> {
    while let Some(field) = multipart.next_field().await.map_err(upload_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let name = field.file_name().unwrap_or("").to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(upload_error)?;
        return Ok(FilePart {
            name,
            content_type,
            data,
        });
    }
    Err(PipelineError::MissingUpload)
}

/// A body cut off by `DefaultBodyLimit` surfaces as a 413 multipart error.
fn upload_error(e: MultipartError) -> PipelineError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        PipelineError::UploadTooLarge {
            detail: e.body_text(),
        }
    } else {
        PipelineError::MalformedUpload {
            detail: e.body_text(),
        }
    }
}

/// POST /upload-and-rank
pub async fn upload_and_rank(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ApiError> {
    let part = match multipart {
        Ok(m) => read_file_part(m).await,
        Err(rejection) => Err(PipelineError::MalformedUpload {
            detail: rejection.body_text(),
        }),
    }
    .inspect_err(|e| warn!("Rejected upload: {}", e))?;

    let _permit = state
        .upload_permits()
        .acquire()
        .await
        .map_err(|e| PipelineError::Internal(e.to_string()))?;

    let output = state
        .evaluator()
        .evaluate_bytes(&part.name, part.content_type.as_deref(), &part.data)
        .await
        .inspect_err(|e| {
            if e.kind() == ErrorKind::InputValidation {
                warn!("Rejected upload '{}': {}", part.name, e);
            }
        })?;

    Ok(Json(UploadResponse {
        message: UPLOAD_OK,
        report_file_id: output.report.id,
    }))
}

/// POST /execute-query
pub async fn execute_query(
    State(state): State<AppState>,
    body: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, ApiError> {
    let request = match body {
        Ok(Json(r)) => r,
        Err(rejection) => {
            warn!("Rejected query body: {}", rejection.body_text());
            return Err(QueryError::MissingFields.into());
        }
    };

    let results = query::execute_query(state.collections(), state.query_config(), request)
        .await
        .inspect_err(|e| {
            if e.is_client_error() {
                warn!("Rejected query: {}", e);
            } else {
                error!("Query failed: {}", e);
            }
        })?;

    Ok(Json(QueryResponse { results }))
}

/// GET /health
pub async fn health() -> &'static str {
    "OK"
}
