//! Ingestion: turn uploaded bytes into a transient local file.
//!
//! The file lives in a [`tempfile::TempPath`], so it is removed when the
//! [`UploadedFile`] is dropped on any exit path, including early returns
//! and panics. Names are random, so concurrent requests never collide.

use crate::error::PipelineError;
use std::path::Path;
use tempfile::TempPath;
use tracing::debug;

/// Fallback name when the client sent none.
const DEFAULT_NAME: &str = "upload";

/// An uploaded document held on local disk for one request.
#[derive(Debug)]
pub struct UploadedFile {
    path: TempPath,
    pub original_name: String,
    pub mime_type: String,
    pub size: u64,
}

impl UploadedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file now, reporting any error.
    pub fn close(self) -> std::io::Result<()> {
        self.path.close()
    }
}

/// Keep only the final path component of a client-supplied filename.
pub fn sanitize_file_name(name: &str) -> String {
    let last = name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or("")
        .trim()
        .trim_matches('.');
    if last.is_empty() {
        DEFAULT_NAME.to_string()
    } else {
        last.to_string()
    }
}

/// Use the declared MIME type, or guess it from the file extension.
pub fn resolve_mime(file_name: &str, declared: Option<&str>) -> String {
    match declared.map(str::trim) {
        Some(m) if !m.is_empty() && m != "application/octet-stream" => m.to_string(),
        _ => mime_guess::from_path(file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string(),
    }
}

/// Write `bytes` to a fresh transient file inside `work_dir`.
pub async fn ingest(
    work_dir: &Path,
    original_name: &str,
    declared_mime: Option<&str>,
    bytes: &[u8],
) -> Result<UploadedFile, PipelineError> {
    let original_name = sanitize_file_name(original_name);
    if bytes.is_empty() {
        return Err(PipelineError::EmptyUpload {
            name: original_name,
        });
    }
    let mime_type = resolve_mime(&original_name, declared_mime);

    let suffix = Path::new(&original_name)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let path = tempfile::Builder::new()
        .prefix("upload-")
        .suffix(&suffix)
        .tempfile_in(work_dir)
        .map_err(|e| PipelineError::local_io(work_dir, e))?
        .into_temp_path();

    tokio::fs::write(&path, bytes)
        .await
        .map_err(|e| PipelineError::local_io(path.to_path_buf(), e))?;

    debug!(
        "Ingested '{}' ({} bytes, {}) at {}",
        original_name,
        bytes.len(),
        mime_type,
        path.display()
    );

    Ok(UploadedFile {
        path,
        original_name,
        mime_type,
        size: bytes.len() as u64,
    })
}
