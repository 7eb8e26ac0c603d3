//! Google Drive v3 implementation of [`ObjectStore`].
//!
//! | Operation | Endpoint |
//! |-----------|----------|
//! | create    | `POST upload/drive/v3/files?uploadType=multipart` |
//! | copy      | `POST drive/v3/files/{id}/copy` |
//! | export    | `GET drive/v3/files/{id}/export?mimeType=…` |
//!
//! The client is built once at startup and shared by every request; the
//! underlying `reqwest::Client` pools connections.

use super::{DriveAuth, ObjectMetadata, ObjectStore, RemoteFileRef};
use crate::error::{PipelineError, StoreOperation};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

pub const DRIVE_API_BASE: &str = "https://www.googleapis.com/drive/v3";
pub const DRIVE_UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";

const FIELDS: &str = "id,mimeType";

/// Drive REST client.
pub struct DriveClient {
    http: reqwest::Client,
    auth: Arc<DriveAuth>,
    api_base: String,
    upload_base: String,
}

impl DriveClient {
    pub fn new(http: reqwest::Client, auth: Arc<DriveAuth>) -> Self {
        Self {
            http,
            auth,
            api_base: DRIVE_API_BASE.to_string(),
            upload_base: DRIVE_UPLOAD_BASE.to_string(),
        }
    }

    /// Point the client at another host (e.g. a local emulator).
    pub fn with_base_urls(mut self, api_base: impl Into<String>, upload_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self.upload_base = upload_base.into().trim_end_matches('/').to_string();
        self
    }

    async fn bearer(&self) -> Result<String, PipelineError> {
        Ok(format!("Bearer {}", self.auth.access_token().await?))
    }
}

/// Build a `multipart/related` body: JSON metadata part, then the media part.
fn related_body(boundary: &str, metadata: &serde_json::Value, media_mime: &str, media: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(media.len() + 512);
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata.to_string().as_bytes());
    body.extend_from_slice(format!("\r\n--{boundary}\r\n").as_bytes());
    body.extend_from_slice(format!("Content-Type: {media_mime}\r\n\r\n").as_bytes());
    body.extend_from_slice(media);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

fn create_metadata(metadata: &ObjectMetadata) -> serde_json::Value {
    let mut m = json!({
        "name": metadata.name,
        "mimeType": metadata.mime_type,
    });
    if let Some(ref folder) = metadata.parent_folder {
        m["parents"] = json!([folder]);
    }
    m
}

fn copy_metadata(target_mime: &str, parent_folder: Option<&str>) -> serde_json::Value {
    let mut m = json!({ "mimeType": target_mime });
    if let Some(folder) = parent_folder {
        m["parents"] = json!([folder]);
    }
    m
}

/// Turn a non-2xx response into a store error carrying status and body.
async fn check_status(
    operation: StoreOperation,
    response: reqwest::Response,
) -> Result<reqwest::Response, PipelineError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(PipelineError::store(operation, format!("HTTP {status}: {body}")))
}

fn transport(operation: StoreOperation) -> impl FnOnce(reqwest::Error) -> PipelineError {
    move |e| PipelineError::store(operation, e.to_string())
}

#[async_trait]
impl ObjectStore for DriveClient {
    async fn create(
        &self,
        bytes: Vec<u8>,
        metadata: &ObjectMetadata,
    ) -> Result<RemoteFileRef, PipelineError> {
        let op = StoreOperation::Create;
        let boundary = format!("resume-ranker-{}", uuid::Uuid::new_v4().simple());
        let body = related_body(&boundary, &create_metadata(metadata), &metadata.mime_type, &bytes);
        debug!(
            "Drive create '{}' ({} bytes, {})",
            metadata.name,
            bytes.len(),
            metadata.mime_type
        );

        let response = self
            .http
            .post(format!("{}/files", self.upload_base))
            .query(&[("uploadType", "multipart"), ("fields", FIELDS), ("supportsAllDrives", "true")])
            .header(reqwest::header::AUTHORIZATION, self.bearer().await?)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={boundary}"),
            )
            .body(body)
            .send()
            .await
            .map_err(transport(op))?;

        check_status(op, response)
            .await?
            .json::<RemoteFileRef>()
            .await
            .map_err(transport(op))
    }

    async fn copy(
        &self,
        object_id: &str,
        target_mime: &str,
        parent_folder: Option<&str>,
    ) -> Result<RemoteFileRef, PipelineError> {
        let op = StoreOperation::Copy;
        debug!("Drive copy {} → {}", object_id, target_mime);

        let response = self
            .http
            .post(format!("{}/files/{}/copy", self.api_base, object_id))
            .query(&[("fields", FIELDS), ("supportsAllDrives", "true")])
            .header(reqwest::header::AUTHORIZATION, self.bearer().await?)
            .json(&copy_metadata(target_mime, parent_folder))
            .send()
            .await
            .map_err(transport(op))?;

        check_status(op, response)
            .await?
            .json::<RemoteFileRef>()
            .await
            .map_err(transport(op))
    }

    async fn export(&self, object_id: &str, mime_type: &str) -> Result<String, PipelineError> {
        let op = StoreOperation::Export;
        debug!("Drive export {} as {}", object_id, mime_type);

        let response = self
            .http
            .get(format!("{}/files/{}/export", self.api_base, object_id))
            .query(&[("mimeType", mime_type)])
            .header(reqwest::header::AUTHORIZATION, self.bearer().await?)
            .send()
            .await
            .map_err(transport(op))?;

        let bytes = check_status(op, response)
            .await?
            .bytes()
            .await
            .map_err(transport(op))?;

        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
