//! Remote object storage.
//!
//! The pipeline talks to storage only through [`ObjectStore`]. The store is
//! used twice: as a blob store for the upload and the published report, and
//! as the converter, because copying an object to a document type makes the
//! remote side run OCR on it.
//!
//! [`drive::DriveClient`] is the production implementation; tests supply
//! in-memory fakes.

pub mod auth;
pub mod drive;

use crate::error::PipelineError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use auth::DriveAuth;
pub use drive::DriveClient;

/// Reference to an object held by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteFileRef {
    pub id: String,
    #[serde(default)]
    pub mime_type: String,
}

/// Metadata sent with a new object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub name: String,
    pub parent_folder: Option<String>,
    pub mime_type: String,
}

/// Remote object store: create, convert-by-copy, export.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` as a new object and return its reference.
    async fn create(
        &self,
        bytes: Vec<u8>,
        metadata: &ObjectMetadata,
    ) -> Result<RemoteFileRef, PipelineError>;

    /// Copy `object_id` into a new object of `target_mime`.
    async fn copy(
        &self,
        object_id: &str,
        target_mime: &str,
        parent_folder: Option<&str>,
    ) -> Result<RemoteFileRef, PipelineError>;

    /// Export `object_id` in `mime_type` and return it as text.
    async fn export(&self, object_id: &str, mime_type: &str) -> Result<String, PipelineError>;
}
