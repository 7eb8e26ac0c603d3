//! Publication: upload the rendered PDF into the report folder.

use crate::config::EvaluationConfig;
use crate::error::PipelineError;
use crate::output::{PublishedReportRef, RenderedArtifact};
use crate::store::{ObjectMetadata, ObjectStore};
use tracing::info;

/// MIME type of the rendered report.
pub const PDF_MIME: &str = "application/pdf";

/// Upload `artifact` and return the identifier of the stored report.
///
/// The published name is the artifact's local file name.
pub async fn publish_report(
    store: &dyn ObjectStore,
    artifact: &RenderedArtifact,
    config: &EvaluationConfig,
) -> Result<PublishedReportRef, PipelineError> {
    let bytes = tokio::fs::read(artifact.path())
        .await
        .map_err(|e| PipelineError::local_io(artifact.path(), e))?;

    let metadata = ObjectMetadata {
        name: artifact.file_name(),
        parent_folder: config.report_folder.clone(),
        mime_type: PDF_MIME.to_string(),
    };
    let file = store.create(bytes, &metadata).await?;

    info!("Published report '{}' as {}", metadata.name, file.id);
    Ok(PublishedReportRef { id: file.id })
}
