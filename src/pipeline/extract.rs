//! Remote conversion: upload → convert by copy → export as plain text.
//!
//! Each call depends on the identifier returned by the one before it. Any
//! failure aborts the whole step; there is no retry and no partial text.

use super::ingest::UploadedFile;
use super::PipelineStage;
use crate::config::EvaluationConfig;
use crate::error::PipelineError;
use crate::output::ExtractedText;
use crate::store::{ObjectMetadata, ObjectStore, RemoteFileRef};
use tracing::{debug, info};

/// Text export format requested from the store.
pub const TEXT_MIME: &str = "text/plain";

/// Upload `upload` to the store and return the text the conversion produced.
///
/// `on_stage` is told when the pipeline enters `Uploading`, `Converting` and
/// `Extracting`.
pub async fn extract_text(
    store: &dyn ObjectStore,
    upload: &UploadedFile,
    config: &EvaluationConfig,
    mut on_stage: impl FnMut(PipelineStage),
) -> Result<ExtractedText, PipelineError> {
    on_stage(PipelineStage::Uploading);
    let bytes = tokio::fs::read(upload.path())
        .await
        .map_err(|e| PipelineError::local_io(upload.path(), e))?;
    let metadata = ObjectMetadata {
        name: upload.original_name.clone(),
        parent_folder: config.upload_folder.clone(),
        mime_type: upload.mime_type.clone(),
    };
    let file: RemoteFileRef = store.create(bytes, &metadata).await?;
    info!("Uploaded '{}' as remote file {}", upload.original_name, file.id);

    on_stage(PipelineStage::Converting);
    let converted = store
        .copy(
            &file.id,
            &config.conversion_mime,
            config.upload_folder.as_deref(),
        )
        .await?;
    debug!("Converted {} → {} ({})", file.id, converted.id, config.conversion_mime);

    on_stage(PipelineStage::Extracting);
    let raw = store.export(&converted.id, TEXT_MIME).await?;
    let text = ExtractedText(strip_bom(raw));

    if text.is_empty() {
        return Err(PipelineError::EmptyExtraction {
            file_id: converted.id,
        });
    }

    info!("Extracted {} chars from {}", text.len(), converted.id);
    Ok(text)
}

fn strip_bom(mut s: String) -> String {
    if s.starts_with('\u{FEFF}') {
        s.drain(..'\u{FEFF}'.len_utf8());
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bom_is_removed_once() {
        assert_eq!(strip_bom("\u{FEFF}Jane".into()), "Jane");
        assert_eq!(strip_bom("Jane".into()), "Jane");
    }
}
