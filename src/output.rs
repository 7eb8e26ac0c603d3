//! Values produced by the pipeline stages and the final evaluation result.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tempfile::TempPath;

/// Plain text exported from the converted remote document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedText(pub String);

impl ExtractedText {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

/// The synthesized evaluation report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportDocument {
    pub content: String,
    pub generated_at: DateTime<Utc>,
}

/// A rendered PDF on local disk. The file is removed when this is dropped.
#[derive(Debug)]
pub struct RenderedArtifact {
    pub(crate) path: TempPath,
    pub bytes_written: u64,
}

impl RenderedArtifact {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Final path component, used as the published name.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "report.pdf".to_string())
    }

    /// Delete the file now, reporting any error.
    pub fn close(self) -> std::io::Result<()> {
        self.path.close()
    }
}

/// Identifier of the published report in remote storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublishedReportRef {
    pub id: String,
}

/// Result of one successful evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationOutput {
    pub report: PublishedReportRef,
    pub stats: EvaluationStats,
}

/// Timing and size figures for one evaluation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvaluationStats {
    /// Characters of text exported from the converted document.
    pub extracted_chars: usize,
    /// Characters in the normalised report.
    pub report_chars: usize,
    /// Size of the rendered PDF.
    pub artifact_bytes: u64,
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    /// Upload + convert + export.
    pub extraction_duration_ms: u64,
    pub synthesis_duration_ms: u64,
    pub render_duration_ms: u64,
    pub publish_duration_ms: u64,
    pub total_duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_only_text_counts_as_empty() {
        assert!(ExtractedText(" \n\t ".into()).is_empty());
        assert!(!ExtractedText("Jane Doe".into()).is_empty());
    }

    #[test]
    fn stats_serialise_to_json() {
        let out = EvaluationOutput {
            report: PublishedReportRef { id: "abc".into() },
            stats: EvaluationStats {
                extracted_chars: 10,
                ..Default::default()
            },
        };
        let json = serde_json::to_value(&out).unwrap();
        assert_eq!(json["report"]["id"], "abc");
        assert_eq!(json["stats"]["extracted_chars"], 10);
    }
}
