//! PDF rendering: lay the report out on pages and write it to disk.
//!
//! ## Why an explicit completion signal?
//!
//! `printpdf` is synchronous and the final flush of the file can fail after
//! every page was laid out. The write runs on the blocking pool and reports
//! back through a one-shot channel; [`WriteCompletion::finished`] resolves
//! only when the writer says the file was flushed and synced. A write error,
//! or a writer that disappears without reporting, fails the render.

use crate::config::{EvaluationConfig, PageLayout};
use crate::error::PipelineError;
use crate::output::{RenderedArtifact, ReportDocument};
use crate::pipeline::font::{glyph_width, text_width};
use printpdf::{BuiltinFont, Mm, PdfDocument};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tokio::sync::oneshot;
use tracing::{debug, info};

/// Everything a sink needs to write one document.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub path: PathBuf,
    pub title: String,
    pub text: String,
    pub layout: PageLayout,
}

/// Outcome reported by a writer: bytes on disk, or an error description.
pub type WriteResult = Result<u64, String>;

/// Pending completion of a document write.
pub struct WriteCompletion {
    path: PathBuf,
    rx: oneshot::Receiver<WriteResult>,
}

impl WriteCompletion {
    /// Create a completion handle and the sender the writer reports through.
    pub fn channel(path: impl Into<PathBuf>) -> (oneshot::Sender<WriteResult>, Self) {
        let (tx, rx) = oneshot::channel();
        (
            tx,
            Self {
                path: path.into(),
                rx,
            },
        )
    }

    /// Wait for the writer's finish or error signal.
    pub async fn finished(self) -> Result<u64, PipelineError> {
        match self.rx.await {
            Ok(Ok(bytes)) => Ok(bytes),
            Ok(Err(detail)) => Err(PipelineError::RenderFailed {
                path: self.path,
                detail,
            }),
            Err(_) => Err(PipelineError::RenderAborted { path: self.path }),
        }
    }
}

/// Document-render sink: starts a write and hands back its completion.
pub trait DocumentSink: Send + Sync {
    fn write(&self, request: RenderRequest) -> WriteCompletion;
}

/// [`DocumentSink`] producing a PDF with `printpdf`.
///
/// Must be called from within a Tokio runtime.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfSink;

impl DocumentSink for PdfSink {
    fn write(&self, request: RenderRequest) -> WriteCompletion {
        let (tx, completion) = WriteCompletion::channel(&request.path);
        tokio::task::spawn_blocking(move || {
            let result = write_pdf(&request).map_err(|e| e.to_string());
            // The receiver is gone only if the request was abandoned.
            let _ = tx.send(result);
        });
        completion
    }
}

#[derive(Debug, thiserror::Error)]
enum PdfWriteError {
    #[error("font: {0}")]
    Font(String),
    #[error("save: {0}")]
    Save(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Lay out `request.text` and write it, flushing and syncing before returning.
fn write_pdf(request: &RenderRequest) -> Result<u64, PdfWriteError> {
    let layout = &request.layout;
    let (width, height) = (Mm(layout.width_mm), Mm(layout.height_mm));
    let (doc, first_page, first_layer) = PdfDocument::new(&request.title, width, height, "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| PdfWriteError::Font(e.to_string()))?;

    let pages = paginate(&request.text, layout);
    let top = layout.height_mm - layout.margin_mm - layout.em_mm();
    let line_height = layout.line_height_mm();

    for (i, lines) in pages.iter().enumerate() {
        let (page, layer) = if i == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(width, height, "Layer 1")
        };
        let layer = doc.get_page(page).get_layer(layer);

        let mut y = top;
        for line in lines {
            if !line.is_empty() {
                layer.use_text(line.as_str(), layout.font_size_pt, Mm(layout.margin_mm), Mm(y), &font);
            }
            y -= line_height;
        }
    }

    let mut writer = BufWriter::new(File::create(&request.path)?);
    doc.save(&mut writer)
        .map_err(|e| PdfWriteError::Save(e.to_string()))?;
    // BufWriter swallows errors on drop; flush explicitly.
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    let bytes = file.metadata()?.len();

    debug!(
        "Wrote {} page(s), {} bytes to {}",
        pages.len(),
        bytes,
        request.path.display()
    );
    Ok(bytes)
}

/// Word-wrap `text` so no line is wider than `max_width`.
///
/// Widths are Helvetica advance widths in thousandths of an em, see
/// [`font`](crate::pipeline::font). Blank lines are kept; words wider than a
/// whole line are split.
pub fn wrap_lines(text: &str, max_width: u32) -> Vec<String> {
    let space = glyph_width(' ');
    let mut out = Vec::new();

    for paragraph in text.lines() {
        let mut indent: String = paragraph.chars().take_while(|c| *c == ' ').collect();
        if text_width(&indent) >= max_width / 2 {
            indent.clear();
        }
        let mut line = indent.clone();
        let mut width = text_width(&indent);
        let mut has_word = false;

        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            loop {
                let sep = if has_word { space } else { 0 };
                let word_width: u32 = word.iter().copied().map(glyph_width).sum();
                if width + sep + word_width <= max_width {
                    if has_word {
                        line.push(' ');
                    }
                    line.extend(word.iter());
                    width += sep + word_width;
                    has_word = true;
                    break;
                }
                if has_word {
                    out.push(std::mem::take(&mut line));
                    width = 0;
                    has_word = false;
                    continue;
                }
                // Word alone is too wide for a fresh line: hard-split it.
                let fit = word
                    .iter()
                    .scan(width, |w, c| {
                        *w += glyph_width(*c);
                        Some(*w)
                    })
                    .take_while(|w| *w <= max_width)
                    .count()
                    .max(1);
                let rest = word.split_off(fit.min(word.len()));
                line.extend(word.iter());
                out.push(std::mem::take(&mut line));
                width = 0;
                word = rest;
                if word.is_empty() {
                    break;
                }
            }
        }

        if has_word || paragraph.trim().is_empty() {
            out.push(line);
        }
    }

    out
}

/// Split wrapped lines into pages.
pub fn paginate(text: &str, layout: &PageLayout) -> Vec<Vec<String>> {
    let lines = wrap_lines(text, layout.line_width_units());
    let per_page = layout.lines_per_page();
    if lines.is_empty() {
        return vec![Vec::new()];
    }
    lines.chunks(per_page).map(|c| c.to_vec()).collect()
}

/// Render `report` to a fresh PDF in the configured work directory.
///
/// The file name combines a millisecond timestamp with a random suffix.
/// The returned artifact deletes the file when dropped; on error the
/// half-written file is removed before returning.
pub async fn render_report(
    sink: &dyn DocumentSink,
    report: &ReportDocument,
    config: &EvaluationConfig,
) -> Result<RenderedArtifact, PipelineError> {
    let path = fresh_report_path(&config.work_dir, report)?;

    let completion = sink.write(RenderRequest {
        path: path.to_path_buf(),
        title: format!(
            "Resume Evaluation {}",
            report.generated_at.format("%Y-%m-%d %H:%M UTC")
        ),
        text: report.content.clone(),
        layout: config.layout,
    });

    let bytes_written = completion.finished().await?;
    info!("Rendered report to {} ({} bytes)", path.display(), bytes_written);

    Ok(RenderedArtifact {
        path,
        bytes_written,
    })
}

fn fresh_report_path(work_dir: &Path, report: &ReportDocument) -> Result<tempfile::TempPath, PipelineError> {
    let prefix = format!("report-{}-", report.generated_at.timestamp_millis());
    tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".pdf")
        .tempfile_in(work_dir)
        .map(|f| f.into_temp_path())
        .map_err(|e| PipelineError::local_io(work_dir, e))
}
