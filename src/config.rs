//! Configuration types for document evaluation.
//!
//! All pipeline behaviour is controlled through [`EvaluationConfig`], built
//! via its [`EvaluationConfigBuilder`]. The query passthrough has its own
//! [`QueryConfig`] carrying the collection allow-list.

use crate::error::PipelineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Google Docs MIME type; copying an object to it triggers OCR.
pub const GOOGLE_DOC_MIME: &str = "application/vnd.google-apps.document";

/// Configuration for a document evaluation.
///
/// Built via [`EvaluationConfig::builder()`] or using
/// [`EvaluationConfig::default()`].
///
/// # Example
/// ```rust
/// use resume_ranker::EvaluationConfig;
///
/// let config = EvaluationConfig::builder()
///     .model("gpt-4.1-mini")
///     .temperature(0.0)
///     .report_folder("1AbCdEf")
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct EvaluationConfig {
    /// LLM model identifier, e.g. "gpt-4.1-mini". If None, uses provider default.
    /// Bound when the provider is resolved, not per request.
    pub model: Option<String>,

    /// LLM provider name (e.g. "openai", "anthropic", "ollama").
    /// If None, the provider is auto-detected from the environment.
    pub provider_name: Option<String>,

    /// Sampling temperature. Default: 0.1.
    ///
    /// An evaluation should be reproducible: the same resume scored twice
    /// should land in the same band.
    pub temperature: f32,

    /// Maximum tokens the LLM may generate for one report. Default: 2048.
    pub max_tokens: usize,

    /// Custom system prompt. If None, uses the built-in rubric.
    pub system_prompt: Option<String>,

    /// Remote folder receiving the raw upload and its converted copy.
    pub upload_folder: Option<String>,

    /// Remote folder receiving the rendered report.
    pub report_folder: Option<String>,

    /// MIME type the raw upload is converted to before export.
    pub conversion_mime: String,

    /// Directory for transient uploads and rendered reports.
    /// Default: the system temp directory.
    pub work_dir: PathBuf,

    /// Page geometry and typography of the rendered report.
    pub layout: PageLayout,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            model: None,
            provider_name: None,
            temperature: 0.1,
            max_tokens: 2048,
            system_prompt: None,
            upload_folder: None,
            report_folder: None,
            conversion_mime: GOOGLE_DOC_MIME.to_string(),
            work_dir: std::env::temp_dir(),
            layout: PageLayout::default(),
        }
    }
}

impl fmt::Debug for EvaluationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvaluationConfig")
            .field("model", &self.model)
            .field("provider_name", &self.provider_name)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field(
                "system_prompt",
                &self.system_prompt.as_ref().map(|p| format!("<{} chars>", p.len())),
            )
            .field("upload_folder", &self.upload_folder)
            .field("report_folder", &self.report_folder)
            .field("conversion_mime", &self.conversion_mime)
            .field("work_dir", &self.work_dir)
            .field("layout", &self.layout)
            .finish()
    }
}

impl EvaluationConfig {
    /// Create a new builder for `EvaluationConfig`.
    pub fn builder() -> EvaluationConfigBuilder {
        EvaluationConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`EvaluationConfig`].
#[derive(Debug)]
pub struct EvaluationConfigBuilder {
    config: EvaluationConfig,
}

impl EvaluationConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    pub fn upload_folder(mut self, id: impl Into<String>) -> Self {
        self.config.upload_folder = Some(id.into());
        self
    }

    pub fn report_folder(mut self, id: impl Into<String>) -> Self {
        self.config.report_folder = Some(id.into());
        self
    }

    pub fn conversion_mime(mut self, mime: impl Into<String>) -> Self {
        self.config.conversion_mime = mime.into();
        self
    }

    pub fn work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.work_dir = dir.into();
        self
    }

    pub fn layout(mut self, layout: PageLayout) -> Self {
        self.config.layout = layout;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<EvaluationConfig, PipelineError> {
        let c = &self.config;
        if c.max_tokens == 0 {
            return Err(PipelineError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.conversion_mime.trim().is_empty() {
            return Err(PipelineError::InvalidConfig(
                "conversion MIME type must not be empty".into(),
            ));
        }
        c.layout.validate()?;
        Ok(self.config)
    }
}

/// Page geometry and typography for the rendered report.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    /// Page width in millimetres. Default: 210 (A4).
    pub width_mm: f32,
    /// Page height in millimetres. Default: 297 (A4).
    pub height_mm: f32,
    /// Margin on all four sides in millimetres. Default: 20.
    pub margin_mm: f32,
    /// Body font size in points. Default: 11.
    pub font_size_pt: f32,
    /// Line height as a multiple of the font size. Default: 1.4.
    pub line_spacing: f32,
}

impl Default for PageLayout {
    fn default() -> Self {
        Self {
            width_mm: 210.0,
            height_mm: 297.0,
            margin_mm: 20.0,
            font_size_pt: 11.0,
            line_spacing: 1.4,
        }
    }
}

const MM_PER_PT: f32 = 25.4 / 72.0;

impl PageLayout {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if !(6.0..=24.0).contains(&self.font_size_pt) {
            return Err(PipelineError::InvalidConfig(format!(
                "font size must be 6–24 pt, got {}",
                self.font_size_pt
            )));
        }
        if self.margin_mm < 0.0
            || self.margin_mm * 2.0 >= self.width_mm
            || self.margin_mm * 2.0 >= self.height_mm
        {
            return Err(PipelineError::InvalidConfig(format!(
                "margin {} mm does not fit a {}×{} mm page",
                self.margin_mm, self.width_mm, self.height_mm
            )));
        }
        if self.line_spacing < 1.0 {
            return Err(PipelineError::InvalidConfig(
                "line spacing must be ≥ 1.0".into(),
            ));
        }
        Ok(())
    }

    /// Distance between two baselines, in millimetres.
    pub fn line_height_mm(&self) -> f32 {
        self.font_size_pt * self.line_spacing * MM_PER_PT
    }

    /// One em at the configured font size, in millimetres.
    pub fn em_mm(&self) -> f32 {
        self.font_size_pt * MM_PER_PT
    }

    /// Width between the left and right margins.
    pub fn printable_width_mm(&self) -> f32 {
        self.width_mm - 2.0 * self.margin_mm
    }

    /// Printable width in thousandths of an em, the unit font metrics use.
    pub fn line_width_units(&self) -> u32 {
        (self.printable_width_mm() / self.em_mm() * 1000.0).floor() as u32
    }

    /// How many lines fit between the top and bottom margins.
    pub fn lines_per_page(&self) -> usize {
        let printable = self.height_mm - 2.0 * self.margin_mm;
        ((printable / self.line_height_mm()).floor() as usize).max(1)
    }
}

/// Fields one allow-listed collection may return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionPolicy {
    pub name: String,
    pub fields: Vec<String>,
}

impl CollectionPolicy {
    pub fn new(name: impl Into<String>, fields: &[&str]) -> Self {
        Self {
            name: name.into(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }
}

/// Configuration for the collection query passthrough.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Collections callers may query, with their visible fields.
    pub collections: Vec<CollectionPolicy>,
    /// Upper bound on returned documents. Default: 500.
    pub max_results: i64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            collections: vec![CollectionPolicy::new(
                "companies",
                &[
                    "_id",
                    "name",
                    "industry",
                    "location",
                    "description",
                    "website",
                    "employees",
                ],
            )],
            max_results: 500,
        }
    }
}

impl QueryConfig {
    /// Look up the policy for `name`, if the collection is allow-listed.
    pub fn policy(&self, name: &str) -> Option<&CollectionPolicy> {
        self.collections.iter().find(|c| c.name == name)
    }
}
