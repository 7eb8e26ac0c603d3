//! In-memory collaborators shared by the integration tests.
//!
//! Every fake appends to one [`CallLog`] so tests can assert the exact order
//! of remote calls across the store, the generator and the sink.

#![allow(dead_code)]

use async_trait::async_trait;
use resume_ranker::{
    Completion, CompletionRequest, DocumentSink, EvaluationConfig, Evaluator, ObjectMetadata,
    ObjectStore, PipelineError, RemoteFileRef, RenderRequest, StoreOperation, TextGenerator,
    WriteCompletion,
};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Create {
        id: String,
        name: String,
        mime_type: String,
        parent_folder: Option<String>,
        size: usize,
    },
    Copy {
        from: String,
        id: String,
        target_mime: String,
    },
    Export {
        id: String,
        mime_type: String,
    },
    Complete {
        request: CompletionRequest,
    },
    Write {
        path: std::path::PathBuf,
    },
}

impl Call {
    pub fn label(&self) -> &'static str {
        match self {
            Call::Create { .. } => "create",
            Call::Copy { .. } => "copy",
            Call::Export { .. } => "export",
            Call::Complete { .. } => "complete",
            Call::Write { .. } => "write",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<Call>>>);

impl CallLog {
    pub fn push(&self, call: Call) {
        self.0.lock().unwrap().push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.lock().unwrap().clone()
    }

    pub fn labels(&self) -> Vec<&'static str> {
        self.calls().iter().map(Call::label).collect()
    }
}

/// Where a scripted failure is injected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Upload,
    Copy,
    Export,
    Generate,
    Write,
    Publish,
}

// ── Object store ─────────────────────────────────────────────────────────────

pub struct FakeStore {
    log: CallLog,
    next_id: AtomicUsize,
    exported_text: String,
    fail_at: Option<FailAt>,
}

impl FakeStore {
    pub fn new(log: CallLog, exported_text: impl Into<String>, fail_at: Option<FailAt>) -> Self {
        Self {
            log,
            next_id: AtomicUsize::new(1),
            exported_text: exported_text.into(),
            fail_at,
        }
    }

    fn fresh_id(&self) -> String {
        format!("file-{}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn creates(&self) -> usize {
        self.log
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::Create { .. }))
            .count()
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn create(
        &self,
        bytes: Vec<u8>,
        metadata: &ObjectMetadata,
    ) -> Result<RemoteFileRef, PipelineError> {
        let publishing = metadata.mime_type == "application/pdf" && self.creates() > 0;
        let fail = match self.fail_at {
            Some(FailAt::Upload) => !publishing,
            Some(FailAt::Publish) => publishing,
            _ => false,
        };
        if fail {
            return Err(PipelineError::RemoteStore {
                operation: StoreOperation::Create,
                detail: "quota exceeded".into(),
            });
        }
        let id = self.fresh_id();
        self.log.push(Call::Create {
            id: id.clone(),
            name: metadata.name.clone(),
            mime_type: metadata.mime_type.clone(),
            parent_folder: metadata.parent_folder.clone(),
            size: bytes.len(),
        });
        Ok(RemoteFileRef {
            id,
            mime_type: metadata.mime_type.clone(),
        })
    }

    async fn copy(
        &self,
        object_id: &str,
        target_mime: &str,
        _parent_folder: Option<&str>,
    ) -> Result<RemoteFileRef, PipelineError> {
        if self.fail_at == Some(FailAt::Copy) {
            return Err(PipelineError::RemoteStore {
                operation: StoreOperation::Copy,
                detail: "conversion failed".into(),
            });
        }
        let id = self.fresh_id();
        self.log.push(Call::Copy {
            from: object_id.to_string(),
            id: id.clone(),
            target_mime: target_mime.to_string(),
        });
        Ok(RemoteFileRef {
            id,
            mime_type: target_mime.to_string(),
        })
    }

    async fn export(&self, object_id: &str, mime_type: &str) -> Result<String, PipelineError> {
        if self.fail_at == Some(FailAt::Export) {
            return Err(PipelineError::RemoteStore {
                operation: StoreOperation::Export,
                detail: "export failed".into(),
            });
        }
        self.log.push(Call::Export {
            id: object_id.to_string(),
            mime_type: mime_type.to_string(),
        });
        Ok(self.exported_text.clone())
    }
}

// ── Text generator ───────────────────────────────────────────────────────────

pub struct FakeGenerator {
    log: CallLog,
    candidates: Vec<String>,
    fail: bool,
}

impl FakeGenerator {
    pub fn new(log: CallLog, candidates: Vec<String>, fail: bool) -> Self {
        Self {
            log,
            candidates,
            fail,
        }
    }
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, PipelineError> {
        if self.fail {
            return Err(PipelineError::LlmApiError {
                message: "rate limited".into(),
            });
        }
        self.log.push(Call::Complete {
            request: request.clone(),
        });
        Ok(Completion {
            candidates: self.candidates.clone(),
            prompt_tokens: 321,
            completion_tokens: 45,
        })
    }
}

// ── Document sink ────────────────────────────────────────────────────────────

/// Writes a tiny placeholder file and signals completion, or fails.
pub struct FakeSink {
    log: CallLog,
    fail: bool,
}

impl FakeSink {
    pub fn new(log: CallLog, fail: bool) -> Self {
        Self { log, fail }
    }
}

impl DocumentSink for FakeSink {
    fn write(&self, request: RenderRequest) -> WriteCompletion {
        let (tx, completion) = WriteCompletion::channel(&request.path);
        if self.fail {
            let _ = tx.send(Err("disk full".into()));
            return completion;
        }
        self.log.push(Call::Write {
            path: request.path.clone(),
        });
        let body = format!("%PDF-fake\n{}", request.text);
        let result = std::fs::write(&request.path, &body)
            .map(|_| body.len() as u64)
            .map_err(|e| e.to_string());
        let _ = tx.send(result);
        completion
    }
}

// ── Assembly ─────────────────────────────────────────────────────────────────

pub const RESUME_TEXT: &str = "Jane Doe\nSenior Rust Engineer — 8 years\nLed a team of 12.";

pub const REPORT_TEXT: &str =
    "CANDIDATE: Jane Doe\nTOTAL: 82/100\nRANK: B\nSUMMARY: Strong systems background.";

pub struct Harness {
    pub log: CallLog,
    pub evaluator: Evaluator,
}

pub fn config(work_dir: &Path) -> EvaluationConfig {
    EvaluationConfig::builder()
        .work_dir(work_dir)
        .upload_folder("uploads")
        .report_folder("reports")
        .build()
        .unwrap()
}

pub fn harness(work_dir: &Path, fail_at: Option<FailAt>) -> Harness {
    harness_with(work_dir, fail_at, vec![REPORT_TEXT.to_string()], RESUME_TEXT)
}

/// Route library logs to the test output; `RUST_LOG=debug` shows stage traces.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn harness_with(
    work_dir: &Path,
    fail_at: Option<FailAt>,
    candidates: Vec<String>,
    exported_text: &str,
) -> Harness {
    init_tracing();
    let log = CallLog::default();
    let store = Arc::new(FakeStore::new(log.clone(), exported_text, fail_at));
    let generator = Arc::new(FakeGenerator::new(
        log.clone(),
        candidates,
        fail_at == Some(FailAt::Generate),
    ));
    let sink = Arc::new(FakeSink::new(log.clone(), fail_at == Some(FailAt::Write)));
    let evaluator = Evaluator::new(store, generator, sink, config(work_dir));
    Harness { log, evaluator }
}

pub fn dir_is_empty(dir: &Path) -> bool {
    std::fs::read_dir(dir).unwrap().next().is_none()
}
