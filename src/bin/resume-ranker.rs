//! HTTP server binary for resume-ranker.
//!
//! Maps flags and environment variables onto the library's configuration,
//! builds the remote clients once and serves the router.

use anyhow::{bail, Context, Result};
use clap::Parser;
use resume_ranker::query::MongoCollectionStore;
use resume_ranker::server::{self, AppState};
use resume_ranker::store::auth::{OAuthCredentials, GOOGLE_TOKEN_URI};
use resume_ranker::store::{DriveAuth, DriveClient};
use resume_ranker::{
    EvaluationConfig, Evaluator, LlmTextGenerator, PdfSink, PipelineError, PipelineObserver,
    PipelineStage, PublishedReportRef, QueryConfig,
};
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

const AFTER_HELP: &str = r#"EXAMPLES:
  # Refresh-token credentials, OpenAI via auto-detection
  GOOGLE_CLIENT_ID=... GOOGLE_CLIENT_SECRET=... GOOGLE_REFRESH_TOKEN=... \
  OPENAI_API_KEY=sk-... resume-ranker --report-folder 1AbC...

  # Short-lived access token, explicit provider and model
  resume-ranker --google-access-token ya29... --provider gemini --model gemini-2.0-flash

  # Evaluate a resume
  curl -F file=@cv.pdf http://localhost:5000/upload-and-rank

ENVIRONMENT:
  A .env file in the working directory is loaded before flags are parsed.
  RUST_LOG overrides the log filter.
"#;

/// Evaluate uploaded resumes with an LLM and publish PDF reports.
#[derive(Parser, Debug)]
#[command(
    name = "resume-ranker",
    version,
    about = "Evaluate uploaded resumes with an LLM and publish PDF reports",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Interface to bind.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on.
    #[arg(short, long, env = "PORT", default_value_t = 5000)]
    port: u16,

    /// Directory for transient upload and report files.
    #[arg(long, env = "RANKER_WORK_DIR")]
    work_dir: Option<PathBuf>,

    /// Remote folder receiving uploaded resumes.
    #[arg(long, env = "GOOGLE_DRIVE_UPLOAD_FOLDER_ID")]
    upload_folder: Option<String>,

    /// Remote folder receiving published reports.
    #[arg(long, env = "GOOGLE_DRIVE_REPORT_FOLDER_ID")]
    report_folder: Option<String>,

    /// OAuth client id.
    #[arg(long, env = "GOOGLE_CLIENT_ID")]
    google_client_id: Option<String>,

    /// OAuth client secret.
    #[arg(long, env = "GOOGLE_CLIENT_SECRET", hide_env_values = true)]
    google_client_secret: Option<String>,

    /// OAuth refresh token.
    #[arg(long, env = "GOOGLE_REFRESH_TOKEN", hide_env_values = true)]
    google_refresh_token: Option<String>,

    /// Static access token, used instead of the refresh-token flow.
    #[arg(long, env = "GOOGLE_ACCESS_TOKEN", hide_env_values = true)]
    google_access_token: Option<String>,

    /// LLM provider (openai, anthropic, gemini, ollama, ...).
    #[arg(long, env = "EDGEQUAKE_PROVIDER")]
    provider: Option<String>,

    /// LLM model name.
    #[arg(long, env = "EDGEQUAKE_MODEL")]
    model: Option<String>,

    /// Sampling temperature.
    #[arg(long, env = "RANKER_TEMPERATURE", default_value_t = 0.1)]
    temperature: f32,

    /// Maximum tokens in the generated report.
    #[arg(long, env = "RANKER_MAX_TOKENS", default_value_t = 2048)]
    max_tokens: usize,

    /// MongoDB connection string.
    #[arg(long, env = "MONGODB_URI", default_value = "mongodb://localhost:27017")]
    mongodb_uri: String,

    /// Database holding the queryable collections.
    #[arg(long, env = "MONGODB_DATABASE", default_value = resume_ranker::query::mongo::DEFAULT_DATABASE)]
    database: String,

    /// Maximum pooled database connections.
    #[arg(long, env = "MONGODB_POOL_SIZE", default_value_t = 10)]
    pool_size: u32,

    /// Evaluations allowed to run at the same time.
    #[arg(short, long, env = "RANKER_CONCURRENCY", default_value_t = 8)]
    concurrency: usize,

    /// Maximum upload size in bytes.
    #[arg(long, env = "RANKER_BODY_LIMIT", default_value_t = server::DEFAULT_BODY_LIMIT)]
    body_limit: usize,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "RANKER_VERBOSE")]
    verbose: bool,
}

/// Emits one structured event per stage transition.
struct StageLogger;

impl PipelineObserver for StageLogger {
    fn on_stage_start(&self, stage: PipelineStage) {
        debug!(stage = %stage, "stage entered");
    }

    fn on_failed(&self, stage: PipelineStage, error: &PipelineError) {
        warn!(stage = %stage, kind = %error.kind(), "evaluation failed");
    }

    fn on_complete(&self, report: &PublishedReportRef) {
        info!(report_id = %report.id, "evaluation published");
    }
}

fn drive_auth(cli: &Cli, http: &reqwest::Client) -> Result<DriveAuth> {
    if let Some(token) = &cli.google_access_token {
        return Ok(DriveAuth::static_token(token.clone()));
    }
    match (
        &cli.google_client_id,
        &cli.google_client_secret,
        &cli.google_refresh_token,
    ) {
        (Some(id), Some(secret), Some(refresh)) => Ok(DriveAuth::refresh_token(
            OAuthCredentials {
                client_id: id.clone(),
                client_secret: secret.clone(),
                refresh_token: refresh.clone(),
                token_uri: GOOGLE_TOKEN_URI.to_string(),
            },
            http.clone(),
        )),
        _ => bail!(
            "Drive credentials missing: set GOOGLE_ACCESS_TOKEN, or all of \
             GOOGLE_CLIENT_ID, GOOGLE_CLIENT_SECRET and GOOGLE_REFRESH_TOKEN"
        ),
    }
}

fn evaluation_config(cli: &Cli) -> Result<EvaluationConfig> {
    let mut builder = EvaluationConfig::builder()
        .temperature(cli.temperature)
        .max_tokens(cli.max_tokens);
    if let Some(model) = &cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(provider) = &cli.provider {
        builder = builder.provider_name(provider.clone());
    }
    if let Some(folder) = &cli.upload_folder {
        builder = builder.upload_folder(folder.clone());
    }
    if let Some(folder) = &cli.report_folder {
        builder = builder.report_folder(folder.clone());
    }
    if let Some(dir) = &cli.work_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create work dir {}", dir.display()))?;
        builder = builder.work_dir(dir.clone());
    }
    builder.build().context("Invalid evaluation configuration")
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let config = evaluation_config(&cli)?;
    debug!("{:?}", config);

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(120))
        .build()
        .context("Failed to build HTTP client")?;
    let auth = Arc::new(drive_auth(&cli, &http)?);
    let store = Arc::new(DriveClient::new(http, auth));
    let generator =
        Arc::new(LlmTextGenerator::from_config(&config).context("Failed to set up LLM provider")?);

    let evaluator = Evaluator::new(store, generator, Arc::new(PdfSink), config)
        .with_observer(Arc::new(StageLogger));

    let collections = MongoCollectionStore::connect(&cli.mongodb_uri, &cli.database, cli.pool_size)
        .await
        .context("Failed to configure MongoDB client")?;

    let state = AppState::new(
        Arc::new(evaluator),
        Arc::new(collections),
        QueryConfig::default(),
        cli.concurrency,
    );

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", cli.host, cli.port))?;

    server::serve(addr, server::router(state, cli.body_limit))
        .await
        .context("Server error")?;
    Ok(())
}
