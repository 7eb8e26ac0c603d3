//! Generative-text service seam.
//!
//! The pipeline depends on [`TextGenerator`] only. [`LlmTextGenerator`] adapts
//! any `edgequake_llm::LLMProvider` (OpenAI, Anthropic, Gemini, Ollama, …) to
//! it; tests plug in scripted generators.

use crate::config::EvaluationConfig;
use crate::error::PipelineError;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider, ProviderFactory};
use std::sync::Arc;
use tracing::debug;

/// Default model when only a provider name is known.
pub const DEFAULT_MODEL: &str = "gpt-4.1-nano";

/// Author of one prompt message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
}

/// One message of the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Shape of the text the model is asked to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    #[default]
    PlainText,
}

/// A completion request.
///
/// There is no model field: the model is bound when the generator's provider
/// is created (see [`resolve_provider`]).
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<PromptMessage>,
    pub max_tokens: usize,
    pub temperature: f32,
    pub response_format: ResponseFormat,
}

/// What the service returned. `candidates` may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    pub candidates: Vec<String>,
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
}

/// A generative-text service.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, PipelineError>;
}

/// [`TextGenerator`] backed by an edgequake-llm provider.
///
/// Every request goes to the model the provider was built with.
pub struct LlmTextGenerator {
    provider: Arc<dyn LLMProvider>,
}

impl LlmTextGenerator {
    pub fn new(provider: Arc<dyn LLMProvider>) -> Self {
        Self { provider }
    }

    /// Resolve a provider from the configuration and environment.
    pub fn from_config(config: &EvaluationConfig) -> Result<Self, PipelineError> {
        Ok(Self::new(resolve_provider(config)?))
    }
}

fn to_chat_messages(messages: &[PromptMessage]) -> Vec<ChatMessage> {
    messages
        .iter()
        .map(|m| match m.role {
            Role::System => ChatMessage::system(m.content.as_str()),
            Role::User => ChatMessage::user(m.content.as_str()),
        })
        .collect()
}

#[async_trait]
impl TextGenerator for LlmTextGenerator {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, PipelineError> {
        let messages = to_chat_messages(&request.messages);
        // Plain text is the provider default; there is no format option to set.
        let options = CompletionOptions {
            temperature: Some(request.temperature),
            max_tokens: Some(request.max_tokens),
            ..Default::default()
        };

        let response = self
            .provider
            .chat(&messages, Some(&options))
            .await
            .map_err(|e| PipelineError::LlmApiError {
                message: e.to_string(),
            })?;

        debug!(
            "LLM answered: {} input tokens, {} output tokens",
            response.prompt_tokens, response.completion_tokens
        );

        // A provider answer with no text is the "zero candidates" case.
        let candidates = if response.content.trim().is_empty() {
            Vec::new()
        } else {
            vec![response.content]
        };

        Ok(Completion {
            candidates,
            prompt_tokens: response.prompt_tokens,
            completion_tokens: response.completion_tokens,
        })
    }
}

fn create_provider(provider_name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, PipelineError> {
    ProviderFactory::create_llm_provider(provider_name, model).map_err(|e| {
        PipelineError::ProviderNotConfigured {
            provider: provider_name.to_string(),
            hint: format!("{e}"),
        }
    })
}

/// Resolve the LLM provider, from most-specific to least-specific:
///
/// 1. **Named provider + model** (`config.provider_name`)
/// 2. **Environment pair** (`EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`)
/// 3. **OpenAI** when `OPENAI_API_KEY` is set
/// 4. **Full auto-detection** (`ProviderFactory::from_env`)
///
/// `config.model` applies to steps 1 and 3. Steps 2 and 4 use the model the
/// environment names, or the detected provider's default.
pub fn resolve_provider(config: &EvaluationConfig) -> Result<Arc<dyn LLMProvider>, PipelineError> {
    if let Some(ref name) = config.provider_name {
        let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
        return create_provider(name, model);
    }

    if let (Ok(prov), Ok(model)) = (
        std::env::var("EDGEQUAKE_LLM_PROVIDER"),
        std::env::var("EDGEQUAKE_MODEL"),
    ) {
        if !prov.is_empty() && !model.is_empty() {
            return create_provider(&prov, &model);
        }
    }

    if let Ok(openai_key) = std::env::var("OPENAI_API_KEY") {
        if !openai_key.is_empty() {
            let model = config.model.as_deref().unwrap_or(DEFAULT_MODEL);
            return create_provider("openai", model);
        }
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| PipelineError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set OPENAI_API_KEY, ANTHROPIC_API_KEY, or configure a provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}
