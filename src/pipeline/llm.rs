//! Report synthesis: build the rubric prompt and call the generator.
//!
//! All prompt text lives in [`crate::prompts`]; this module only assembles
//! the request and picks the answer.
//!
//! ## Message Layout
//!
//! 1. **System message** — the scoring rubric and report schema (or the
//!    configured override)
//! 2. **User message** — the extracted text, verbatim, followed by the
//!    evaluation protocol
//!
//! No retry: a failed or empty answer fails the request.

use crate::config::EvaluationConfig;
use crate::error::PipelineError;
use crate::output::{ExtractedText, ReportDocument};
use crate::prompts::{evaluation_request, DEFAULT_SYSTEM_PROMPT};
use crate::provider::{CompletionRequest, PromptMessage, ResponseFormat, TextGenerator};
use chrono::Utc;
use std::time::Instant;
use tracing::debug;

/// Token usage reported alongside the synthesized report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
}

/// Build the two-message completion request for `text`.
pub fn build_request(text: &ExtractedText, config: &EvaluationConfig) -> CompletionRequest {
    let system_prompt = config
        .system_prompt
        .as_deref()
        .unwrap_or(DEFAULT_SYSTEM_PROMPT);

    CompletionRequest {
        messages: vec![
            PromptMessage::system(system_prompt),
            PromptMessage::user(evaluation_request(text.as_str())),
        ],
        max_tokens: config.max_tokens,
        temperature: config.temperature,
        response_format: ResponseFormat::PlainText,
    }
}

/// Synthesize the evaluation report for `text`.
///
/// Returns the first candidate, trimmed, stamped with the current time.
pub async fn synthesize_report(
    generator: &dyn TextGenerator,
    text: &ExtractedText,
    config: &EvaluationConfig,
) -> Result<(ReportDocument, TokenUsage), PipelineError> {
    let start = Instant::now();
    let request = build_request(text, config);

    let completion = generator.complete(&request).await?;
    let usage = TokenUsage {
        prompt_tokens: completion.prompt_tokens,
        completion_tokens: completion.completion_tokens,
    };

    let content = completion
        .candidates
        .into_iter()
        .next()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or(PipelineError::NoCandidates)?;

    debug!(
        "Report synthesized: {} chars, {} input / {} output tokens, {:?}",
        content.len(),
        usage.prompt_tokens,
        usage.completion_tokens,
        start.elapsed()
    );

    Ok((
        ReportDocument {
            content,
            generated_at: Utc::now(),
        },
        usage,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{Completion, Role};
    use async_trait::async_trait;

    struct Scripted(Vec<String>);

    #[async_trait]
    impl TextGenerator for Scripted {
        async fn complete(&self, _r: &CompletionRequest) -> Result<Completion, PipelineError> {
            Ok(Completion {
                candidates: self.0.clone(),
                prompt_tokens: 100,
                completion_tokens: 20,
            })
        }
    }

    #[test]
    fn request_has_one_system_and_one_user_message() {
        let text = ExtractedText("Jane Doe — Rust engineer".into());
        let req = build_request(&text, &EvaluationConfig::default());

        assert_eq!(req.messages.len(), 2);
        assert_eq!(req.messages[0].role, Role::System);
        assert_eq!(req.messages[1].role, Role::User);
        assert!(req.messages[1].content.contains("Jane Doe — Rust engineer"));
        assert_eq!(req.max_tokens, 2048);
        assert_eq!(req.response_format, ResponseFormat::PlainText);
    }

    #[test]
    fn system_prompt_override_is_used() {
        let config = EvaluationConfig::builder()
            .system_prompt("custom rubric")
            .build()
            .unwrap();
        let req = build_request(&ExtractedText("x".into()), &config);
        assert_eq!(req.messages[0].content, "custom rubric");
    }

    #[test]
    fn model_setting_does_not_change_the_request() {
        let text = ExtractedText("x".into());
        let with_model = EvaluationConfig::builder().model("gpt-4.1").build().unwrap();
        assert_eq!(
            build_request(&text, &with_model),
            build_request(&text, &EvaluationConfig::default())
        );
    }

    #[tokio::test]
    async fn first_candidate_is_trimmed() {
        let g = Scripted(vec!["  RANK: A \n".into(), "RANK: B".into()]);
        let (report, usage) =
            synthesize_report(&g, &ExtractedText("x".into()), &EvaluationConfig::default())
                .await
                .unwrap();
        assert_eq!(report.content, "RANK: A");
        assert_eq!(usage.prompt_tokens, 100);
    }

    #[tokio::test]
    async fn zero_candidates_is_an_error() {
        let g = Scripted(vec![]);
        let err = synthesize_report(&g, &ExtractedText("x".into()), &EvaluationConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::NoCandidates));
    }

    #[tokio::test]
    async fn blank_first_candidate_is_an_error() {
        let g = Scripted(vec!["   ".into()]);
        let err = synthesize_report(&g, &ExtractedText("x".into()), &EvaluationConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::NoCandidates));
    }
}
