//! OpenAI-compatible hosted model provider.
//!
//! Speaks the `/chat/completions` dialect shared by Gemini's OpenAI
//! endpoint and most hosted inference APIs. Structured output is requested
//! through `response_format` with a JSON schema.
//!
//! The API key is wrapped in [`SecretString`] and is only exposed when
//! building the `Authorization` header.

pub mod types;

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use quest_core::llm::provider::LlmProvider;
use quest_types::config::LlmConfig;
use quest_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, StopReason, Usage,
};

use crate::http::{client_with_timeout, join_url};

use self::types::{ChatCompletionMessage, ChatCompletionRequest, ChatCompletionResponse};

/// Provider for any OpenAI-compatible chat completions API.
///
/// Does NOT derive Debug so the key cannot end up in logs.
pub struct OpenAiCompatibleProvider {
    client: reqwest::Client,
    api_key: Option<SecretString>,
    base_url: String,
    model: String,
}

impl OpenAiCompatibleProvider {
    pub fn new(
        api_key: Option<SecretString>,
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: client_with_timeout(timeout),
            api_key,
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    pub fn from_config(config: &LlmConfig) -> Self {
        Self::new(
            config.api_key.clone(),
            config.base_url.clone(),
            config.model.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn build_request(&self, request: &CompletionRequest) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);

        if let Some(ref system) = request.system {
            messages.push(ChatCompletionMessage {
                role: "system".to_string(),
                content: Some(system.clone()),
            });
        }

        for msg in &request.messages {
            messages.push(ChatCompletionMessage {
                role: msg.role.to_string(),
                content: Some(msg.content.clone()),
            });
        }

        // Empty model on the request means "use the configured one".
        let model = if request.model.is_empty() {
            self.model.clone()
        } else {
            request.model.clone()
        };

        ChatCompletionRequest {
            model,
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            response_format: request.output_config.as_ref().map(|c| c.format.clone()),
        }
    }
}

impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let api_key = self.api_key.as_ref().ok_or(LlmError::AuthenticationFailed)?;
        let body = self.build_request(request);
        let url = join_url(&self.base_url, "chat/completions");

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after_ms = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(|secs| secs.saturating_mul(1000));
            let error_body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => LlmError::AuthenticationFailed,
                429 => LlmError::RateLimited { retry_after_ms },
                503 | 529 => LlmError::Overloaded(error_body),
                400 => LlmError::InvalidRequest(error_body),
                _ => LlmError::Provider {
                    message: format!("HTTP {status}: {error_body}"),
                },
            });
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            LlmError::Deserialization(format!("failed to parse response: {e}"))
        })?;

        let choice = parsed.choices.into_iter().next().ok_or_else(|| {
            LlmError::Deserialization("response contained no choices".to_string())
        })?;

        let stop_reason = match choice.finish_reason.as_deref() {
            Some("length") => StopReason::MaxTokens,
            Some("content_filter") => StopReason::ContentFilter,
            Some("stop_sequence") => StopReason::StopSequence,
            _ => StopReason::EndTurn,
        };

        let usage = parsed
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            id: parsed.id,
            content: choice.message.content.unwrap_or_default(),
            model: if parsed.model.is_empty() {
                body.model
            } else {
                parsed.model
            },
            stop_reason,
            usage,
        })
    }
}
