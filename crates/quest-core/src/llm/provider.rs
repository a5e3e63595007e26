//! LlmProvider trait definition.
//!
//! This is the core abstraction that the hosted model adapter implements.
//! Uses RPITIT for `complete`; see `BoxLlmProvider` for dynamic dispatch.

use quest_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for hosted model backends.
///
/// Implementations live in quest-infra (e.g., `OpenAiCompatibleProvider`).
/// There is no retry at this layer; a failed call is returned as-is.
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "gemini").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
