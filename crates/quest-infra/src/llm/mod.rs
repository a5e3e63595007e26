//! Hosted model provider implementations.
//!
//! Contains the concrete [`LlmProvider`](quest_core::llm::provider::LlmProvider)
//! used by Quest and a factory that builds it from configuration.

pub mod openai_compat;

use quest_core::llm::box_provider::BoxLlmProvider;
use quest_types::config::LlmConfig;

use self::openai_compat::OpenAiCompatibleProvider;

/// Build the configured provider behind a [`BoxLlmProvider`].
///
/// A missing API key still yields a provider; each call then fails with
/// `LlmError::AuthenticationFailed`.
pub fn create_provider(config: &LlmConfig) -> BoxLlmProvider {
    if config.api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY is not set; model calls will fail");
    }
    BoxLlmProvider::new(OpenAiCompatibleProvider::from_config(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_provider_without_key_reports_gemini() {
        let provider = create_provider(&LlmConfig::default());
        assert_eq!(provider.name(), "gemini");
    }
}
