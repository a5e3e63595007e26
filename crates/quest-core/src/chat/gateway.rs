//! ChatGateway -- forwards a rendered conversation to the hosted model.

use std::sync::Arc;

use quest_types::chat::{ChatMessage, Persona};
use quest_types::error::ChatInputError;
use quest_types::llm::{CompletionRequest, LlmError, Message, MessageRole};

use super::prompt::{render_prompt, system_prompt};
use crate::llm::box_provider::BoxLlmProvider;

const MAX_REPLY_TOKENS: u32 = 2048;

/// Stateless wrapper around the provider; one call per chat turn.
#[derive(Clone)]
pub struct ChatGateway {
    provider: Arc<BoxLlmProvider>,
}

impl ChatGateway {
    pub fn new(provider: Arc<BoxLlmProvider>) -> Self {
        Self { provider }
    }

    /// Ask the persona for a reply to `messages` and return the raw text.
    #[tracing::instrument(
        name = "chat_reply",
        skip(self, persona, messages, context),
        fields(persona = %persona, message_count = messages.len(), provider = self.provider.name())
    )]
    pub async fn reply(
        &self,
        persona: Persona,
        messages: &[ChatMessage],
        context: &str,
    ) -> Result<String, LlmError> {
        let request = CompletionRequest {
            model: String::new(),
            messages: vec![Message {
                role: MessageRole::User,
                content: render_prompt(persona, messages, context),
            }],
            system: Some(system_prompt(persona).to_string()),
            max_tokens: MAX_REPLY_TOKENS,
            temperature: Some(0.7),
            output_config: None,
        };

        let response = self.provider.complete(&request).await?;
        tracing::debug!(
            input_tokens = response.usage.input_tokens,
            output_tokens = response.usage.output_tokens,
            "chat reply received"
        );
        Ok(response.content)
    }
}

/// Validate a `/chat` body: non-empty, ending with a user message.
///
/// Returns the content of that last user message.
pub fn last_message_from_user(messages: &[ChatMessage]) -> Result<&str, ChatInputError> {
    let last = messages.last().ok_or(ChatInputError::NoMessages)?;
    if last.role != MessageRole::User {
        return Err(ChatInputError::LastMessageNotUser);
    }
    Ok(&last.content)
}

/// The most recent user message anywhere in the history.
pub fn latest_user_message(messages: &[ChatMessage]) -> Result<&str, ChatInputError> {
    messages
        .iter()
        .rev()
        .find(|m| m.role == MessageRole::User)
        .map(|m| m.content.as_str())
        .ok_or(ChatInputError::NoUserMessage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use quest_types::llm::{CompletionResponse, StopReason, Usage};

    use crate::llm::provider::LlmProvider;

    struct RecordingProvider {
        seen: Arc<Mutex<Vec<CompletionRequest>>>,
    }

    impl LlmProvider for RecordingProvider {
        fn name(&self) -> &str {
            "recording"
        }

        async fn complete(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(CompletionResponse {
                id: "r1".to_string(),
                content: "Portugal is lovely.".to_string(),
                model: "mock".to_string(),
                stop_reason: StopReason::EndTurn,
                usage: Usage::default(),
            })
        }
    }

    #[tokio::test]
    async fn test_reply_sends_persona_framing() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let gateway = ChatGateway::new(Arc::new(BoxLlmProvider::new(RecordingProvider {
            seen: seen.clone(),
        })));

        let reply = gateway
            .reply(Persona::Placement, &[ChatMessage::user("Hi")], "")
            .await
            .unwrap();
        assert_eq!(reply, "Portugal is lovely.");

        let requests = seen.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].system.as_deref().unwrap().contains("placement"));
        assert!(requests[0].messages[0].content.contains("user: Hi"));
        assert!(requests[0].output_config.is_none());
    }

    #[test]
    fn test_last_message_from_user() {
        assert_eq!(last_message_from_user(&[]), Err(ChatInputError::NoMessages));
        assert_eq!(
            last_message_from_user(&[ChatMessage::user("Hi"), ChatMessage::assistant("Hello")]),
            Err(ChatInputError::LastMessageNotUser)
        );
        assert_eq!(last_message_from_user(&[ChatMessage::user("Hi")]), Ok("Hi"));
    }

    #[test]
    fn test_latest_user_message_skips_trailing_assistant() {
        let messages = vec![
            ChatMessage::user("first"),
            ChatMessage::assistant("reply"),
            ChatMessage::user("second"),
            ChatMessage::assistant("another reply"),
        ];
        assert_eq!(latest_user_message(&messages), Ok("second"));
        assert_eq!(
            latest_user_message(&[ChatMessage::assistant("only")]),
            Err(ChatInputError::NoUserMessage)
        );
    }
}
