//! UserConditions extraction from a whole conversation.

use std::sync::Arc;

use quest_types::chat::ChatMessage;
use quest_types::error::ExtractionError;
use quest_types::fact::UserConditions;
use quest_types::llm::{CompletionRequest, Message, MessageRole};

use crate::chat::prompt::render_conversation;
use crate::llm::box_provider::BoxLlmProvider;
use crate::llm::structured::{output_config, parse_reply};

const CONDITIONS_SYSTEM_PROMPT: &str = r#"Extract structured user conditions from the conversation.
Focus on:
- Destination preferences (countries, priorities, reasons)
- Family conditions (partner, children, ages)
- Job status
- Budget range
- Timeline
- Current location

Return structured data following the UserConditions schema."#;

#[derive(Clone)]
pub struct ConditionsExtractor {
    provider: Arc<BoxLlmProvider>,
}

impl ConditionsExtractor {
    pub fn new(provider: Arc<BoxLlmProvider>) -> Self {
        Self { provider }
    }

    /// Summarise the user's situation from the full history (not windowed).
    #[tracing::instrument(name = "extract_conditions", skip(self, messages), fields(message_count = messages.len()))]
    pub async fn extract(&self, messages: &[ChatMessage]) -> Result<UserConditions, ExtractionError> {
        let prompt = format!(
            "Analyze this conversation and extract the user's conditions:\n\n{}",
            render_conversation(messages)
        );
        let request = CompletionRequest {
            model: String::new(),
            messages: vec![Message {
                role: MessageRole::User,
                content: prompt,
            }],
            system: Some(CONDITIONS_SYSTEM_PROMPT.to_string()),
            max_tokens: 1024,
            temperature: Some(0.0),
            output_config: Some(output_config::<UserConditions>("UserConditions")),
        };

        let response = self.provider.complete(&request).await?;
        let conditions: UserConditions = parse_reply(&response.content)?;
        conditions.validate().map_err(ExtractionError::SchemaValidation)?;
        Ok(conditions)
    }
}
