//! Fact extraction via a schema-constrained model call.
//!
//! The confidence bands in the prompt are guidance for the model only. This
//! layer reads `confidence` and `requires_confirmation` back without
//! recomputing them; the confirmation policy lives in
//! `crate::confirmation::policy`.

use std::sync::Arc;

use quest_types::error::ExtractionError;
use quest_types::fact::{ExtractedFact, FactExtractionResult};
use quest_types::llm::{CompletionRequest, Message, MessageRole};

use crate::llm::box_provider::BoxLlmProvider;
use crate::llm::structured::{output_config, parse_reply};

const FACT_EXTRACTION_SYSTEM_PROMPT: &str = r#"You are a fact extraction assistant. Your job is to analyze conversations
and extract structured facts about the user.

For each fact you extract, determine:
1. The type of fact (destination_preference, current_location, family_status, job_status, budget_range, timeline, language, visa_requirement, or custom)
2. The value as a string
3. Your confidence level (0.0 to 1.0)
4. Whether it requires user confirmation (for significant changes or low confidence)

Only extract facts that are explicitly stated or strongly implied.
Be conservative with confidence scores:
- 0.9-1.0: Explicitly stated, clear and unambiguous
- 0.7-0.9: Clearly implied, high certainty
- 0.5-0.7: Implied, some uncertainty
- Below 0.5: Uncertain, should require confirmation

Changes to existing user preferences (like changing destination from Portugal to Spain)
should always require confirmation."#;

/// Extracts [`ExtractedFact`]s from free text.
#[derive(Clone)]
pub struct FactExtractor {
    provider: Arc<BoxLlmProvider>,
}

impl FactExtractor {
    pub fn new(provider: Arc<BoxLlmProvider>) -> Self {
        Self { provider }
    }

    /// Extract new or changed facts from `text`.
    ///
    /// `existing_facts` are listed in the prompt so the model can spot
    /// duplicates and changes; they are not merged into the result.
    #[tracing::instrument(
        name = "extract_facts",
        skip(self, text, existing_facts),
        fields(text_len = text.len(), existing = existing_facts.len())
    )]
    pub async fn extract(
        &self,
        text: &str,
        existing_facts: &[ExtractedFact],
    ) -> Result<FactExtractionResult, ExtractionError> {
        let request = CompletionRequest {
            model: String::new(),
            messages: vec![Message {
                role: MessageRole::User,
                content: build_prompt(text, existing_facts),
            }],
            system: Some(FACT_EXTRACTION_SYSTEM_PROMPT.to_string()),
            max_tokens: 2048,
            temperature: Some(0.0),
            output_config: Some(output_config::<FactExtractionResult>("FactExtractionResult")),
        };

        let response = self.provider.complete(&request).await?;
        let result: FactExtractionResult = parse_reply(&response.content)?;
        result.validate().map_err(ExtractionError::SchemaValidation)?;

        tracing::debug!(facts = result.facts.len(), has_changes = result.has_changes, "facts extracted");
        Ok(result)
    }
}

fn build_prompt(text: &str, existing_facts: &[ExtractedFact]) -> String {
    let existing = if existing_facts.is_empty() {
        String::new()
    } else {
        let lines: Vec<String> = existing_facts
            .iter()
            .map(|f| format!("- {}: {}", f.fact_type, f.value))
            .collect();
        format!("Existing facts:\n{}", lines.join("\n"))
    };

    format!(
        "{existing}\n\nNew text to analyze:\n{text}\n\nExtract any new or changed facts about the user."
    )
}
