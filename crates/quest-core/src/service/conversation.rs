//! ConversationService -- the `/chat` and `/chat/complete` use cases.
//!
//! A completion turn runs, in order: memory context lookup, persona reply,
//! fact extraction on the latest user message, conversation storage, and
//! confirmation planning. Memory steps only happen for identified users.

use std::sync::Arc;

use uuid::Uuid;

use quest_types::chat::{ChatMessage, ChatRequest, ChatResponse, Persona};
use quest_types::error::ConversationError;
use quest_types::fact::{ExtractedFact, UserFact};

use crate::chat::gateway::{ChatGateway, last_message_from_user, latest_user_message};
use crate::confirmation::policy::plan_confirmations;
use crate::confirmation::repository::ConfirmationRepository;
use crate::confirmation::service::ConfirmationService;
use crate::extract::facts::FactExtractor;
use crate::graph::KnowledgeGraph;
use crate::memory::context::{relevant_context, store_conversation};
use crate::memory::store::MemoryStore;

pub struct ConversationService<M, R, G> {
    gateway: ChatGateway,
    extractor: FactExtractor,
    memory: Arc<M>,
    confirmations: ConfirmationService<R, G>,
}

impl<M, R, G> Clone for ConversationService<M, R, G> {
    fn clone(&self) -> Self {
        Self {
            gateway: self.gateway.clone(),
            extractor: self.extractor.clone(),
            memory: self.memory.clone(),
            confirmations: self.confirmations.clone(),
        }
    }
}

/// Treat an empty `user_id` the same as an absent one.
fn known_user(user_id: Option<&str>) -> Option<&str> {
    user_id.map(str::trim).filter(|u| !u.is_empty())
}

impl<M, R, G> ConversationService<M, R, G>
where
    M: MemoryStore,
    R: ConfirmationRepository,
    G: KnowledgeGraph,
{
    pub fn new(
        gateway: ChatGateway,
        extractor: FactExtractor,
        memory: Arc<M>,
        confirmations: ConfirmationService<R, G>,
    ) -> Self {
        Self {
            gateway,
            extractor,
            memory,
            confirmations,
        }
    }

    /// Plain chat: the last message must come from the user. Returns the
    /// model's raw text.
    #[tracing::instrument(name = "chat", skip(self, messages, persona), fields(persona = %persona))]
    pub async fn chat(
        &self,
        messages: &[ChatMessage],
        user_id: Option<&str>,
        persona: Persona,
    ) -> Result<String, ConversationError> {
        let user_content = last_message_from_user(messages)?;

        let context = match known_user(user_id) {
            Some(user_id) => relevant_context(self.memory.as_ref(), user_id, user_content).await,
            None => String::new(),
        };

        Ok(self.gateway.reply(persona, messages, &context).await?)
    }

    /// Chat with fact extraction and confirmation planning.
    #[tracing::instrument(
        name = "chat_complete",
        skip(self, request),
        fields(messages = request.messages.len(), has_user = request.user_id.is_some())
    )]
    pub async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, ConversationError> {
        let user_content = latest_user_message(&request.messages)?;
        let user_id = known_user(request.user_id.as_deref());
        let persona = Persona::from_app_type(request.app_type.as_deref());

        let (context, accepted) = match user_id {
            Some(user_id) => (
                relevant_context(self.memory.as_ref(), user_id, user_content).await,
                self.confirmations.accepted_facts(user_id).await?,
            ),
            None => (String::new(), Vec::new()),
        };

        let content = self.gateway.reply(persona, &request.messages, &context).await?;

        let existing: Vec<ExtractedFact> = accepted.iter().map(UserFact::to_extracted).collect();
        let extraction = self.extractor.extract(user_content, &existing).await?;

        let planned = plan_confirmations(user_id.unwrap_or_default(), &extraction.facts, &accepted);

        let pending_confirmations = match user_id {
            Some(user_id) => {
                let session_id = request
                    .session_id
                    .clone()
                    .unwrap_or_else(|| Uuid::new_v4().to_string());
                let outcome = store_conversation(
                    self.memory.as_ref(),
                    user_id,
                    &session_id,
                    user_content,
                    &content,
                )
                .await;
                tracing::debug!(outcome = outcome.label(), "conversation stored");

                self.confirmations.record_all(planned).await?
            }
            None => planned,
        };

        Ok(ChatResponse {
            content,
            extracted_facts: extraction.facts,
            pending_confirmations,
            recommendations: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use quest_types::confirmation::ConfirmationStatus;
    use quest_types::error::ChatInputError;
    use quest_types::fact::FactType;

    use crate::llm::box_provider::BoxLlmProvider;
    use crate::testing::{
        FailingProvider, InMemoryConfirmations, MockProvider, RecordingGraph, RecordingMemory,
    };

    type Service = ConversationService<RecordingMemory, InMemoryConfirmations, RecordingGraph>;

    const FACTS: &str = r#"{
        "facts": [
            {"type": "destination_preference", "value": "Spain", "confidence": 0.9, "requires_confirmation": false, "context": "Spain now"},
            {"type": "timeline", "value": "someday", "confidence": 0.3, "requires_confirmation": false, "context": "someday"}
        ],
        "has_changes": true,
        "summary": "Spain, someday"
    }"#;

    struct Fixture {
        service: Service,
        memory: Arc<RecordingMemory>,
        repo: Arc<InMemoryConfirmations>,
        provider_requests: Arc<std::sync::Mutex<Vec<quest_types::llm::CompletionRequest>>>,
    }

    fn fixture(memory: RecordingMemory) -> Fixture {
        let provider = MockProvider::new("Spain is a great choice!", FACTS);
        let provider_requests = provider.requests.clone();
        let llm = provider.boxed();
        let memory = Arc::new(memory);
        let repo = Arc::new(InMemoryConfirmations::default());
        let confirmations = ConfirmationService::new(repo.clone(), Arc::new(RecordingGraph::default()));
        let service = ConversationService::new(
            ChatGateway::new(llm.clone()),
            FactExtractor::new(llm),
            memory.clone(),
            confirmations,
        );
        Fixture {
            service,
            memory,
            repo,
            provider_requests,
        }
    }

    fn request(user_id: Option<&str>) -> ChatRequest {
        ChatRequest {
            messages: vec![ChatMessage::user("Actually I want Spain, someday")],
            user_id: user_id.map(str::to_string),
            session_id: Some("s1".to_string()),
            app_type: None,
        }
    }

    #[tokio::test]
    async fn test_chat_without_user_skips_memory() {
        let f = fixture(RecordingMemory::default());
        let reply = f
            .service
            .chat(&[ChatMessage::user("Hi")], None, Persona::Placement)
            .await
            .unwrap();
        assert_eq!(reply, "Spain is a great choice!");
        assert!(f.memory.searches.lock().unwrap().is_empty());

        let requests = f.provider_requests.lock().unwrap();
        assert!(requests[0].messages[0].content.starts_with("Context: \n"));
    }

    #[tokio::test]
    async fn test_chat_with_user_injects_context() {
        let f = fixture(RecordingMemory {
            results: vec!["Likes warm weather".to_string()],
            ..Default::default()
        });
        f.service
            .chat(&[ChatMessage::user("Where should I go?")], Some("u1"), Persona::Relocation)
            .await
            .unwrap();

        let searches = f.memory.searches.lock().unwrap();
        assert_eq!(searches[0], ("u1".to_string(), "Where should I go?".to_string()));
        let requests = f.provider_requests.lock().unwrap();
        assert!(requests[0].messages[0]
            .content
            .contains("Previous relevant context:\n- Likes warm weather"));
    }

    #[tokio::test]
    async fn test_chat_rejects_trailing_assistant_message() {
        let f = fixture(RecordingMemory::default());
        let err = f
            .service
            .chat(
                &[ChatMessage::user("Hi"), ChatMessage::assistant("Hello")],
                None,
                Persona::Relocation,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ConversationError::Input(ChatInputError::LastMessageNotUser)));
        assert!(f.provider_requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_complete_anonymous() {
        let f = fixture(RecordingMemory::default());
        let response = f.service.complete(request(None)).await.unwrap();

        assert_eq!(response.content, "Spain is a great choice!");
        assert_eq!(response.extracted_facts.len(), 2);
        // Only the low-confidence fact needs review; nothing is persisted.
        assert_eq!(response.pending_confirmations.len(), 1);
        assert_eq!(response.pending_confirmations[0].user_id, "");
        assert!(response.pending_confirmations[0].id.is_none());
        assert!(response.recommendations.is_empty());
        assert!(f.memory.stored.lock().unwrap().is_empty());
        assert!(f.repo.confirmations.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_complete_with_user_persists_and_detects_overwrite() {
        let f = fixture(RecordingMemory::default());
        f.repo.facts.lock().unwrap().push(UserFact {
            user_id: "u1".to_string(),
            fact_type: FactType::DestinationPreference,
            value: "Portugal".to_string(),
            confidence: 0.95,
            updated_at: Utc::now(),
        });

        let response = f.service.complete(request(Some("u1"))).await.unwrap();

        assert_eq!(response.pending_confirmations.len(), 2);
        let overwrite = response
            .pending_confirmations
            .iter()
            .find(|c| c.fact_type == FactType::DestinationPreference)
            .unwrap();
        assert_eq!(overwrite.old_value.as_deref(), Some("Portugal"));
        assert!(overwrite.id.is_some());
        assert_eq!(overwrite.status, ConfirmationStatus::Pending);
        assert_eq!(f.repo.confirmations.lock().unwrap().len(), 2);

        let stored = f.memory.stored.lock().unwrap();
        assert_eq!(stored[0].1, "User: Actually I want Spain, someday\nAssistant: Spain is a great choice!");
        assert_eq!(stored[0].2["session_id"], "s1");

        // Accepted facts are briefed to the extractor.
        let requests = f.provider_requests.lock().unwrap();
        let extraction = requests.iter().find(|r| r.output_config.is_some()).unwrap();
        assert!(extraction.messages[0]
            .content
            .contains("- destination_preference: Portugal"));
    }

    #[tokio::test]
    async fn test_complete_requires_a_user_message() {
        let f = fixture(RecordingMemory::default());
        let mut req = request(None);
        req.messages = vec![ChatMessage::assistant("Hello there")];
        let err = f.service.complete(req).await.unwrap_err();
        assert!(matches!(err, ConversationError::Input(ChatInputError::NoUserMessage)));
    }

    #[tokio::test]
    async fn test_model_failure_propagates() {
        let llm = Arc::new(BoxLlmProvider::new(FailingProvider));
        let service: Service = ConversationService::new(
            ChatGateway::new(llm.clone()),
            FactExtractor::new(llm),
            Arc::new(RecordingMemory::default()),
            ConfirmationService::new(
                Arc::new(InMemoryConfirmations::default()),
                Arc::new(RecordingGraph::default()),
            ),
        );
        let err = service.complete(request(None)).await.unwrap_err();
        assert!(matches!(err, ConversationError::Llm(_)));
        assert!(err.to_string().contains("HTTP 503"));
    }
}
