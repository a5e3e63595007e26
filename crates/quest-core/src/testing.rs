//! In-memory doubles shared by the unit tests in this crate.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};

use quest_types::chat::Persona;
use quest_types::confirmation::{ConfirmationStatus, PendingConfirmation};
use quest_types::error::RepositoryError;
use quest_types::fact::{FactSync, FactType, UserFact};
use quest_types::llm::{CompletionRequest, CompletionResponse, LlmError, StopReason, Usage};
use quest_types::outcome::StoreOutcome;

use crate::confirmation::repository::ConfirmationRepository;
use crate::graph::KnowledgeGraph;
use crate::llm::box_provider::BoxLlmProvider;
use crate::llm::provider::LlmProvider;
use crate::memory::store::MemoryStore;

/// Answers chat requests with `chat_reply` and structured requests with
/// `structured_reply`, recording every request.
pub struct MockProvider {
    pub chat_reply: String,
    pub structured_reply: String,
    pub requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockProvider {
    pub fn new(chat_reply: &str, structured_reply: &str) -> Self {
        Self {
            chat_reply: chat_reply.to_string(),
            structured_reply: structured_reply.to_string(),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn boxed(self) -> Arc<BoxLlmProvider> {
        Arc::new(BoxLlmProvider::new(self))
    }
}

impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        let content = if request.output_config.is_some() {
            self.structured_reply.clone()
        } else {
            self.chat_reply.clone()
        };
        Ok(CompletionResponse {
            id: "mock".to_string(),
            content,
            model: "mock".to_string(),
            stop_reason: StopReason::EndTurn,
            usage: Usage::default(),
        })
    }
}

/// Always fails, for error-path tests.
pub struct FailingProvider;

impl LlmProvider for FailingProvider {
    fn name(&self) -> &str {
        "failing"
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        Err(LlmError::Provider {
            message: "HTTP 503: upstream unavailable".to_string(),
        })
    }
}

#[derive(Default)]
pub struct RecordingMemory {
    pub results: Vec<String>,
    pub searches: Mutex<Vec<(String, String)>>,
    pub stored: Mutex<Vec<(String, String, serde_json::Value)>>,
}

impl MemoryStore for RecordingMemory {
    async fn store(&self, user_id: &str, content: &str, metadata: serde_json::Value) -> StoreOutcome {
        self.stored
            .lock()
            .unwrap()
            .push((user_id.to_string(), content.to_string(), metadata));
        StoreOutcome::Stored {
            response: serde_json::json!({}),
        }
    }

    async fn search(&self, user_id: &str, query: &str, limit: usize) -> Vec<String> {
        self.searches
            .lock()
            .unwrap()
            .push((user_id.to_string(), query.to_string()));
        self.results.iter().take(limit).cloned().collect()
    }
}

#[derive(Default)]
pub struct RecordingGraph {
    pub written: Mutex<Vec<(String, Vec<FactSync>)>>,
}

impl KnowledgeGraph for RecordingGraph {
    fn content_graph_id(&self, _persona: Persona) -> Option<&str> {
        None
    }

    async fn search(&self, _graph_id: &str, _query: &str, _limit: usize) -> Vec<serde_json::Value> {
        Vec::new()
    }

    async fn read_user(&self, _user_id: &str) -> Option<serde_json::Value> {
        None
    }

    async fn write_facts(&self, user_id: &str, facts: &[FactSync]) -> StoreOutcome {
        self.written
            .lock()
            .unwrap()
            .push((user_id.to_string(), facts.to_vec()));
        StoreOutcome::Stored {
            response: serde_json::json!({"ok": true}),
        }
    }

    async fn append_memory(&self, _user_id: &str, _content: &str, _metadata: serde_json::Value) -> StoreOutcome {
        StoreOutcome::skipped("test")
    }
}

#[derive(Default)]
pub struct InMemoryConfirmations {
    pub confirmations: Mutex<HashMap<String, PendingConfirmation>>,
    pub facts: Mutex<Vec<UserFact>>,
    /// When set, `approve` fails before touching anything.
    pub fail_fact_writes: AtomicBool,
}

impl ConfirmationRepository for InMemoryConfirmations {
    async fn insert(&self, confirmation: &PendingConfirmation) -> Result<(), RepositoryError> {
        let id = confirmation
            .id
            .clone()
            .ok_or_else(|| RepositoryError::Query("missing id".to_string()))?;
        self.confirmations
            .lock()
            .unwrap()
            .insert(id, confirmation.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<PendingConfirmation>, RepositoryError> {
        Ok(self.confirmations.lock().unwrap().get(id).cloned())
    }

    async fn list(
        &self,
        user_id: &str,
        status: ConfirmationStatus,
        limit: i64,
    ) -> Result<Vec<PendingConfirmation>, RepositoryError> {
        let mut found: Vec<_> = self
            .confirmations
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.user_id == user_id && c.status == status)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        found.truncate(limit as usize);
        Ok(found)
    }

    async fn resolve(
        &self,
        id: &str,
        status: ConfirmationStatus,
        _resolved_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let mut map = self.confirmations.lock().unwrap();
        match map.get_mut(id) {
            Some(c) if c.status == ConfirmationStatus::Pending => {
                c.status = status;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn approve(
        &self,
        id: &str,
        fact: &UserFact,
        _resolved_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        if self.fail_fact_writes.load(Ordering::SeqCst) {
            return Err(RepositoryError::Query("user_facts unavailable".to_string()));
        }
        let mut map = self.confirmations.lock().unwrap();
        match map.get_mut(id) {
            Some(c) if c.status == ConfirmationStatus::Pending => {
                c.status = ConfirmationStatus::Approved;
            }
            _ => return Ok(false),
        }
        let mut facts = self.facts.lock().unwrap();
        facts.retain(|f| !(f.user_id == fact.user_id && f.fact_type == fact.fact_type));
        facts.push(fact.clone());
        Ok(true)
    }

    async fn find_pending(
        &self,
        user_id: &str,
        fact_type: FactType,
        new_value: &str,
    ) -> Result<Option<PendingConfirmation>, RepositoryError> {
        Ok(self
            .confirmations
            .lock()
            .unwrap()
            .values()
            .find(|c| {
                c.user_id == user_id
                    && c.fact_type == fact_type
                    && c.new_value == new_value
                    && c.status == ConfirmationStatus::Pending
            })
            .cloned())
    }

    async fn user_facts(&self, user_id: &str) -> Result<Vec<UserFact>, RepositoryError> {
        Ok(self
            .facts
            .lock()
            .unwrap()
            .iter()
            .filter(|f| f.user_id == user_id)
            .cloned()
            .collect())
    }
}
