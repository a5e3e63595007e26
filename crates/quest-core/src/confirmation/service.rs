//! ConfirmationService -- the create/list/approve/reject workflow.
//!
//! Status moves only from `pending` to `approved` or `rejected`. Approving
//! records the new value as the user's accepted fact and mirrors it to the
//! users knowledge graph (best-effort).

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use quest_types::confirmation::{ConfirmationStatus, PendingConfirmation};
use quest_types::error::{ConfirmationError, RepositoryError};
use quest_types::fact::{FactSync, UserFact};

use super::repository::ConfirmationRepository;
use crate::graph::KnowledgeGraph;

/// Newest-first page size for listings.
pub const LIST_LIMIT: i64 = 50;

pub struct ConfirmationService<R, G> {
    repo: Arc<R>,
    graph: Arc<G>,
}

impl<R, G> Clone for ConfirmationService<R, G> {
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            graph: self.graph.clone(),
        }
    }
}

impl<R: ConfirmationRepository, G: KnowledgeGraph> ConfirmationService<R, G> {
    pub fn new(repo: Arc<R>, graph: Arc<G>) -> Self {
        Self { repo, graph }
    }

    /// Persist a new pending confirmation and return it with its id.
    pub async fn create(
        &self,
        mut confirmation: PendingConfirmation,
    ) -> Result<PendingConfirmation, ConfirmationError> {
        if confirmation.user_id.trim().is_empty() {
            return Err(ConfirmationError::Invalid("user_id must not be empty".to_string()));
        }
        if !(0.0..=1.0).contains(&confirmation.confidence) {
            return Err(ConfirmationError::Invalid(format!(
                "confidence {} outside [0, 1]",
                confirmation.confidence
            )));
        }

        confirmation.id = Some(Uuid::now_v7().to_string());
        confirmation.status = ConfirmationStatus::Pending;
        confirmation.created_at = Utc::now();
        self.repo.insert(&confirmation).await?;

        tracing::info!(
            id = confirmation.id.as_deref().unwrap_or_default(),
            user_id = %confirmation.user_id,
            fact_type = %confirmation.fact_type,
            "confirmation created"
        );
        Ok(confirmation)
    }

    /// Persist every planned confirmation. Used by the chat completion flow.
    ///
    /// A change that is already awaiting the user's answer is returned as-is
    /// rather than recorded twice.
    pub async fn record_all(
        &self,
        planned: Vec<PendingConfirmation>,
    ) -> Result<Vec<PendingConfirmation>, ConfirmationError> {
        let mut created = Vec::with_capacity(planned.len());
        for confirmation in planned {
            let existing = self
                .repo
                .find_pending(&confirmation.user_id, confirmation.fact_type, &confirmation.new_value)
                .await?;
            match existing {
                Some(existing) => {
                    tracing::debug!(
                        id = existing.id.as_deref().unwrap_or_default(),
                        fact_type = %existing.fact_type,
                        "confirmation already pending"
                    );
                    created.push(existing);
                }
                None => created.push(self.create(confirmation).await?),
            }
        }
        Ok(created)
    }

    pub async fn list(
        &self,
        user_id: &str,
        status: ConfirmationStatus,
    ) -> Result<Vec<PendingConfirmation>, ConfirmationError> {
        Ok(self.repo.list(user_id, status, LIST_LIMIT).await?)
    }

    /// Facts the user has accepted so far.
    pub async fn accepted_facts(&self, user_id: &str) -> Result<Vec<UserFact>, RepositoryError> {
        self.repo.user_facts(user_id).await
    }

    #[tracing::instrument(name = "approve_confirmation", skip(self))]
    pub async fn approve(
        &self,
        id: &str,
        user_id: &str,
    ) -> Result<PendingConfirmation, ConfirmationError> {
        let mut confirmation = self.pending_for(id, user_id).await?;

        let fact = UserFact {
            user_id: user_id.to_string(),
            fact_type: confirmation.fact_type,
            value: confirmation.new_value.clone(),
            confidence: confirmation.confidence,
            updated_at: Utc::now(),
        };
        if !self.repo.approve(id, &fact, Utc::now()).await? {
            return Err(already_resolved(id));
        }
        tracing::info!(id, user_id, status = %ConfirmationStatus::Approved, "confirmation resolved");

        let sync = [FactSync {
            fact_type: fact.fact_type,
            value: fact.value.clone(),
            confidence: fact.confidence,
        }];
        let outcome = self.graph.write_facts(user_id, &sync).await;
        tracing::debug!(outcome = outcome.label(), "approved fact synced to graph");

        confirmation.status = ConfirmationStatus::Approved;
        Ok(confirmation)
    }

    #[tracing::instrument(name = "reject_confirmation", skip(self))]
    pub async fn reject(
        &self,
        id: &str,
        user_id: &str,
    ) -> Result<PendingConfirmation, ConfirmationError> {
        let mut confirmation = self.pending_for(id, user_id).await?;
        if !self.repo.resolve(id, ConfirmationStatus::Rejected, Utc::now()).await? {
            return Err(already_resolved(id));
        }
        tracing::info!(id, user_id, status = %ConfirmationStatus::Rejected, "confirmation resolved");

        confirmation.status = ConfirmationStatus::Rejected;
        Ok(confirmation)
    }

    /// Load a confirmation owned by `user_id` that is still pending.
    async fn pending_for(
        &self,
        id: &str,
        user_id: &str,
    ) -> Result<PendingConfirmation, ConfirmationError> {
        // Another user's confirmation is indistinguishable from a missing one.
        let confirmation = self
            .repo
            .get(id)
            .await?
            .filter(|c| c.user_id == user_id)
            .ok_or_else(|| ConfirmationError::NotFound(id.to_string()))?;

        if confirmation.status.is_resolved() {
            return Err(ConfirmationError::AlreadyResolved {
                id: id.to_string(),
                status: confirmation.status.to_string(),
            });
        }
        Ok(confirmation)
    }
}

/// Lost a race with a concurrent resolution.
fn already_resolved(id: &str) -> ConfirmationError {
    ConfirmationError::AlreadyResolved {
        id: id.to_string(),
        status: "resolved".to_string(),
    }
}
