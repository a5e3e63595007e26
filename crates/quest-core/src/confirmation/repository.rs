//! ConfirmationRepository trait definition.

use chrono::{DateTime, Utc};

use quest_types::confirmation::{ConfirmationStatus, PendingConfirmation};
use quest_types::error::RepositoryError;
use quest_types::fact::{FactType, UserFact};

/// Repository for pending confirmations and the facts users have accepted.
///
/// Implementations live in quest-infra (e.g., `SqliteConfirmationRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait ConfirmationRepository: Send + Sync {
    /// Insert a confirmation. `id` must already be assigned.
    fn insert(
        &self,
        confirmation: &PendingConfirmation,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    fn get(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<PendingConfirmation>, RepositoryError>> + Send;

    /// A user's confirmations with the given status, newest first.
    fn list(
        &self,
        user_id: &str,
        status: ConfirmationStatus,
        limit: i64,
    ) -> impl std::future::Future<Output = Result<Vec<PendingConfirmation>, RepositoryError>> + Send;

    /// Move a confirmation out of `pending`.
    ///
    /// Returns `false` when no pending row with this id exists, so two
    /// concurrent resolutions cannot both succeed.
    fn resolve(
        &self,
        id: &str,
        status: ConfirmationStatus,
        resolved_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Approve a pending confirmation and record `fact` as the user's
    /// accepted value for its fact type, as one unit.
    ///
    /// Returns `false` (and writes nothing) when no pending row with this
    /// id exists. If the fact write fails the confirmation stays pending.
    fn approve(
        &self,
        id: &str,
        fact: &UserFact,
        resolved_at: DateTime<Utc>,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// A still-pending confirmation proposing exactly this change, if any.
    fn find_pending(
        &self,
        user_id: &str,
        fact_type: FactType,
        new_value: &str,
    ) -> impl std::future::Future<Output = Result<Option<PendingConfirmation>, RepositoryError>> + Send;

    /// Accepted facts for a user, one per fact type.
    fn user_facts(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<UserFact>, RepositoryError>> + Send;
}
