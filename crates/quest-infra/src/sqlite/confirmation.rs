//! SQLite confirmation repository implementation.
//!
//! Implements `ConfirmationRepository` from `quest-core` with raw queries,
//! private Row structs and split reader/writer pool usage.

use chrono::{DateTime, SecondsFormat, Utc};
use quest_core::confirmation::repository::ConfirmationRepository;
use quest_types::confirmation::{ConfirmationStatus, PendingConfirmation};
use quest_types::error::RepositoryError;
use quest_types::fact::{FactType, UserFact};
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ConfirmationRepository`.
pub struct SqliteConfirmationRepository {
    pool: DatabasePool,
}

impl SqliteConfirmationRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

struct ConfirmationRow {
    id: String,
    user_id: String,
    fact_type: String,
    old_value: Option<String>,
    new_value: String,
    confidence: f64,
    context: String,
    status: String,
    created_at: String,
}

impl ConfirmationRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            fact_type: row.try_get("fact_type")?,
            old_value: row.try_get("old_value")?,
            new_value: row.try_get("new_value")?,
            confidence: row.try_get("confidence")?,
            context: row.try_get("context")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_confirmation(self) -> Result<PendingConfirmation, RepositoryError> {
        let fact_type: FactType = self
            .fact_type
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let status: ConfirmationStatus = self
            .status
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        Ok(PendingConfirmation {
            id: Some(self.id),
            user_id: self.user_id,
            fact_type,
            old_value: self.old_value,
            new_value: self.new_value,
            confidence: self.confidence,
            context: self.context,
            status,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

struct UserFactRow {
    user_id: String,
    fact_type: String,
    value: String,
    confidence: f64,
    updated_at: String,
}

impl UserFactRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            user_id: row.try_get("user_id")?,
            fact_type: row.try_get("fact_type")?,
            value: row.try_get("value")?,
            confidence: row.try_get("confidence")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_fact(self) -> Result<UserFact, RepositoryError> {
        let fact_type: FactType = self
            .fact_type
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;

        Ok(UserFact {
            user_id: self.user_id,
            fact_type,
            value: self.value,
            confidence: self.confidence,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

/// Fixed-width timestamps so `ORDER BY created_at` sorts chronologically.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

// ---------------------------------------------------------------------------
// ConfirmationRepository implementation
// ---------------------------------------------------------------------------

impl ConfirmationRepository for SqliteConfirmationRepository {
    async fn insert(&self, confirmation: &PendingConfirmation) -> Result<(), RepositoryError> {
        let id = confirmation
            .id
            .as_deref()
            .ok_or_else(|| RepositoryError::Query("confirmation id not assigned".to_string()))?;

        sqlx::query(
            r#"INSERT INTO pending_confirmations
               (id, user_id, fact_type, old_value, new_value, confidence, context, status, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(id)
        .bind(&confirmation.user_id)
        .bind(confirmation.fact_type.as_str())
        .bind(confirmation.old_value.as_deref())
        .bind(&confirmation.new_value)
        .bind(confirmation.confidence)
        .bind(&confirmation.context)
        .bind(confirmation.status.to_string())
        .bind(format_datetime(&confirmation.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                RepositoryError::Conflict(format!("confirmation '{id}' already exists"))
            }
            other => RepositoryError::Query(other.to_string()),
        })?;

        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<PendingConfirmation>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM pending_confirmations WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let row = ConfirmationRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(row.into_confirmation()?))
            }
            None => Ok(None),
        }
    }

    async fn list(
        &self,
        user_id: &str,
        status: ConfirmationStatus,
        limit: i64,
    ) -> Result<Vec<PendingConfirmation>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT * FROM pending_confirmations
               WHERE user_id = ? AND status = ?
               ORDER BY created_at DESC
               LIMIT ?"#,
        )
        .bind(user_id)
        .bind(status.to_string())
        .bind(limit)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter()
            .map(|row| {
                ConfirmationRow::from_row(row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?
                    .into_confirmation()
            })
            .collect()
    }

    async fn resolve(
        &self,
        id: &str,
        status: ConfirmationStatus,
        resolved_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE pending_confirmations SET status = ?, resolved_at = ? WHERE id = ? AND status = 'pending'",
        )
        .bind(status.to_string())
        .bind(format_datetime(&resolved_at))
        .bind(id)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn user_facts(&self, user_id: &str) -> Result<Vec<UserFact>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM user_facts WHERE user_id = ? ORDER BY fact_type")
            .bind(user_id)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter()
            .map(|row| {
                UserFactRow::from_row(row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?
                    .into_fact()
            })
            .collect()
    }

    async fn approve(
        &self,
        id: &str,
        fact: &UserFact,
        resolved_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        // Status change and accepted fact land together or not at all
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let result = sqlx::query(
            "UPDATE pending_confirmations SET status = ?, resolved_at = ? WHERE id = ? AND status = 'pending'",
        )
        .bind(ConfirmationStatus::Approved.to_string())
        .bind(format_datetime(&resolved_at))
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            // Dropping the transaction rolls it back.
            return Ok(false);
        }

        sqlx::query(
            r#"INSERT INTO user_facts (user_id, fact_type, value, confidence, updated_at)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT(user_id, fact_type) DO UPDATE SET
                   value = excluded.value,
                   confidence = excluded.confidence,
                   updated_at = excluded.updated_at"#,
        )
        .bind(&fact.user_id)
        .bind(fact.fact_type.as_str())
        .bind(&fact.value)
        .bind(fact.confidence)
        .bind(format_datetime(&fact.updated_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(true)
    }

    async fn find_pending(
        &self,
        user_id: &str,
        fact_type: FactType,
        new_value: &str,
    ) -> Result<Option<PendingConfirmation>, RepositoryError> {
        let row = sqlx::query(
            r#"SELECT * FROM pending_confirmations
               WHERE user_id = ? AND fact_type = ? AND new_value = ? AND status = 'pending'
               ORDER BY created_at DESC
               LIMIT 1"#,
        )
        .bind(user_id)
        .bind(fact_type.as_str())
        .bind(new_value)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let row = ConfirmationRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(row.into_confirmation()?))
            }
            None => Ok(None),
        }
    }
}
