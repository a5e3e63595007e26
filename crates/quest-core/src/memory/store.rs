//! MemoryStore trait definition.

use quest_types::outcome::StoreOutcome;

/// Best-effort long-term memory service.
///
/// Implementations never fail: an unconfigured or unreachable service
/// yields `StoreOutcome::Skipped`/`StoreOutcome::Error` on writes and an
/// empty list on searches.
pub trait MemoryStore: Send + Sync {
    /// Store a memory for a user.
    fn store(
        &self,
        user_id: &str,
        content: &str,
        metadata: serde_json::Value,
    ) -> impl std::future::Future<Output = StoreOutcome> + Send;

    /// Natural-language search over a user's memories.
    fn search(
        &self,
        user_id: &str,
        query: &str,
        limit: usize,
    ) -> impl std::future::Future<Output = Vec<String>> + Send;
}
