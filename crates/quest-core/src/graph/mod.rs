//! Knowledge-graph port and article recommendation shaping.

pub mod recommend;

use quest_types::chat::Persona;
use quest_types::fact::FactSync;
use quest_types::outcome::StoreOutcome;

/// Hosted knowledge graph with per-application content graphs and a
/// per-user facts graph.
///
/// Same contract as [`crate::memory::store::MemoryStore`]: no call ever
/// fails, missing configuration or transport errors produce neutral values.
pub trait KnowledgeGraph: Send + Sync {
    /// Content graph searched for a persona; `None` when not configured.
    fn content_graph_id(&self, persona: Persona) -> Option<&str>;

    /// Search one graph. Raw result objects as returned by the service.
    fn search(
        &self,
        graph_id: &str,
        query: &str,
        limit: usize,
    ) -> impl std::future::Future<Output = Vec<serde_json::Value>> + Send;

    /// Read a user's node in the users graph.
    fn read_user(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Option<serde_json::Value>> + Send;

    /// Write facts into the user's graph.
    fn write_facts(
        &self,
        user_id: &str,
        facts: &[FactSync],
    ) -> impl std::future::Future<Output = StoreOutcome> + Send;

    /// Append a free-text memory to the user's graph.
    fn append_memory(
        &self,
        user_id: &str,
        content: &str,
        metadata: serde_json::Value,
    ) -> impl std::future::Future<Output = StoreOutcome> + Send;
}
