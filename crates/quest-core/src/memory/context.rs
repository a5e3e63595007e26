//! Memory-backed prompt context and conversation persistence.

use quest_types::outcome::StoreOutcome;

use super::store::MemoryStore;

/// Memories pulled into a chat prompt.
pub const CONTEXT_LIMIT: usize = 3;

/// Render recalled memories as a prompt context block, or `""` when none.
pub fn format_context(memories: &[String]) -> String {
    if memories.is_empty() {
        return String::new();
    }
    let lines: Vec<String> = memories.iter().map(|m| format!("- {m}")).collect();
    format!("Previous relevant context:\n{}", lines.join("\n"))
}

/// Context for the user's current message.
pub async fn relevant_context<M: MemoryStore>(memory: &M, user_id: &str, message: &str) -> String {
    let memories = memory.search(user_id, message, CONTEXT_LIMIT).await;
    format_context(&memories)
}

/// Persist one user/assistant exchange.
pub async fn store_conversation<M: MemoryStore>(
    memory: &M,
    user_id: &str,
    session_id: &str,
    user_message: &str,
    assistant_reply: &str,
) -> StoreOutcome {
    let content = format!("User: {user_message}\nAssistant: {assistant_reply}");
    let metadata = serde_json::json!({
        "session_id": session_id,
        "type": "conversation",
    });
    memory.store(user_id, &content, metadata).await
}
