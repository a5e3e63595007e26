//! Persona system prompts and deterministic conversation rendering.
//!
//! The rendered user prompt has the layout:
//! ```text
//! Context: {context}
//!
//! Conversation:
//! {role}: {content}
//! ...
//!
//! Respond as Quest, the {persona} assistant.
//! ```

use quest_types::chat::{ChatMessage, Persona};

/// Most recent messages forwarded to the model.
pub const HISTORY_WINDOW: usize = 10;

const RELOCATION_SYSTEM_PROMPT: &str = r#"You are Quest, a friendly and knowledgeable relocation assistant.

Your role is to help users plan their international relocation by:
1. Understanding their current situation and preferences
2. Providing helpful information about destinations
3. Answering questions about visas, cost of living, healthcare, etc.
4. Recommending relevant articles and resources

Be conversational, empathetic, and helpful. Ask clarifying questions when needed.
When users share information about themselves, acknowledge it naturally in conversation.

Important: Extract and remember key facts about the user such as:
- Their name and current location
- Destination preferences (countries they're considering)
- Family situation (partner, children)
- Job status (employed, seeking, remote, retired)
- Budget constraints
- Timeline for moving

Always be encouraging and supportive of their relocation journey."#;

const PLACEMENT_SYSTEM_PROMPT: &str = r#"You are Quest, a professional career placement assistant.

Your role is to help users with their international job search by:
1. Understanding their skills, experience, and career goals
2. Providing information about job markets in different countries
3. Helping with resume/CV optimization for international applications
4. Sharing insights about work permits and visa requirements

Be professional yet approachable. Ask relevant questions about their background.

Extract key facts about the user such as:
- Their name and current location
- Target countries for job search
- Industry and role preferences
- Years of experience
- Salary expectations
- Remote work preferences

Always be supportive and provide actionable advice."#;

/// Fixed system framing for a persona.
pub fn system_prompt(persona: Persona) -> &'static str {
    match persona {
        Persona::Relocation => RELOCATION_SYSTEM_PROMPT,
        Persona::Placement => PLACEMENT_SYSTEM_PROMPT,
    }
}

/// The last [`HISTORY_WINDOW`] messages, in original order.
pub fn window(messages: &[ChatMessage]) -> &[ChatMessage] {
    let start = messages.len().saturating_sub(HISTORY_WINDOW);
    &messages[start..]
}

/// Render `role: content` lines, one per message.
pub fn render_conversation(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the user prompt for a chat turn.
pub fn render_prompt(persona: Persona, messages: &[ChatMessage], context: &str) -> String {
    format!(
        "Context: {context}\n\nConversation:\n{}\n\nRespond as Quest, the {persona} assistant.",
        render_conversation(window(messages))
    )
}
