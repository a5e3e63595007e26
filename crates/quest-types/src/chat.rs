//! Chat request/response shapes and the persona selector.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::article::ArticleRecommendation;
use crate::confirmation::PendingConfirmation;
use crate::fact::ExtractedFact;

// Re-export MessageRole from llm module (it's used in both chat and llm contexts).
pub use crate::llm::MessageRole;

/// A role-tagged chat message. The ordered sequence forms the conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Which fixed prompt template drives the assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    #[default]
    Relocation,
    Placement,
}

impl Persona {
    /// Select a persona from the free-form `app_type` request field.
    ///
    /// Only `"placement"` selects the placement persona; anything else,
    /// including an absent value, falls back to relocation.
    pub fn from_app_type(app_type: Option<&str>) -> Self {
        match app_type {
            Some(value) if value.eq_ignore_ascii_case("placement") => Persona::Placement,
            _ => Persona::Relocation,
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Persona::Relocation => write!(f, "relocation"),
            Persona::Placement => write!(f, "placement"),
        }
    }
}

impl FromStr for Persona {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "relocation" => Ok(Persona::Relocation),
            "placement" => Ok(Persona::Placement),
            other => Err(format!("invalid persona: '{other}'")),
        }
    }
}

/// Body of `POST /chat/complete`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub app_type: Option<String>,
}

/// Response from `POST /chat/complete` (non-streaming).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: String,
    #[serde(default)]
    pub extracted_facts: Vec<ExtractedFact>,
    #[serde(default)]
    pub pending_confirmations: Vec<PendingConfirmation>,
    #[serde(default)]
    pub recommendations: Vec<ArticleRecommendation>,
}
