use thiserror::Error;

use crate::llm::LlmError;

/// Errors from repository operations (used by trait definitions in quest-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors from the human-in-the-loop confirmation workflow.
#[derive(Debug, Error)]
pub enum ConfirmationError {
    #[error("confirmation '{0}' not found")]
    NotFound(String),

    #[error("confirmation '{id}' already {status}")]
    AlreadyResolved { id: String, status: String },

    #[error("invalid confirmation: {0}")]
    Invalid(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Errors from schema-constrained extraction calls.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("model output does not match the declared schema: {0}")]
    SchemaValidation(String),
}

/// Client input problems detected before any outbound call.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChatInputError {
    #[error("No messages provided")]
    NoMessages,

    #[error("Last message must be from user")]
    LastMessageNotUser,

    #[error("No user message found")]
    NoUserMessage,
}

/// Errors from a full conversation turn.
#[derive(Debug, Error)]
pub enum ConversationError {
    #[error(transparent)]
    Input(#[from] ChatInputError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Confirmation(#[from] ConfirmationError),
}

/// Errors while assembling configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}'")]
    InvalidValue { key: String, value: String },
}
