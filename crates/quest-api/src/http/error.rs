//! Application error type mapping to HTTP status codes.
//!
//! Error bodies look like:
//! ```json
//! { "detail": "...", "errors": [{ "code": "...", "message": "..." }], "meta": { "timestamp": "..." } }
//! ```

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use quest_types::error::{
    ChatInputError, ConfirmationError, ConversationError, ExtractionError, RepositoryError,
};

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Malformed or incomplete client input.
    Validation(String),
    NotFound(String),
    Conflict(String),
    /// Model, extraction and storage failures; the raw text is reported.
    Internal(String),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, &str) {
        match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
        }
    }
}

impl From<ChatInputError> for AppError {
    fn from(e: ChatInputError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<ExtractionError> for AppError {
    fn from(e: ExtractionError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<RepositoryError> for AppError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => AppError::NotFound(e.to_string()),
            RepositoryError::Conflict(_) => AppError::Conflict(e.to_string()),
            _ => AppError::Internal(e.to_string()),
        }
    }
}

impl From<ConfirmationError> for AppError {
    fn from(e: ConfirmationError) -> Self {
        match e {
            ConfirmationError::NotFound(_) => AppError::NotFound(e.to_string()),
            ConfirmationError::AlreadyResolved { .. } => AppError::Conflict(e.to_string()),
            ConfirmationError::Invalid(msg) => AppError::Validation(msg),
            ConfirmationError::Repository(inner) => inner.into(),
        }
    }
}

impl From<ConversationError> for AppError {
    fn from(e: ConversationError) -> Self {
        match e {
            ConversationError::Input(inner) => inner.into(),
            ConversationError::Confirmation(inner) => inner.into(),
            ConversationError::Repository(inner) => inner.into(),
            ConversationError::Llm(_) | ConversationError::Extraction(_) => {
                AppError::Internal(e.to_string())
            }
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::Validation(e.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(e: QueryRejection) -> Self {
        AppError::Validation(e.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(e: PathRejection) -> Self {
        AppError::Validation(e.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();

        if status.is_server_error() {
            tracing::error!(code, error = %message, "request failed");
        } else {
            tracing::debug!(code, error = %message, "request rejected");
        }

        let body = json!({
            "detail": message,
            "errors": [{
                "code": code,
                "message": message,
            }],
            "meta": {
                "timestamp": chrono::Utc::now().to_rfc3339(),
            }
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
