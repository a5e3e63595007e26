//! Chat handlers: plain-text replies and full completion turns.

use axum::Json;
use axum::extract::State;

use quest_types::chat::{ChatRequest, ChatResponse, Persona};

use crate::http::error::AppError;
use crate::http::extractors::json::ApiJson;
use crate::state::AppState;

/// POST /chat - the model's raw reply as `text/plain`.
pub async fn chat(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ChatRequest>,
) -> Result<String, AppError> {
    let persona = Persona::from_app_type(body.app_type.as_deref());
    let reply = state
        .conversation
        .chat(&body.messages, body.user_id.as_deref(), persona)
        .await?;
    Ok(reply)
}

/// POST /chat/complete - reply plus extracted facts and pending confirmations.
pub async fn chat_complete(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let response = state.conversation.complete(body).await?;
    Ok(Json(response))
}
