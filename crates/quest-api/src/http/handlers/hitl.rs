//! Human-in-the-loop confirmation handlers.
//!
//! Every resolution is scoped to a user: a confirmation that belongs to a
//! different user is reported as not found.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};

use quest_types::confirmation::{ConfirmationStatus, PendingConfirmation};

use crate::http::error::AppError;
use crate::http::extractors::json::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    #[serde(default)]
    pub user_id: Option<String>,
}

fn require_user(user_id: Option<String>) -> Result<String, AppError> {
    user_id
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| AppError::Validation("user_id is required".to_string()))
}

/// POST /hitl/pending - record a confirmation awaiting the user's decision.
pub async fn create_pending(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<PendingConfirmation>,
) -> Result<Json<Value>, AppError> {
    let confirmation = state.confirmations.create(body).await?;
    Ok(Json(json!({
        "status": "created",
        "id": confirmation.id,
        "confirmation": confirmation,
    })))
}

/// GET /hitl/pending?user_id=&status=
pub async fn list_pending(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListQuery>,
) -> Result<Json<Value>, AppError> {
    let user_id = require_user(query.user_id)?;
    let status = match query.status.as_deref() {
        Some(s) => s.parse::<ConfirmationStatus>().map_err(AppError::Validation)?,
        None => ConfirmationStatus::Pending,
    };

    let confirmations = state.confirmations.list(&user_id, status).await?;
    Ok(Json(json!({ "confirmations": confirmations })))
}

/// POST /hitl/approve/{id}?user_id=
pub async fn approve(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiQuery(query): ApiQuery<UserQuery>,
) -> Result<Json<Value>, AppError> {
    let user_id = require_user(query.user_id)?;
    state.confirmations.approve(&id, &user_id).await?;
    Ok(Json(json!({ "status": "approved", "id": id })))
}

/// POST /hitl/reject/{id}?user_id=
pub async fn reject(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<String>,
    ApiQuery(query): ApiQuery<UserQuery>,
) -> Result<Json<Value>, AppError> {
    let user_id = require_user(query.user_id)?;
    state.confirmations.reject(&id, &user_id).await?;
    Ok(Json(json!({ "status": "rejected", "id": id })))
}
