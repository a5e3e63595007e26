//! Fact and user-condition extraction handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde::Deserialize;

use quest_types::chat::ChatMessage;
use quest_types::fact::{ExtractedFact, FactExtractionResult, UserConditions};

use crate::http::error::AppError;
use crate::http::extractors::json::{ApiJson, ApiQuery};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExtractFactsRequest {
    pub text: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub existing_facts: Vec<ExtractedFact>,
}

/// `/extract-facts` also accepts its scalar inputs as query parameters.
#[derive(Debug, Deserialize)]
pub struct ExtractFactsQuery {
    pub text: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ExtractConditionsRequest {
    pub messages: Vec<ChatMessage>,
}

/// POST /extract-facts
///
/// Reads a JSON body when one is sent, otherwise `?text=&user_id=`.
pub async fn extract_facts(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ExtractFactsQuery>,
    body: Bytes,
) -> Result<Json<FactExtractionResult>, AppError> {
    let request = extract_facts_request(query, &body)?;
    let result = state
        .facts
        .extract_and_sync(&request.text, request.user_id.as_deref(), &request.existing_facts)
        .await?;
    Ok(Json(result))
}

fn extract_facts_request(query: ExtractFactsQuery, body: &[u8]) -> Result<ExtractFactsRequest, AppError> {
    if !body.iter().all(u8::is_ascii_whitespace) {
        let mut request: ExtractFactsRequest = serde_json::from_slice(body)
            .map_err(|e| AppError::Validation(format!("invalid JSON body: {e}")))?;
        if request.user_id.is_none() {
            request.user_id = query.user_id;
        }
        return Ok(request);
    }

    let text = query
        .text
        .ok_or_else(|| AppError::Validation("text is required".to_string()))?;
    Ok(ExtractFactsRequest {
        text,
        user_id: query.user_id,
        existing_facts: Vec::new(),
    })
}

/// POST /extract-conditions
pub async fn extract_conditions(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ExtractConditionsRequest>,
) -> Result<Json<UserConditions>, AppError> {
    if body.messages.is_empty() {
        return Err(AppError::Validation("No messages provided".to_string()));
    }
    let conditions = state.conditions.extract(&body.messages).await?;
    Ok(Json(conditions))
}
