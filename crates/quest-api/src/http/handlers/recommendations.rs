//! Article recommendations from the persona's content graph.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use quest_core::graph::recommend::{DEFAULT_RECOMMENDATION_LIMIT, recommend};
use quest_types::article::ArticleRecommendation;
use quest_types::chat::Persona;

use crate::http::error::AppError;
use crate::http::extractors::json::ApiJson;
use crate::state::AppState;

const MAX_LIMIT: usize = 50;

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub query: String,
    #[serde(default)]
    pub app_type: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

/// POST /recommendations
pub async fn recommendations(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RecommendationRequest>,
) -> Result<Json<Vec<ArticleRecommendation>>, AppError> {
    if body.query.trim().is_empty() {
        return Err(AppError::Validation("query must not be empty".to_string()));
    }
    let persona = Persona::from_app_type(body.app_type.as_deref());
    let limit = body
        .limit
        .unwrap_or(DEFAULT_RECOMMENDATION_LIMIT)
        .clamp(1, MAX_LIMIT);

    let articles = recommend(state.graph.as_ref(), persona, &body.query, limit).await;
    Ok(Json(articles))
}
