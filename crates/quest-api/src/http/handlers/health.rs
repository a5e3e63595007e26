//! Liveness endpoints.

use axum::Json;
use serde_json::{Value, json};

/// GET /
pub async fn root() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "quest-api" }))
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
