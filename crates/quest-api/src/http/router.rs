//! Axum router configuration with middleware.
//!
//! Routes sit at the root, matching the paths the browser frontends call.
//! Middleware: CORS restricted to the configured origins, request tracing.

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(handlers::health::root))
        .route("/health", get(handlers::health::health))
        // Chat
        .route("/chat", post(handlers::chat::chat))
        .route("/chat/complete", post(handlers::chat::chat_complete))
        // Extraction
        .route("/extract-facts", post(handlers::facts::extract_facts))
        .route("/extract-conditions", post(handlers::facts::extract_conditions))
        .route("/recommendations", post(handlers::recommendations::recommendations))
        // Human-in-the-loop confirmations
        .route(
            "/hitl/pending",
            get(handlers::hitl::list_pending).post(handlers::hitl::create_pending),
        )
        .route("/hitl/approve/{id}", post(handlers::hitl::approve))
        .route("/hitl/reject/{id}", post(handlers::hitl::reject))
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request());

    // A literal `*` cannot be combined with credentials; echo the caller's origin instead.
    if origins.iter().any(|origin| origin.trim() == "*") {
        tracing::warn!("CORS wildcard configured; any origin is allowed with credentials");
        return layer.allow_origin(AllowOrigin::mirror_request());
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(AllowOrigin::list(allowed))
}
