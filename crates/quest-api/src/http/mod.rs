//! HTTP API for Quest.
//!
//! Axum routes for chat, fact extraction, recommendations and the
//! human-in-the-loop confirmation workflow, with CORS and request tracing.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
