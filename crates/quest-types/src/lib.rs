//! Shared domain types for Quest.
//!
//! Data-transfer shapes exchanged between the HTTP API, the hosted model,
//! the memory and knowledge-graph services, and the operator dashboard,
//! together with their error enums.
//!
//! Zero infrastructure dependencies -- only serde, chrono, thiserror, schemars, secrecy.

pub mod article;
pub mod chat;
pub mod config;
pub mod confirmation;
pub mod dashboard;
pub mod error;
pub mod fact;
pub mod llm;
pub mod outcome;
