//! Infrastructure layer for Quest.
//!
//! Implements the ports defined in `quest-core`:
//! - the hosted model provider (OpenAI-compatible chat completions)
//! - SuperMemory and Zep HTTP clients with explicit configured/unconfigured variants
//! - SQLite persistence for confirmations and accepted facts
//! - PostgreSQL reads for the article dashboard
//! - the scheduler supervisor (PID/pause files, liveness, signals)
//! - environment configuration loading

pub mod config;
pub mod graph;
pub mod http;
pub mod llm;
pub mod memory;
pub mod postgres;
pub mod scheduler;
pub mod sqlite;
