//! LLM provider abstractions for Quest.
//!
//! - `LlmProvider`: RPITIT trait for concrete provider implementations
//! - `BoxLlmProvider`: Object-safe wrapper for dynamic dispatch
//! - `structured`: schema-constrained completion helpers

pub mod box_provider;
pub mod provider;
pub mod structured;
