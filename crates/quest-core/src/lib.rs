//! Business logic and port trait definitions for Quest.
//!
//! This crate defines the "ports" (provider, memory, graph and repository
//! traits) that the infrastructure layer implements, plus the chat gateway,
//! the extractors and the confirmation policy. It depends only on
//! `quest-types` -- never on `quest-infra` or any HTTP/database crate.

pub mod chat;
pub mod confirmation;
pub mod extract;
pub mod graph;
pub mod llm;
pub mod memory;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;
