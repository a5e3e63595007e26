//! HTTP request handlers.

pub mod chat;
pub mod facts;
pub mod health;
pub mod hitl;
pub mod recommendations;
