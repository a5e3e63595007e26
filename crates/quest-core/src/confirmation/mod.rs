//! Human-in-the-loop confirmation of extracted facts.
//!
//! - `policy`: which facts need a human decision
//! - `repository`: persistence port for confirmations and accepted facts
//! - `service`: create/list/approve/reject workflow

pub mod policy;
pub mod repository;
pub mod service;
