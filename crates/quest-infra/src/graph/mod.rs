//! Knowledge-graph service adapters.

pub mod zep;
