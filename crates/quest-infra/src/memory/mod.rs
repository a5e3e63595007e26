//! Long-term memory service adapters.

pub mod supermemory;
