//! Long-term conversation memory port and the helpers built on it.

pub mod context;
pub mod store;
