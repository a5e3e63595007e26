//! Schema-constrained extraction of facts and user conditions.

pub mod conditions;
pub mod facts;
