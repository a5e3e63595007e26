//! PostgreSQL reads for the operator dashboard.

pub mod articles;
