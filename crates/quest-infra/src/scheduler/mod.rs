//! Supervision of the external article scheduler process.

pub mod supervisor;
