//! Use-case services behind the HTTP endpoints.
//!
//! Services orchestrate the gateway, extractors and ports. They depend on
//! traits -- never on concrete infrastructure implementations.

pub mod conversation;
pub mod facts;
