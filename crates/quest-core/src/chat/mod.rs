//! Chat gateway: persona prompts, history windowing, and the hosted model call.

pub mod gateway;
pub mod prompt;
