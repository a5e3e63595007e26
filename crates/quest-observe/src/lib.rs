//! Observability setup for Quest: structured logging and optional
//! OpenTelemetry span export.

pub mod tracing_setup;
