//! Shared `reqwest` client construction for the hosted-service adapters.

use std::time::Duration;

/// Per-call timeout for the memory and graph services.
pub const SERVICE_TIMEOUT: Duration = Duration::from_secs(30);

/// Build a client with a fixed request timeout.
///
/// Falls back to a default client if the TLS backend cannot be initialised
/// with custom settings; requests then simply carry no timeout.
pub fn client_with_timeout(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to build HTTP client; using defaults");
            reqwest::Client::new()
        })
}

/// Join a base URL and a path without doubling slashes.
pub fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
