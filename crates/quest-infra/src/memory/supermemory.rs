//! SuperMemory HTTP client.
//!
//! Implements [`MemoryStore`]. The client is either `Configured` (has an
//! API key) or `Unconfigured`; the unconfigured variant answers every call
//! with a neutral value without touching the network. Transport and status
//! failures are logged and folded into [`StoreOutcome::Error`] or an empty
//! search result.

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};

use quest_core::memory::store::MemoryStore;
use quest_types::config::MemoryConfig;
use quest_types::outcome::StoreOutcome;

use crate::http::{SERVICE_TIMEOUT, client_with_timeout, join_url};

const NOT_CONFIGURED: &str = "No API key configured";

pub enum SuperMemoryClient {
    Configured {
        client: reqwest::Client,
        base_url: String,
        api_key: SecretString,
    },
    Unconfigured,
}

impl SuperMemoryClient {
    pub fn new(base_url: impl Into<String>, api_key: SecretString) -> Self {
        Self::Configured {
            client: client_with_timeout(SERVICE_TIMEOUT),
            base_url: base_url.into(),
            api_key,
        }
    }

    pub fn from_config(config: &MemoryConfig) -> Self {
        match config.api_key() {
            Some(key) => Self::new(config.base_url.clone(), key.clone()),
            None => {
                tracing::info!("SUPERMEMORY_API_KEY not set; long-term memory disabled");
                Self::Unconfigured
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Configured { .. })
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, String> {
        let Self::Configured {
            client,
            base_url,
            api_key,
        } = self
        else {
            return Err(NOT_CONFIGURED.to_string());
        };

        let response = client
            .post(join_url(base_url, path))
            .bearer_auth(api_key.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| format!("HTTP request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(format!("HTTP {status}: {text}"));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| format!("invalid JSON response: {e}"))
    }
}

impl MemoryStore for SuperMemoryClient {
    #[tracing::instrument(name = "memory.store", skip_all, fields(user_id = %user_id))]
    async fn store(&self, user_id: &str, content: &str, metadata: Value) -> StoreOutcome {
        if !self.is_configured() {
            return StoreOutcome::skipped(NOT_CONFIGURED);
        }

        let body = json!({
            "user_id": user_id,
            "content": content,
            "metadata": metadata,
        });

        match self.post("memory", &body).await {
            Ok(response) => StoreOutcome::Stored { response },
            Err(error) => {
                tracing::warn!(%error, "memory store failed");
                StoreOutcome::error(error)
            }
        }
    }

    #[tracing::instrument(name = "memory.search", skip_all, fields(user_id = %user_id, limit = limit))]
    async fn search(&self, user_id: &str, query: &str, limit: usize) -> Vec<String> {
        if !self.is_configured() {
            return Vec::new();
        }

        let body = json!({
            "user_id": user_id,
            "query": query,
            "limit": limit,
        });

        match self.post("memory/search", &body).await {
            Ok(response) => search_results(&response),
            Err(error) => {
                tracing::warn!(%error, "memory search failed");
                Vec::new()
            }
        }
    }
}

/// Strings from the `results` array; other entries rendered as JSON text.
fn search_results(response: &Value) -> Vec<String> {
    response
        .get("results")
        .and_then(Value::as_array)
        .map(|results| {
            results
                .iter()
                .map(|r| match r {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}
