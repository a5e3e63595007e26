//! Zep knowledge-graph client.
//!
//! Implements [`KnowledgeGraph`] over the Zep REST API. Per-application
//! content graphs only need an API key; per-user operations additionally
//! need the users graph id. Anything missing turns the call into a no-op.

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};

use quest_core::graph::KnowledgeGraph;
use quest_types::chat::Persona;
use quest_types::config::GraphConfig;
use quest_types::fact::FactSync;
use quest_types::outcome::StoreOutcome;

use crate::http::{SERVICE_TIMEOUT, client_with_timeout, join_url};

const NOT_CONFIGURED: &str = "ZEP not configured";

/// Graph ids a configured client works with. Empty strings mean "not set".
#[derive(Debug, Clone, Default)]
pub struct GraphIds {
    pub relocation: String,
    pub placement: String,
    pub users: String,
}

pub enum ZepClient {
    Configured {
        client: reqwest::Client,
        base_url: String,
        api_key: SecretString,
        graphs: GraphIds,
    },
    Unconfigured,
}

impl ZepClient {
    pub fn new(base_url: impl Into<String>, api_key: SecretString, graphs: GraphIds) -> Self {
        Self::Configured {
            client: client_with_timeout(SERVICE_TIMEOUT),
            base_url: base_url.into(),
            api_key,
            graphs,
        }
    }

    pub fn from_config(config: &GraphConfig) -> Self {
        match config.api_key() {
            Some(key) => Self::new(
                config.base_url.clone(),
                key.clone(),
                GraphIds {
                    relocation: config.relocation_graph_id.clone(),
                    placement: config.placement_graph_id.clone(),
                    users: config.users_graph_id.clone(),
                },
            ),
            None => {
                tracing::info!("ZEP_API_KEY not set; knowledge graph disabled");
                Self::Unconfigured
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Configured { .. })
    }

    /// `graphs/{users}/users/{user_id}` when the users graph is set.
    fn user_path(&self, user_id: &str) -> Option<String> {
        match self {
            Self::Configured { graphs, .. } if !graphs.users.is_empty() => {
                Some(format!("graphs/{}/users/{}", graphs.users, user_id))
            }
            _ => None,
        }
    }

    async fn send(&self, method: reqwest::Method, path: &str, body: Option<&Value>) -> Result<Value, String> {
        let Self::Configured {
            client,
            base_url,
            api_key,
            ..
        } = self
        else {
            return Err(NOT_CONFIGURED.to_string());
        };

        let mut request = client
            .request(method, join_url(base_url, path))
            .header("Authorization", format!("Api-Key {}", api_key.expose_secret()));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
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

    async fn write_user(&self, user_id: &str, suffix: &str, body: Value) -> StoreOutcome {
        let Some(path) = self.user_path(user_id) else {
            return StoreOutcome::skipped(NOT_CONFIGURED);
        };

        match self
            .send(reqwest::Method::POST, &format!("{path}/{suffix}"), Some(&body))
            .await
        {
            Ok(response) => StoreOutcome::Stored { response },
            Err(error) => {
                tracing::warn!(%error, suffix, "graph write failed");
                StoreOutcome::error(error)
            }
        }
    }
}

impl KnowledgeGraph for ZepClient {
    fn content_graph_id(&self, persona: Persona) -> Option<&str> {
        let Self::Configured { graphs, .. } = self else {
            return None;
        };
        let id = match persona {
            Persona::Relocation => graphs.relocation.as_str(),
            Persona::Placement => graphs.placement.as_str(),
        };
        Some(id).filter(|id| !id.is_empty())
    }

    #[tracing::instrument(name = "graph.search", skip_all, fields(graph_id = %graph_id, limit = limit))]
    async fn search(&self, graph_id: &str, query: &str, limit: usize) -> Vec<Value> {
        if !self.is_configured() || graph_id.is_empty() {
            return Vec::new();
        }

        let body = json!({ "query": query, "limit": limit });
        match self
            .send(reqwest::Method::POST, &format!("graphs/{graph_id}/search"), Some(&body))
            .await
        {
            Ok(response) => response
                .get("results")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default(),
            Err(error) => {
                tracing::warn!(%error, "graph search failed");
                Vec::new()
            }
        }
    }

    #[tracing::instrument(name = "graph.read_user", skip_all, fields(user_id = %user_id))]
    async fn read_user(&self, user_id: &str) -> Option<Value> {
        let path = self.user_path(user_id)?;
        match self.send(reqwest::Method::GET, &path, None).await {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::debug!(%error, "graph read failed");
                None
            }
        }
    }

    #[tracing::instrument(name = "graph.write_facts", skip_all, fields(user_id = %user_id, count = facts.len()))]
    async fn write_facts(&self, user_id: &str, facts: &[FactSync]) -> StoreOutcome {
        self.write_user(user_id, "facts", json!({ "facts": facts })).await
    }

    #[tracing::instrument(name = "graph.append_memory", skip_all, fields(user_id = %user_id))]
    async fn append_memory(&self, user_id: &str, content: &str, metadata: Value) -> StoreOutcome {
        let metadata = if metadata.is_null() { json!({}) } else { metadata };
        self.write_user(
            user_id,
            "memory",
            json!({ "content": content, "metadata": metadata }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, State};
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use quest_types::fact::FactType;

    type Seen = Arc<Mutex<Vec<(String, String, Value)>>>;

    async fn spawn_server(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/api/v2")
    }

    fn auth(headers: &HeaderMap) -> String {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    fn router(seen: Seen) -> Router {
        Router::new()
            .route(
                "/api/v2/graphs/{graph}/search",
                post(
                    |Path(graph): Path<String>, State(seen): State<Seen>, headers: HeaderMap, Json(body): Json<Value>| async move {
                        seen.lock().unwrap().push((auth(&headers), graph, body));
                        Json(json!({"results": [
                            {"type": "article", "id": "a1", "title": "Moving to Lisbon", "score": 0.9},
                            {"type": "entity", "name": "Portugal"}
                        ]}))
                    },
                ),
            )
            .route(
                "/api/v2/graphs/{graph}/users/{user}",
                get(|Path((graph, user)): Path<(String, String)>| async move {
                    Json(json!({"graph": graph, "user": user, "facts": []}))
                }),
            )
            .route(
                "/api/v2/graphs/{graph}/users/{user}/facts",
                post(
                    |Path((_, user)): Path<(String, String)>, State(seen): State<Seen>, Json(body): Json<Value>| async move {
                        seen.lock().unwrap().push((String::new(), user, body));
                        Json(json!({"synced": 1}))
                    },
                ),
            )
            .route(
                "/api/v2/graphs/{graph}/users/{user}/memory",
                post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance") }),
            )
            .with_state(seen)
    }

    fn graphs(users: &str) -> GraphIds {
        GraphIds {
            relocation: "relocation-content".to_string(),
            placement: String::new(),
            users: users.to_string(),
        }
    }

    fn client(base: String, users: &str) -> ZepClient {
        ZepClient::new(base, SecretString::from("zep-key".to_string()), graphs(users))
    }

    #[tokio::test]
    async fn test_unconfigured_is_neutral() {
        let graph = ZepClient::from_config(&GraphConfig::default());
        assert!(!graph.is_configured());
        assert!(graph.search("g", "q", 5).await.is_empty());
        assert!(graph.read_user("u1").await.is_none());
        assert_eq!(
            graph.write_facts("u1", &[]).await,
            StoreOutcome::skipped("ZEP not configured")
        );
        assert_eq!(
            graph.append_memory("u1", "x", json!({})).await,
            StoreOutcome::skipped("ZEP not configured")
        );
        assert!(graph.content_graph_id(Persona::Relocation).is_none());
    }

    #[tokio::test]
    async fn test_content_graph_ids() {
        let graph = client("http://127.0.0.1:9".to_string(), "");
        assert_eq!(
            graph.content_graph_id(Persona::Relocation),
            Some("relocation-content")
        );
        assert_eq!(graph.content_graph_id(Persona::Placement), None);
    }

    #[tokio::test]
    async fn test_search_sends_api_key_and_returns_results() {
        let seen: Seen = Arc::default();
        let base = spawn_server(router(seen.clone())).await;
        let graph = client(base, "users");

        let results = graph.search("relocation-content", "lisbon", 5).await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["id"], "a1");

        let (auth, graph_id, body) = seen.lock().unwrap()[0].clone();
        assert_eq!(auth, "Api-Key zep-key");
        assert_eq!(graph_id, "relocation-content");
        assert_eq!(body, json!({"query": "lisbon", "limit": 5}));

        assert!(graph.search("", "lisbon", 5).await.is_empty());
    }

    #[tokio::test]
    async fn test_user_operations() {
        let seen: Seen = Arc::default();
        let base = spawn_server(router(seen.clone())).await;
        let graph = client(base, "users");

        let user = graph.read_user("u1").await.unwrap();
        assert_eq!(user["graph"], "users");
        assert_eq!(user["user"], "u1");

        let facts = vec![FactSync {
            fact_type: FactType::BudgetRange,
            value: "3000 EUR".to_string(),
            confidence: 0.8,
        }];
        let outcome = graph.write_facts("u1", &facts).await;
        assert!(outcome.is_stored());
        let (_, user_id, body) = seen.lock().unwrap()[0].clone();
        assert_eq!(user_id, "u1");
        assert_eq!(
            body,
            json!({"facts": [{"type": "budget_range", "value": "3000 EUR", "confidence": 0.8}]})
        );

        match graph.append_memory("u1", "hello", Value::Null).await {
            StoreOutcome::Error { error } => assert!(error.contains("503")),
            other => panic!("expected error outcome, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_users_graph_skips_user_calls() {
        let graph = client("http://127.0.0.1:9".to_string(), "");
        assert!(graph.read_user("u1").await.is_none());
        assert_eq!(
            graph.write_facts("u1", &[]).await,
            StoreOutcome::skipped("ZEP not configured")
        );
    }
}
