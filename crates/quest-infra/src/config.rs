//! Environment configuration loading.
//!
//! `QuestConfig` is assembled once at process start. Every variable is
//! optional; absent credentials leave the matching feature unconfigured.

use std::path::PathBuf;
use std::str::FromStr;

use secrecy::SecretString;

use quest_types::config::{
    DashboardConfig, GraphConfig, LlmConfig, MemoryConfig, ObserveConfig, QuestConfig,
    ServerConfig,
};
use quest_types::error::ConfigError;

/// Build a [`QuestConfig`] from process environment variables.
pub trait EnvConfig: Sized {
    /// Load `.env` (if present) and read the process environment.
    fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>;
}

impl EnvConfig for QuestConfig {
    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset.
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let secret = |key: &str| get(key).map(SecretString::from);

        let llm_defaults = LlmConfig::default();
        let llm = LlmConfig {
            model: get("AI_MODEL").unwrap_or(llm_defaults.model),
            base_url: get("QUEST_LLM_BASE_URL").unwrap_or(llm_defaults.base_url),
            api_key: secret("GEMINI_API_KEY").or_else(|| secret("GOOGLE_API_KEY")),
            timeout_secs: parse_or(
                "QUEST_LLM_TIMEOUT_SECS",
                get("QUEST_LLM_TIMEOUT_SECS"),
                llm_defaults.timeout_secs,
            )?,
        };

        let memory = MemoryConfig {
            base_url: get("SUPERMEMORY_API_URL").unwrap_or(MemoryConfig::default().base_url),
            api_key: secret("SUPERMEMORY_API_KEY"),
        };

        let graph = GraphConfig {
            base_url: get("ZEP_API_URL").unwrap_or(GraphConfig::default().base_url),
            api_key: secret("ZEP_API_KEY"),
            relocation_graph_id: get("ZEP_RELOCATION_GRAPH_ID").unwrap_or_default(),
            placement_graph_id: get("ZEP_PLACEMENT_GRAPH_ID").unwrap_or_default(),
            users_graph_id: get("ZEP_USERS_GRAPH_ID").unwrap_or_default(),
        };

        let server_defaults = ServerConfig::default();
        let server = ServerConfig {
            host: get("QUEST_HOST").unwrap_or(server_defaults.host),
            port: parse_or("PORT", get("PORT"), server_defaults.port)?,
            data_dir: get("QUEST_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(server_defaults.data_dir),
            cors_origins: get("QUEST_CORS_ORIGINS")
                .map(|list| split_list(&list))
                .unwrap_or(server_defaults.cors_origins),
        };

        let dashboard_defaults = DashboardConfig::default();
        let dashboard = DashboardConfig {
            scheduler_dir: get("QUEST_SCHEDULER_DIR")
                .map(PathBuf::from)
                .unwrap_or(dashboard_defaults.scheduler_dir),
            program: get("QUEST_SCHEDULER_PROGRAM").unwrap_or(dashboard_defaults.program),
            scheduler_script: get("QUEST_SCHEDULER_SCRIPT")
                .unwrap_or(dashboard_defaults.scheduler_script),
            control_script: get("QUEST_CONTROL_SCRIPT").unwrap_or(dashboard_defaults.control_script),
            database_url: secret("DATABASE_URL"),
            article_app: get("QUEST_ARTICLE_APP").unwrap_or(dashboard_defaults.article_app),
            article_base_url: get("QUEST_ARTICLE_BASE_URL")
                .unwrap_or(dashboard_defaults.article_base_url),
            cost_per_article: parse_or(
                "QUEST_COST_PER_ARTICLE",
                get("QUEST_COST_PER_ARTICLE"),
                dashboard_defaults.cost_per_article,
            )?,
        };

        let observe = ObserveConfig {
            otel: parse_flag("QUEST_OTEL", get("QUEST_OTEL"))?,
            json_logs: parse_flag("QUEST_LOG_JSON", get("QUEST_LOG_JSON"))?,
        };

        Ok(QuestConfig {
            llm,
            memory,
            graph,
            server,
            dashboard,
            observe,
        })
    }
}

fn parse_or<T: FromStr>(key: &str, value: Option<String>, default: T) -> Result<T, ConfigError> {
    match value {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw,
        }),
    }
}

fn parse_flag(key: &str, value: Option<String>) -> Result<bool, ConfigError> {
    match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None | Some("0" | "false" | "no" | "off") => Ok(false),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some(_) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.unwrap_or_default(),
        }),
    }
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
