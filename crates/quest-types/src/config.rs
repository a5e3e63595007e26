//! Process-wide configuration for Quest.
//!
//! `QuestConfig` is built once at startup (see `quest_infra::config`) and
//! handed to every client by `Arc`. Nothing reads the environment after that.
//! Every section has defaults, so a bare environment yields a working
//! (degraded) configuration.

use secrecy::SecretString;
use std::path::PathBuf;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_LLM_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
pub const DEFAULT_SUPERMEMORY_URL: &str = "https://api.supermemory.ai/v1";
pub const DEFAULT_ZEP_URL: &str = "https://api.getzep.com/api/v2";

/// Origins the browser frontends are served from.
pub const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:3000",
    "http://localhost:3001",
    "https://relocation.quest",
    "https://placement.quest",
    "https://dashboard.quest",
];

/// Top-level configuration, one section per collaborator.
#[derive(Debug, Clone, Default)]
pub struct QuestConfig {
    pub llm: LlmConfig,
    pub memory: MemoryConfig,
    pub graph: GraphConfig,
    pub server: ServerConfig,
    pub dashboard: DashboardConfig,
    pub observe: ObserveConfig,
}

/// Hosted model endpoint (OpenAI-compatible chat completions).
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub model: String,
    pub base_url: String,
    pub api_key: Option<SecretString>,
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_LLM_BASE_URL.to_string(),
            api_key: None,
            timeout_secs: 120,
        }
    }
}

/// SuperMemory long-term memory service.
#[derive(Debug, Clone)]
pub struct MemoryConfig {
    pub base_url: String,
    pub api_key: Option<SecretString>,
}

impl MemoryConfig {
    /// The credential, if memory is configured.
    pub fn api_key(&self) -> Option<&SecretString> {
        self.api_key.as_ref()
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SUPERMEMORY_URL.to_string(),
            api_key: None,
        }
    }
}

/// Zep knowledge-graph service.
#[derive(Debug, Clone)]
pub struct GraphConfig {
    pub base_url: String,
    pub api_key: Option<SecretString>,
    pub relocation_graph_id: String,
    pub placement_graph_id: String,
    pub users_graph_id: String,
}

impl GraphConfig {
    pub fn api_key(&self) -> Option<&SecretString> {
        self.api_key.as_ref()
    }

    /// The per-user graph id, when one is configured.
    pub fn users_graph(&self) -> Option<&str> {
        Some(self.users_graph_id.as_str()).filter(|id| !id.is_empty())
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_ZEP_URL.to_string(),
            api_key: None,
            relocation_graph_id: String::new(),
            placement_graph_id: String::new(),
            users_graph_id: String::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Holds the SQLite confirmations database.
    pub data_dir: PathBuf,
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join("quest.db")
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            data_dir: PathBuf::from(".quest"),
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Operator dashboard for the external article scheduler.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub scheduler_dir: PathBuf,
    pub program: String,
    pub scheduler_script: String,
    pub control_script: String,
    pub database_url: Option<SecretString>,
    pub article_app: String,
    pub article_base_url: String,
    pub cost_per_article: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            scheduler_dir: PathBuf::from("."),
            program: "tsx".to_string(),
            scheduler_script: "scheduler.ts".to_string(),
            control_script: "control.ts".to_string(),
            database_url: None,
            article_app: "fractional-jobs".to_string(),
            article_base_url: "https://fractional.quest".to_string(),
            cost_per_article: 0.05,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ObserveConfig {
    pub otel: bool,
    pub json_logs: bool,
}
