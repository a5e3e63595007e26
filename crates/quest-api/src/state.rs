//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by the HTTP handlers.
//! Services in quest-core are generic over their ports; here they are
//! pinned to the quest-infra adapters.

use std::sync::Arc;

use quest_core::chat::gateway::ChatGateway;
use quest_core::confirmation::service::ConfirmationService;
use quest_core::extract::conditions::ConditionsExtractor;
use quest_core::extract::facts::FactExtractor;
use quest_core::llm::box_provider::BoxLlmProvider;
use quest_core::service::conversation::ConversationService;
use quest_core::service::facts::FactService;
use quest_infra::graph::zep::ZepClient;
use quest_infra::llm::create_provider;
use quest_infra::memory::supermemory::SuperMemoryClient;
use quest_infra::sqlite::confirmation::SqliteConfirmationRepository;
use quest_infra::sqlite::pool::DatabasePool;
use quest_types::config::QuestConfig;

pub type ConcreteConfirmationService = ConfirmationService<SqliteConfirmationRepository, ZepClient>;

pub type ConcreteConversationService =
    ConversationService<SuperMemoryClient, SqliteConfirmationRepository, ZepClient>;

/// Shared state for the HTTP API.
#[derive(Clone)]
pub struct AppState {
    pub conversation: Arc<ConcreteConversationService>,
    pub facts: Arc<FactService<ZepClient>>,
    pub conditions: Arc<ConditionsExtractor>,
    pub confirmations: Arc<ConcreteConfirmationService>,
    pub graph: Arc<ZepClient>,
}

impl AppState {
    /// Open the confirmations database and build every client from `config`.
    pub async fn init(config: &QuestConfig) -> anyhow::Result<Self> {
        let db_path = config.server.database_path();
        let pool = DatabasePool::open(&db_path).await?;
        tracing::info!(path = %db_path.display(), "confirmations database ready");

        Ok(Self::from_parts(config, create_provider(&config.llm), pool))
    }

    /// Wire services around an already-built provider and pool.
    pub fn from_parts(config: &QuestConfig, provider: BoxLlmProvider, pool: DatabasePool) -> Self {
        let provider = Arc::new(provider);

        let memory = Arc::new(SuperMemoryClient::from_config(&config.memory));
        let graph = Arc::new(ZepClient::from_config(&config.graph));
        let repo = Arc::new(SqliteConfirmationRepository::new(pool));

        let extractor = FactExtractor::new(provider.clone());
        let confirmations = ConfirmationService::new(repo, graph.clone());

        let conversation = ConversationService::new(
            ChatGateway::new(provider.clone()),
            extractor.clone(),
            memory,
            confirmations.clone(),
        );

        Self {
            conversation: Arc::new(conversation),
            facts: Arc::new(FactService::new(extractor, graph.clone())),
            conditions: Arc::new(ConditionsExtractor::new(provider)),
            confirmations: Arc::new(confirmations),
            graph,
        }
    }
}
