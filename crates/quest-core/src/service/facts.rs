//! Standalone fact extraction with best-effort sync to the users graph.

use std::sync::Arc;

use quest_types::error::ExtractionError;
use quest_types::fact::{ExtractedFact, FactExtractionResult, FactSync};

use crate::extract::facts::FactExtractor;
use crate::graph::KnowledgeGraph;

pub struct FactService<G> {
    extractor: FactExtractor,
    graph: Arc<G>,
}

impl<G> Clone for FactService<G> {
    fn clone(&self) -> Self {
        Self {
            extractor: self.extractor.clone(),
            graph: self.graph.clone(),
        }
    }
}

impl<G: KnowledgeGraph> FactService<G> {
    pub fn new(extractor: FactExtractor, graph: Arc<G>) -> Self {
        Self { extractor, graph }
    }

    /// Extract facts from `text`; when a user is given and facts were found,
    /// write `{type, value, confidence}` for each to the users graph.
    pub async fn extract_and_sync(
        &self,
        text: &str,
        user_id: Option<&str>,
        existing_facts: &[ExtractedFact],
    ) -> Result<FactExtractionResult, ExtractionError> {
        let result = self.extractor.extract(text, existing_facts).await?;

        let user_id = user_id.filter(|u| !u.is_empty());
        if let Some(user_id) = user_id.filter(|_| !result.facts.is_empty()) {
            let sync: Vec<FactSync> = result.facts.iter().map(ExtractedFact::to_sync).collect();
            let outcome = self.graph.write_facts(user_id, &sync).await;
            tracing::info!(user_id, facts = sync.len(), outcome = outcome.label(), "facts synced to graph");
        }

        Ok(result)
    }
}
