//! Reshape graph search hits into [`ArticleRecommendation`]s.

use quest_types::article::ArticleRecommendation;
use quest_types::chat::Persona;

use super::KnowledgeGraph;

pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 5;

/// Keep results tagged `"type": "article"` and remap their fields.
///
/// Non-object entries and other result types are dropped.
pub fn to_recommendations(results: &[serde_json::Value]) -> Vec<ArticleRecommendation> {
    results.iter().filter_map(to_recommendation).collect()
}

fn to_recommendation(result: &serde_json::Value) -> Option<ArticleRecommendation> {
    let obj = result.as_object()?;
    if obj.get("type").and_then(|t| t.as_str()) != Some("article") {
        return None;
    }
    let text = |key: &str| {
        obj.get(key)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string()
    };
    let tags = obj
        .get("tags")
        .and_then(|t| t.as_array())
        .map(|tags| {
            tags.iter()
                .filter_map(|t| t.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    Some(ArticleRecommendation {
        id: text("id"),
        title: text("title"),
        slug: text("slug"),
        summary: text("summary"),
        relevance_score: obj.get("score").and_then(|s| s.as_f64()).unwrap_or(0.0),
        tags,
    })
}

/// Articles from the persona's content graph matching `query`.
#[tracing::instrument(name = "recommend_articles", skip(graph, persona, query), fields(persona = %persona))]
pub async fn recommend<G: KnowledgeGraph>(
    graph: &G,
    persona: Persona,
    query: &str,
    limit: usize,
) -> Vec<ArticleRecommendation> {
    let Some(graph_id) = graph.content_graph_id(persona) else {
        tracing::debug!("no content graph configured; no recommendations");
        return Vec::new();
    };
    let results = graph.search(graph_id, query, limit).await;
    to_recommendations(&results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quest_types::fact::FactSync;
    use quest_types::outcome::StoreOutcome;
    use serde_json::json;

    #[test]
    fn test_filters_and_maps_articles() {
        let results = vec![
            json!({
                "type": "article",
                "id": "a1",
                "title": "Moving to Lisbon",
                "slug": "moving-to-lisbon",
                "summary": "Everything you need",
                "score": 0.92,
                "tags": ["portugal", "visa", 7]
            }),
            json!({"type": "entity", "id": "e1", "title": "Lisbon"}),
            json!("just a string"),
            json!({"type": "article", "id": "a2"}),
        ];
        let recs = to_recommendations(&results);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].slug, "moving-to-lisbon");
        assert!((recs[0].relevance_score - 0.92).abs() < 1e-9);
        assert_eq!(recs[0].tags, vec!["portugal", "visa"]);
        assert_eq!(recs[1].title, "");
        assert_eq!(recs[1].relevance_score, 0.0);
        assert!(recs[1].tags.is_empty());
    }

    struct StaticGraph;

    impl KnowledgeGraph for StaticGraph {
        fn content_graph_id(&self, persona: Persona) -> Option<&str> {
            match persona {
                Persona::Relocation => Some("relocation"),
                Persona::Placement => None,
            }
        }

        async fn search(&self, graph_id: &str, _query: &str, _limit: usize) -> Vec<serde_json::Value> {
            vec![json!({"type": "article", "id": graph_id, "title": "t", "slug": "s"})]
        }

        async fn read_user(&self, _user_id: &str) -> Option<serde_json::Value> {
            None
        }

        async fn write_facts(&self, _user_id: &str, _facts: &[FactSync]) -> StoreOutcome {
            StoreOutcome::skipped("static")
        }

        async fn append_memory(&self, _user_id: &str, _content: &str, _metadata: serde_json::Value) -> StoreOutcome {
            StoreOutcome::skipped("static")
        }
    }

    #[tokio::test]
    async fn test_recommend_uses_persona_graph() {
        let recs = recommend(&StaticGraph, Persona::Relocation, "visa", 5).await;
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].id, "relocation");

        let recs = recommend(&StaticGraph, Persona::Placement, "jobs", 5).await;
        assert!(recs.is_empty());
    }
}
