use serde::{Deserialize, Serialize};

/// An article suggested to the user, reshaped from a knowledge-graph search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecommendation {
    pub id: String,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub relevance_score: f64,
    #[serde(default)]
    pub tags: Vec<String>,
}
