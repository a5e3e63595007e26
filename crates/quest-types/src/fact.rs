//! Structured facts and user conditions produced by schema-constrained
//! model calls.
//!
//! Every type here derives [`JsonSchema`]; the generated schemas are sent to
//! the hosted model as the declared output shape, and the model's answer is
//! parsed back into these types and checked with `validate()`.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The fixed enumeration of fact kinds Quest tracks about a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FactType {
    DestinationPreference,
    CurrentLocation,
    FamilyStatus,
    JobStatus,
    BudgetRange,
    Timeline,
    Language,
    VisaRequirement,
    Custom,
}

impl FactType {
    pub const ALL: [FactType; 9] = [
        FactType::DestinationPreference,
        FactType::CurrentLocation,
        FactType::FamilyStatus,
        FactType::JobStatus,
        FactType::BudgetRange,
        FactType::Timeline,
        FactType::Language,
        FactType::VisaRequirement,
        FactType::Custom,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FactType::DestinationPreference => "destination_preference",
            FactType::CurrentLocation => "current_location",
            FactType::FamilyStatus => "family_status",
            FactType::JobStatus => "job_status",
            FactType::BudgetRange => "budget_range",
            FactType::Timeline => "timeline",
            FactType::Language => "language",
            FactType::VisaRequirement => "visa_requirement",
            FactType::Custom => "custom",
        }
    }
}

impl fmt::Display for FactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FactType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FactType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("invalid fact type: '{s}'"))
    }
}

/// A single claim about the user, as reported by the extraction model.
///
/// `confidence` and `requires_confirmation` are taken from the model as-is;
/// the confirmation policy in quest-core decides what actually needs review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExtractedFact {
    #[serde(rename = "type")]
    pub fact_type: FactType,
    pub value: String,
    pub confidence: f64,
    #[serde(default)]
    pub requires_confirmation: bool,
    #[serde(default)]
    pub context: String,
}

impl ExtractedFact {
    /// Reject facts whose confidence falls outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(format!(
                "fact '{}' has confidence {} outside [0, 1]",
                self.fact_type, self.confidence
            ));
        }
        Ok(())
    }

    /// The payload shape written to the users knowledge graph.
    pub fn to_sync(&self) -> FactSync {
        FactSync {
            fact_type: self.fact_type,
            value: self.value.clone(),
            confidence: self.confidence,
        }
    }
}

/// `{type, value, confidence}` as sent to the knowledge-graph fact sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactSync {
    #[serde(rename = "type")]
    pub fact_type: FactType,
    pub value: String,
    pub confidence: f64,
}

/// A fact the user has accepted, one value per fact type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserFact {
    pub user_id: String,
    pub fact_type: FactType,
    pub value: String,
    pub confidence: f64,
    pub updated_at: DateTime<Utc>,
}

impl UserFact {
    /// Shape used to brief the extraction model on what is already known.
    pub fn to_extracted(&self) -> ExtractedFact {
        ExtractedFact {
            fact_type: self.fact_type,
            value: self.value.clone(),
            confidence: self.confidence,
            requires_confirmation: false,
            context: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Employed,
    Seeking,
    Remote,
    Retired,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DestinationPreference {
    pub country: String,
    /// 1 (highest) to 10.
    pub priority: u8,
    #[serde(default)]
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct FamilyCondition {
    #[serde(default)]
    pub has_partner: bool,
    #[serde(default)]
    pub has_children: bool,
    #[serde(default)]
    pub children_ages: Vec<u32>,
    #[serde(default)]
    pub partner_nationality: Option<String>,
    #[serde(default)]
    pub partner_work_status: Option<String>,
}

fn default_currency() -> String {
    "USD".to_string()
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BudgetRange {
    #[serde(default)]
    pub monthly_min: Option<f64>,
    #[serde(default)]
    pub monthly_max: Option<f64>,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_true")]
    pub includes_housing: bool,
}

impl Default for BudgetRange {
    fn default() -> Self {
        Self {
            monthly_min: None,
            monthly_max: None,
            currency: default_currency(),
            includes_housing: true,
        }
    }
}

/// Best-effort structured summary of a user. Every field is optional.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct UserConditions {
    #[serde(default)]
    pub destination_preferences: Vec<DestinationPreference>,
    #[serde(default)]
    pub family_condition: Option<FamilyCondition>,
    #[serde(default)]
    pub job_status: Option<JobStatus>,
    #[serde(default)]
    pub budget: Option<BudgetRange>,
    #[serde(default)]
    pub timeline: Option<String>,
    #[serde(default)]
    pub current_location: Option<String>,
}

impl UserConditions {
    /// Destination priorities must lie within 1..=10.
    pub fn validate(&self) -> Result<(), String> {
        for pref in &self.destination_preferences {
            if !(1..=10).contains(&pref.priority) {
                return Err(format!(
                    "destination '{}' has priority {} outside 1-10",
                    pref.country, pref.priority
                ));
            }
        }
        Ok(())
    }
}

/// Output of one fact-extraction call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct FactExtractionResult {
    #[serde(default)]
    pub facts: Vec<ExtractedFact>,
    #[serde(default)]
    pub user_conditions: Option<UserConditions>,
    #[serde(default)]
    pub has_changes: bool,
    #[serde(default)]
    pub summary: String,
}

impl FactExtractionResult {
    pub fn validate(&self) -> Result<(), String> {
        for fact in &self.facts {
            fact.validate()?;
        }
        if let Some(conditions) = &self.user_conditions {
            conditions.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fact(confidence: f64) -> ExtractedFact {
        ExtractedFact {
            fact_type: FactType::DestinationPreference,
            value: "Portugal".to_string(),
            confidence,
            requires_confirmation: false,
            context: "I want to move to Portugal".to_string(),
        }
    }

    #[test]
    fn test_fact_type_serializes_snake_case() {
        for t in FactType::ALL {
            let json = serde_json::to_string(&t).unwrap();
            assert_eq!(json, format!("\"{}\"", t.as_str()));
            assert_eq!(t.as_str().parse::<FactType>().unwrap(), t);
        }
        assert!("hobby".parse::<FactType>().is_err());
    }

    #[test]
    fn test_extracted_fact_uses_type_key() {
        let json = serde_json::to_value(fact(0.9)).unwrap();
        assert_eq!(json["type"], "destination_preference");
        assert!(json.get("fact_type").is_none());
    }

    #[test]
    fn test_extracted_fact_defaults() {
        let parsed: ExtractedFact =
            serde_json::from_str(r#"{"type":"timeline","value":"next spring","confidence":0.7}"#)
                .unwrap();
        assert!(!parsed.requires_confirmation);
        assert_eq!(parsed.context, "");
    }

    #[test]
    fn test_confidence_bounds() {
        assert!(fact(0.0).validate().is_ok());
        assert!(fact(1.0).validate().is_ok());
        assert!(fact(1.2).validate().is_err());
        assert!(fact(-0.1).validate().is_err());
    }

    #[test]
    fn test_sync_payload_preserves_fields() {
        let original = fact(0.83);
        let json = serde_json::to_value(original.to_sync()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "destination_preference",
                "value": "Portugal",
                "confidence": 0.83
            })
        );
    }

    #[test]
    fn test_user_conditions_priority_bounds() {
        let mut conditions = UserConditions {
            destination_preferences: vec![DestinationPreference {
                country: "Spain".to_string(),
                priority: 10,
                reasons: vec![],
            }],
            ..Default::default()
        };
        assert!(conditions.validate().is_ok());
        conditions.destination_preferences[0].priority = 0;
        assert!(conditions.validate().is_err());
    }

    #[test]
    fn test_budget_defaults() {
        let budget: BudgetRange = serde_json::from_str(r#"{"monthly_max": 3000}"#).unwrap();
        assert_eq!(budget.currency, "USD");
        assert!(budget.includes_housing);
        assert_eq!(budget.monthly_max, Some(3000.0));
    }

    #[test]
    fn test_extraction_result_schema_mentions_fact_types() {
        let schema = schemars::schema_for!(FactExtractionResult);
        let text = serde_json::to_string(&schema).unwrap();
        assert!(text.contains("destination_preference"));
        assert!(text.contains("requires_confirmation"));
    }
}
