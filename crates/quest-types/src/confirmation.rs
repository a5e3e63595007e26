//! Human-in-the-loop confirmation records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::fact::FactType;

/// Lifecycle of a confirmation. Only `Pending -> Approved` and
/// `Pending -> Rejected` are valid transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ConfirmationStatus {
    pub fn is_resolved(self) -> bool {
        !matches!(self, ConfirmationStatus::Pending)
    }
}

impl fmt::Display for ConfirmationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfirmationStatus::Pending => write!(f, "pending"),
            ConfirmationStatus::Approved => write!(f, "approved"),
            ConfirmationStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl FromStr for ConfirmationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ConfirmationStatus::Pending),
            "approved" => Ok(ConfirmationStatus::Approved),
            "rejected" => Ok(ConfirmationStatus::Rejected),
            other => Err(format!("invalid confirmation status: '{other}'")),
        }
    }
}

/// A fact change awaiting explicit user approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingConfirmation {
    /// Assigned on persistence; absent for confirmations built for anonymous requests.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub user_id: String,
    pub fact_type: FactType,
    #[serde(default)]
    pub old_value: Option<String>,
    pub new_value: String,
    pub confidence: f64,
    #[serde(default)]
    pub context: String,
    #[serde(default)]
    pub status: ConfirmationStatus,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip_and_resolution() {
        for status in [
            ConfirmationStatus::Pending,
            ConfirmationStatus::Approved,
            ConfirmationStatus::Rejected,
        ] {
            let parsed: ConfirmationStatus = status.to_string().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!(!ConfirmationStatus::Pending.is_resolved());
        assert!(ConfirmationStatus::Rejected.is_resolved());
        assert!("archived".parse::<ConfirmationStatus>().is_err());
    }

    #[test]
    fn test_minimal_body_gets_defaults() {
        let json = r#"{
            "user_id": "u1",
            "fact_type": "destination_preference",
            "new_value": "Portugal",
            "confidence": 0.4
        }"#;
        let conf: PendingConfirmation = serde_json::from_str(json).unwrap();
        assert_eq!(conf.status, ConfirmationStatus::Pending);
        assert!(conf.id.is_none());
        assert!(conf.old_value.is_none());
        assert_eq!(conf.context, "");
    }
}
