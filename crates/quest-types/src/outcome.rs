//! Neutral results returned by the best-effort memory and graph adapters.

use serde::{Deserialize, Serialize};

/// Result of a best-effort write to an external memory or graph service.
///
/// Adapters never surface errors to callers; instead a write resolves to
/// one of these markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum StoreOutcome {
    /// The service accepted the write and answered with this body.
    Stored { response: serde_json::Value },
    /// No credential (or target) is configured; nothing was sent.
    Skipped { reason: String },
    /// Transport failure or non-success status.
    Error { error: String },
}

impl StoreOutcome {
    pub fn skipped(reason: impl Into<String>) -> Self {
        StoreOutcome::Skipped {
            reason: reason.into(),
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        StoreOutcome::Error {
            error: error.into(),
        }
    }

    pub fn is_stored(&self) -> bool {
        matches!(self, StoreOutcome::Stored { .. })
    }

    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            StoreOutcome::Stored { .. } => "stored",
            StoreOutcome::Skipped { .. } => "skipped",
            StoreOutcome::Error { .. } => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skipped_serializes_with_status_tag() {
        let outcome = StoreOutcome::skipped("No API key configured");
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "skipped", "reason": "No API key configured"})
        );
        assert_eq!(outcome.label(), "skipped");
        assert!(!outcome.is_stored());
    }

    #[test]
    fn test_error_serializes_with_status_tag() {
        let json = serde_json::to_value(StoreOutcome::error("timeout")).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["error"], "timeout");
    }
}
