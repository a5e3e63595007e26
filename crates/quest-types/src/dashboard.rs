//! Shapes shown by the operator dashboard for the external article scheduler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Externally observable state of the scheduler process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SchedulerState {
    Stopped,
    Running,
    /// Running with the pause marker present.
    Paused,
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerState::Stopped => write!(f, "STOPPED"),
            SchedulerState::Running => write!(f, "RUNNING"),
            SchedulerState::Paused => write!(f, "PAUSED"),
        }
    }
}

/// `(success, message)` result of an operator action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlOutcome {
    pub success: bool,
    pub message: String,
}

impl ControlOutcome {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// One published article row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleSummary {
    pub title: String,
    pub slug: String,
    pub role: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub company: Option<String>,
    pub salary: Option<String>,
}

impl ArticleSummary {
    pub fn link(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self.slug)
    }
}

/// Article counts over rolling windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ArticleStats {
    pub total: i64,
    pub today: i64,
    pub this_week: i64,
    pub this_month: i64,
}

impl ArticleStats {
    /// Average articles per day over the last 30 days.
    pub fn per_day_average(&self) -> f64 {
        if self.this_month > 0 {
            self.this_month as f64 / 30.0
        } else {
            0.0
        }
    }

    pub fn cost(count: i64, cost_per_article: f64) -> f64 {
        count as f64 * cost_per_article
    }
}
