//! Alert type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::types::{HiveId, UserId};

/// Severity level of an issue or alert. Ordered: `Low < Medium < High <
/// Critical`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    /// Worth a look on the next apiary visit.
    Low,
    /// Should be addressed within days.
    Medium,
    /// Needs prompt attention.
    High,
    /// Colony at risk.
    Critical,
}

impl AlertSeverity {
    /// Returns a static string representation for metrics labels.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Current status of an alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    /// Alert is currently standing.
    Active,
    /// Dismissed by the user; does not block a later recurrence.
    Dismissed,
    /// Replaced by a newer alert of the same type with different severity.
    Superseded,
    /// Condition cleared, automatically or by the user.
    Resolved,
}

impl AlertStatus {
    /// Returns a static string representation for metrics labels.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Dismissed => "dismissed",
            Self::Superseded => "superseded",
            Self::Resolved => "resolved",
        }
    }
}

/// Transient alert candidate produced by a checker during one evaluation run.
/// Never persisted directly: the reconciler derives [`Alert`] records from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertIssue {
    /// Checker-defined type, e.g. `inspection_overdue`.
    #[serde(rename = "type")]
    pub issue_type: String,
    pub message: String,
    pub severity: AlertSeverity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl AlertIssue {
    /// Creates an issue without metadata.
    #[must_use]
    pub fn new(
        issue_type: impl Into<String>,
        message: impl Into<String>,
        severity: AlertSeverity,
    ) -> Self {
        Self { issue_type: issue_type.into(), message: message.into(), severity, metadata: None }
    }

    /// Attaches structured metadata to the issue.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// A persisted alert record with its own lifecycle, independent of any single
/// checker run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    /// Hive the alert concerns; `None` for apiary-level alerts.
    pub hive_id: Option<HiveId>,
    /// Owning user, used for ownership-scoped lookups and transitions.
    pub user_id: UserId,
    #[serde(rename = "type")]
    pub issue_type: String,
    pub message: String,
    pub severity: AlertSeverity,
    pub status: AlertStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Alert {
    /// Creates a new `Active` alert from a checker issue.
    #[must_use]
    pub fn from_issue(hive_id: Option<HiveId>, user_id: UserId, issue: AlertIssue) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            hive_id,
            user_id,
            issue_type: issue.issue_type,
            message: issue.message,
            severity: issue.severity,
            status: AlertStatus::Active,
            metadata: issue.metadata,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns `true` if the alert is currently standing.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == AlertStatus::Active
    }
}
