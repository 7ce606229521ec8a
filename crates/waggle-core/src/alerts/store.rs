//! Alert storage seam and the in-memory implementation.
//!
//! The reconciler only talks to [`AlertStore`], so the durable backing can be
//! a database table, an upsert-based document store, or (as shipped here and
//! used by the tests) a bounded in-memory vector behind a `parking_lot`
//! write lock. The write lock doubles as the "short transactional unit" the
//! reconciliation algorithm needs: read-existing → decide → write happens
//! under a single lock acquisition per operation, and the algorithm itself is
//! idempotent under re-runs.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::{
    types::{Alert, AlertSeverity, AlertStatus},
    AlertError,
};
use crate::types::{HiveId, UserId};
use uuid::Uuid;

/// Maximum number of alerts to keep in memory.
/// Prevents unbounded growth from accumulating historical alerts.
const MAX_ALERTS: usize = 10_000;

/// Filter for alert listings. `Default` matches everything except superseded
/// records, which are history rather than state.
#[derive(Debug, Clone, Default)]
pub struct AlertFilter {
    pub hive_id: Option<HiveId>,
    pub user_id: Option<UserId>,
    pub issue_type: Option<String>,
    pub severity: Option<AlertSeverity>,
    pub status: Option<AlertStatus>,
    /// Include superseded alerts even when no explicit status filter asks
    /// for them.
    pub include_superseded: bool,
}

impl AlertFilter {
    fn matches(&self, alert: &Alert) -> bool {
        if let Some(hive_id) = self.hive_id {
            if alert.hive_id != Some(hive_id) {
                return false;
            }
        }
        if let Some(user_id) = self.user_id {
            if alert.user_id != user_id {
                return false;
            }
        }
        if let Some(issue_type) = &self.issue_type {
            if &alert.issue_type != issue_type {
                return false;
            }
        }
        if let Some(severity) = self.severity {
            if alert.severity != severity {
                return false;
            }
        }
        match self.status {
            Some(status) => alert.status == status,
            None => self.include_superseded || alert.status != AlertStatus::Superseded,
        }
    }
}

/// Storage abstraction the alert lifecycle runs against.
///
/// Implementations must apply each operation atomically with respect to the
/// others; the reconciler relies on `find_for_reconcile` + `insert`/
/// `update_status` not interleaving with a concurrent reconciliation of the
/// same `(hive, type)` pair in a way that breaks the single-active invariant.
pub trait AlertStore: Send + Sync {
    /// Persists a new alert.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::Store`] when the backing store rejects the write.
    fn insert(&self, alert: Alert) -> Result<(), AlertError>;

    /// Fetches one alert by id.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::Store`] on storage failure.
    fn get(&self, id: Uuid) -> Result<Option<Alert>, AlertError>;

    /// Lists alerts matching the filter, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::Store`] on storage failure.
    fn list(&self, filter: &AlertFilter) -> Result<Vec<Alert>, AlertError>;

    /// Returns `Active` and `Dismissed` alerts for `(hive, issue type)`,
    /// most recent first: the working set of one reconciliation step.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::Store`] on storage failure.
    fn find_for_reconcile(
        &self,
        hive_id: HiveId,
        issue_type: &str,
    ) -> Result<Vec<Alert>, AlertError>;

    /// Returns every `Active` alert for a hive, any type.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::Store`] on storage failure.
    fn active_for_hive(&self, hive_id: HiveId) -> Result<Vec<Alert>, AlertError>;

    /// Sets the status (and `updated_at`) of one alert, returning the updated
    /// record, or `None` if no alert with that id exists.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::Store`] on storage failure.
    fn update_status(
        &self,
        id: Uuid,
        status: AlertStatus,
    ) -> Result<Option<Alert>, AlertError>;

    /// Permanently deletes `Resolved` alerts last updated before `cutoff`.
    /// Returns the number of records removed.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::Store`] on storage failure.
    fn purge_resolved_before(&self, cutoff: DateTime<Utc>) -> Result<usize, AlertError>;

    /// Total number of stored alerts, all statuses.
    fn len(&self) -> usize;

    /// Returns `true` when no alerts are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-process alert store backed by a bounded vector.
#[derive(Default)]
pub struct MemoryAlertStore {
    alerts: RwLock<Vec<Alert>>,
}

impl MemoryAlertStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl AlertStore for MemoryAlertStore {
    /// Enforces a capacity of [`MAX_ALERTS`]: at 90% capacity resolved alerts
    /// are evicted first, then oldest alerts (FIFO) if still full, so active
    /// and recent records survive.
    fn insert(&self, alert: Alert) -> Result<(), AlertError> {
        let mut alerts = self.alerts.write();

        if alerts.len() >= MAX_ALERTS * 9 / 10 {
            alerts.retain(|a| a.status != AlertStatus::Resolved);
        }
        while alerts.len() >= MAX_ALERTS {
            alerts.remove(0);
        }

        alerts.push(alert);
        Ok(())
    }

    fn get(&self, id: Uuid) -> Result<Option<Alert>, AlertError> {
        Ok(self.alerts.read().iter().find(|a| a.id == id).cloned())
    }

    fn list(&self, filter: &AlertFilter) -> Result<Vec<Alert>, AlertError> {
        let mut matched: Vec<Alert> =
            self.alerts.read().iter().filter(|a| filter.matches(a)).cloned().collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matched)
    }

    fn find_for_reconcile(
        &self,
        hive_id: HiveId,
        issue_type: &str,
    ) -> Result<Vec<Alert>, AlertError> {
        let mut matched: Vec<Alert> = self
            .alerts
            .read()
            .iter()
            .filter(|a| {
                a.hive_id == Some(hive_id) &&
                    a.issue_type == issue_type &&
                    matches!(a.status, AlertStatus::Active | AlertStatus::Dismissed)
            })
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matched)
    }

    fn active_for_hive(&self, hive_id: HiveId) -> Result<Vec<Alert>, AlertError> {
        Ok(self
            .alerts
            .read()
            .iter()
            .filter(|a| a.hive_id == Some(hive_id) && a.status == AlertStatus::Active)
            .cloned()
            .collect())
    }

    fn update_status(
        &self,
        id: Uuid,
        status: AlertStatus,
    ) -> Result<Option<Alert>, AlertError> {
        let mut alerts = self.alerts.write();

        if let Some(alert) = alerts.iter_mut().find(|a| a.id == id) {
            alert.status = status;
            alert.updated_at = Utc::now();
            Ok(Some(alert.clone()))
        } else {
            Ok(None)
        }
    }

    fn purge_resolved_before(&self, cutoff: DateTime<Utc>) -> Result<usize, AlertError> {
        let mut alerts = self.alerts.write();
        let before = alerts.len();
        alerts.retain(|a| !(a.status == AlertStatus::Resolved && a.updated_at < cutoff));
        Ok(before - alerts.len())
    }

    fn len(&self) -> usize {
        self.alerts.read().len()
    }
}
