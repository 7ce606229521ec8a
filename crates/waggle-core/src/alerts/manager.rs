//! Alert lifecycle management and reconciliation.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use super::{
    store::{AlertFilter, AlertStore},
    types::{Alert, AlertIssue, AlertStatus},
    AlertError,
};
use crate::types::{HiveId, UserId};

/// Outcome of reconciling one issue against the existing alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReconcileOutcome {
    /// An active alert with identical severity already stands.
    Unchanged,
    /// A fresh active alert was created.
    Created,
    /// The previous active alert was superseded by one of a new severity.
    Superseded,
}

/// Reconciles checker issues into persisted alert state and applies explicit
/// user transitions.
///
/// The reconciler is invoked once per hive per run with the *complete* set of
/// issues the checkers found, not incrementally. Re-running it with the same
/// issue set converges to the same alert state, which is the correctness
/// strategy for overlapping event-driven and scheduled checks (no locks, no
/// retries).
pub struct AlertManager {
    store: Arc<dyn AlertStore>,
}

impl AlertManager {
    /// Creates a manager over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn AlertStore>) -> Self {
        Self { store }
    }

    // ========== Reconciliation ==========

    /// Reconciles one hive's issues for a single checker run.
    ///
    /// Per `(hive, issue type)`: an identical-severity active alert is left
    /// standing; a different-severity one is superseded and replaced; absent
    /// an active alert a new one is created even when a dismissed record
    /// exists. When the run produced zero issues for the hive overall, every
    /// active alert for the hive is resolved: the hive-wide all-clear.
    ///
    /// # Errors
    ///
    /// Propagates [`AlertError::Store`] to the caller: alert consistency for
    /// the hive matters more than sweep completion, so the per-hive boundary
    /// decides what to do with the failure.
    pub fn process_issues(
        &self,
        hive_id: HiveId,
        user_id: UserId,
        issues: &[AlertIssue],
    ) -> Result<(), AlertError> {
        if issues.is_empty() {
            let resolved = self.resolve_all_for_hive(hive_id)?;
            if resolved > 0 {
                info!(hive = %hive_id, count = resolved, "all clear, resolved active alerts");
            }
            return Ok(());
        }

        // One reconciliation per type; when a run yields several issues of
        // the same type, the most severe one wins.
        let mut per_type: Vec<&AlertIssue> = Vec::new();
        for issue in issues {
            match per_type.iter_mut().find(|i| i.issue_type == issue.issue_type) {
                Some(existing) => {
                    if issue.severity > existing.severity {
                        *existing = issue;
                    }
                }
                None => per_type.push(issue),
            }
        }

        for issue in per_type {
            let outcome = self.reconcile(hive_id, user_id, issue)?;
            debug!(
                hive = %hive_id,
                issue_type = %issue.issue_type,
                severity = issue.severity.as_str(),
                outcome = ?outcome,
                "issue reconciled"
            );
        }

        Ok(())
    }

    fn reconcile(
        &self,
        hive_id: HiveId,
        user_id: UserId,
        issue: &AlertIssue,
    ) -> Result<ReconcileOutcome, AlertError> {
        let existing = self.store.find_for_reconcile(hive_id, &issue.issue_type)?;

        let outcome = if let Some(active) = existing.iter().find(|a| a.is_active()) {
            if active.severity == issue.severity {
                // Idempotent: the standing alert already says this.
                return Ok(ReconcileOutcome::Unchanged);
            }

            self.store.update_status(active.id, AlertStatus::Superseded)?;
            crate::metrics::record_alert_superseded(&issue.issue_type);
            info!(
                hive = %hive_id,
                issue_type = %issue.issue_type,
                old_severity = active.severity.as_str(),
                new_severity = issue.severity.as_str(),
                "alert superseded by severity change"
            );
            ReconcileOutcome::Superseded
        } else {
            // No active alert. A dismissed one may exist, but dismissal does
            // not suppress recurrence.
            ReconcileOutcome::Created
        };

        let alert = Alert::from_issue(Some(hive_id), user_id, issue.clone());
        let (issue_type, severity) = (alert.issue_type.clone(), alert.severity);
        self.store.insert(alert)?;
        crate::metrics::record_alert_created(&issue_type, severity);

        Ok(outcome)
    }

    /// Resolves every active alert for a hive. Returns the number resolved.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::Store`] on storage failure.
    pub fn resolve_all_for_hive(&self, hive_id: HiveId) -> Result<usize, AlertError> {
        let active = self.store.active_for_hive(hive_id)?;
        for alert in &active {
            self.store.update_status(alert.id, AlertStatus::Resolved)?;
        }
        crate::metrics::record_alerts_resolved(active.len() as u64);
        Ok(active.len())
    }

    /// Resolves active alerts of one issue type for a hive, e.g. clearing
    /// `inspection_overdue` when an inspection is recorded. Returns the
    /// number resolved.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::Store`] on storage failure.
    pub fn resolve_type_for_hive(
        &self,
        hive_id: HiveId,
        issue_type: &str,
    ) -> Result<usize, AlertError> {
        let existing = self.store.find_for_reconcile(hive_id, issue_type)?;
        let mut resolved = 0;
        for alert in existing.iter().filter(|a| a.is_active()) {
            self.store.update_status(alert.id, AlertStatus::Resolved)?;
            resolved += 1;
        }
        crate::metrics::record_alerts_resolved(resolved as u64);
        Ok(resolved)
    }

    // ========== User actions ==========

    /// Fetches one alert, ownership-scoped.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::NotFound`] when the alert does not exist or
    /// belongs to another user.
    pub fn get(&self, id: Uuid, user_id: UserId) -> Result<Alert, AlertError> {
        match self.store.get(id)? {
            Some(alert) if alert.user_id == user_id => Ok(alert),
            _ => Err(AlertError::NotFound),
        }
    }

    /// Lists alerts matching the filter.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::Store`] on storage failure.
    pub fn list(&self, filter: &AlertFilter) -> Result<Vec<Alert>, AlertError> {
        self.store.list(filter)
    }

    /// Dismisses an alert on explicit user action.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::NotFound`] for missing/foreign alerts and
    /// [`AlertError::InvalidTransition`] when the alert is not in a
    /// dismissable state.
    pub fn dismiss(&self, id: Uuid, user_id: UserId) -> Result<Alert, AlertError> {
        self.transition(id, user_id, AlertStatus::Dismissed)
    }

    /// Resolves an alert on explicit user action.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::NotFound`] for missing/foreign alerts and
    /// [`AlertError::InvalidTransition`] when the alert is not in a
    /// resolvable state.
    pub fn resolve(&self, id: Uuid, user_id: UserId) -> Result<Alert, AlertError> {
        self.transition(id, user_id, AlertStatus::Resolved)
    }

    /// Applies a user-requested status change, validating the transition.
    ///
    /// Only `Active` and `Superseded` alerts accept user transitions, and
    /// only into `Dismissed` or `Resolved`; everything else is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::NotFound`] for missing/foreign alerts and
    /// [`AlertError::InvalidTransition`] for illegal status changes.
    pub fn update_status(
        &self,
        id: Uuid,
        user_id: UserId,
        status: AlertStatus,
    ) -> Result<Alert, AlertError> {
        self.transition(id, user_id, status)
    }

    fn transition(
        &self,
        id: Uuid,
        user_id: UserId,
        to: AlertStatus,
    ) -> Result<Alert, AlertError> {
        let alert = self.get(id, user_id)?;

        let allowed = matches!(
            (alert.status, to),
            (
                AlertStatus::Active | AlertStatus::Superseded,
                AlertStatus::Dismissed | AlertStatus::Resolved
            )
        );
        if !allowed {
            return Err(AlertError::InvalidTransition { from: alert.status, to });
        }

        self.store.update_status(id, to)?.ok_or(AlertError::NotFound)
    }

    // ========== Maintenance ==========

    /// Permanently deletes resolved alerts older than `retention_days`.
    /// Pure garbage collection; returns the number of records removed.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::Store`] on storage failure.
    pub fn purge_resolved(&self, retention_days: u32) -> Result<usize, AlertError> {
        let cutoff = Utc::now() - Duration::days(i64::from(retention_days));
        let purged = self.store.purge_resolved_before(cutoff)?;
        if purged > 0 {
            crate::metrics::record_alerts_purged(purged as u64);
            info!(count = purged, retention_days, "purged old resolved alerts");
        }
        Ok(purged)
    }

    /// Total number of stored alerts, all statuses.
    #[must_use]
    pub fn total_alerts(&self) -> usize {
        self.store.len()
    }
}
