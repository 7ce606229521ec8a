//! Reusable test fixtures: hive builders, scripted checkers, and a store
//! that fails on demand.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use waggle_core::{
    alerts::{
        Alert, AlertError, AlertFilter, AlertIssue, AlertManager, AlertStatus, AlertStore,
        AlertSweeper, MemoryAlertStore,
    },
    checkers::{CheckerError, CheckerSet, HiveChecker},
    hives::{HiveRegistry, InMemoryHiveRegistry},
    types::{CheckRun, HiveContext, HiveId, HiveSettings, HiveStatus, UserId},
};

/// Builds an active hive owned by `user_id`, last inspected `days_ago` days
/// ago (never inspected when `None`, created 365 days ago).
#[must_use]
pub fn hive(user_id: UserId, days_ago: Option<i64>) -> HiveContext {
    let now = Utc::now();
    HiveContext {
        hive_id: Uuid::new_v4(),
        name: "Test Hive".to_string(),
        status: HiveStatus::Active,
        apiary_id: Uuid::new_v4(),
        user_id,
        settings: HiveSettings::default(),
        created_at: now - chrono::Duration::days(365),
        last_inspection_date: days_ago.map(|d| now - chrono::Duration::days(d)),
        latest_observations: None,
    }
}

/// A checker whose issue list is swapped from the outside between runs.
pub struct ScriptedChecker {
    issue_type: &'static str,
    issues: Mutex<Vec<AlertIssue>>,
}

impl ScriptedChecker {
    #[must_use]
    pub fn new(issue_type: &'static str) -> Arc<Self> {
        Arc::new(Self { issue_type, issues: Mutex::new(Vec::new()) })
    }

    /// Sets the issues the checker reports on its next runs.
    pub fn set_issues(&self, issues: Vec<AlertIssue>) {
        *self.issues.lock() = issues;
    }
}

impl HiveChecker for ScriptedChecker {
    fn checker_type(&self) -> &'static str {
        self.issue_type
    }

    fn check_hive(
        &self,
        _ctx: &HiveContext,
        _run: &CheckRun,
    ) -> Result<Vec<AlertIssue>, CheckerError> {
        Ok(self.issues.lock().clone())
    }
}

/// A checker that always fails.
pub struct FailingChecker;

impl HiveChecker for FailingChecker {
    fn checker_type(&self) -> &'static str {
        "always_failing"
    }

    fn check_hive(
        &self,
        _ctx: &HiveContext,
        _run: &CheckRun,
    ) -> Result<Vec<AlertIssue>, CheckerError> {
        Err(CheckerError::Failed("synthetic checker failure".to_string()))
    }
}

/// Wraps [`MemoryAlertStore`] and fails inserts for one designated hive, to
/// exercise per-hive failure isolation in the sweeper.
pub struct FlakyStore {
    inner: MemoryAlertStore,
    poisoned_hive: HiveId,
}

impl FlakyStore {
    #[must_use]
    pub fn new(poisoned_hive: HiveId) -> Self {
        Self { inner: MemoryAlertStore::new(), poisoned_hive }
    }
}

impl AlertStore for FlakyStore {
    fn insert(&self, alert: Alert) -> Result<(), AlertError> {
        if alert.hive_id == Some(self.poisoned_hive) {
            return Err(AlertError::Store("synthetic write failure".to_string()));
        }
        self.inner.insert(alert)
    }

    fn get(&self, id: Uuid) -> Result<Option<Alert>, AlertError> {
        self.inner.get(id)
    }

    fn list(&self, filter: &AlertFilter) -> Result<Vec<Alert>, AlertError> {
        self.inner.list(filter)
    }

    fn find_for_reconcile(
        &self,
        hive_id: HiveId,
        issue_type: &str,
    ) -> Result<Vec<Alert>, AlertError> {
        self.inner.find_for_reconcile(hive_id, issue_type)
    }

    fn active_for_hive(&self, hive_id: HiveId) -> Result<Vec<Alert>, AlertError> {
        self.inner.active_for_hive(hive_id)
    }

    fn update_status(
        &self,
        id: Uuid,
        status: AlertStatus,
    ) -> Result<Option<Alert>, AlertError> {
        self.inner.update_status(id, status)
    }

    fn purge_resolved_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<usize, AlertError> {
        self.inner.purge_resolved_before(cutoff)
    }

    fn len(&self) -> usize {
        self.inner.len()
    }
}

/// Everything a sweeper test needs, wired over in-memory collaborators.
pub struct TestRig {
    pub registry: Arc<InMemoryHiveRegistry>,
    pub manager: Arc<AlertManager>,
    pub sweeper: Arc<AlertSweeper>,
}

/// Builds a sweeper over the given checkers and store, with short intervals
/// suitable for tests.
#[must_use]
pub fn rig_with_store(checkers: CheckerSet, store: Arc<dyn AlertStore>) -> TestRig {
    let registry = Arc::new(InMemoryHiveRegistry::new());
    let manager = Arc::new(AlertManager::new(store));
    let sweeper = Arc::new(AlertSweeper::new(
        registry.clone() as Arc<dyn HiveRegistry>,
        Arc::new(checkers),
        manager.clone(),
        Duration::from_secs(3600),
        30,
        Duration::from_secs(3600),
    ));
    TestRig { registry, manager, sweeper }
}

/// Builds a sweeper over a fresh in-memory store.
#[must_use]
pub fn rig(checkers: CheckerSet) -> TestRig {
    rig_with_store(checkers, Arc::new(MemoryAlertStore::new()))
}

/// Active alerts for one hive, any type.
#[must_use]
pub fn active_alerts(manager: &AlertManager, hive_id: HiveId) -> Vec<Alert> {
    manager
        .list(&AlertFilter {
            hive_id: Some(hive_id),
            status: Some(AlertStatus::Active),
            ..AlertFilter::default()
        })
        .expect("in-memory store cannot fail")
}
