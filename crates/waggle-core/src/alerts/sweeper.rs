//! Periodic and event-driven alert sweeping.
//!
//! The sweeper is the thin glue between the hive registry, the checker set,
//! and the alert manager: per hive it builds the context, runs every checker,
//! and hands the combined issue list to the reconciler. Per-hive failures are
//! logged and skipped so one hive can never block the rest of the sweep.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use serde::Serialize;
use tokio::{
    sync::{broadcast, mpsc},
    task::JoinHandle,
    time::interval,
};
use tracing::{error, info, warn};

use super::{manager::AlertManager, AlertError};
use crate::{
    checkers::{inspection_overdue::INSPECTION_OVERDUE, CheckerSet},
    events::DomainEvent,
    hives::HiveRegistry,
    types::{CheckRun, HiveContext, HiveId},
};

/// Result of one full sweep across the registry.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SweepSummary {
    pub hives_checked: usize,
    pub issues_found: usize,
    pub hives_failed: usize,
}

/// Drives the checkers: periodically across all active hives, and reactively
/// for single hives when domain events arrive.
pub struct AlertSweeper {
    registry: Arc<dyn HiveRegistry>,
    checkers: Arc<CheckerSet>,
    manager: Arc<AlertManager>,
    sweep_interval: Duration,
    retention_days: u32,
    purge_interval: Duration,
}

impl AlertSweeper {
    /// Creates a sweeper over the given collaborators.
    #[must_use]
    pub fn new(
        registry: Arc<dyn HiveRegistry>,
        checkers: Arc<CheckerSet>,
        manager: Arc<AlertManager>,
        sweep_interval: Duration,
        retention_days: u32,
        purge_interval: Duration,
    ) -> Self {
        Self { registry, checkers, manager, sweep_interval, retention_days, purge_interval }
    }

    /// Returns the registered checker type names.
    #[must_use]
    pub fn checker_types(&self) -> Vec<&'static str> {
        self.checkers.checker_types()
    }

    /// Sweeps every active hive once.
    ///
    /// Never fails as a whole: per-hive failures are logged, counted in the
    /// summary, and the sweep continues with the remaining hives.
    pub fn sweep_all(&self) -> SweepSummary {
        let hives = self.registry.active_hives();
        let mut summary = SweepSummary::default();

        for ctx in &hives {
            match self.run_hive(ctx) {
                Ok(issues_found) => {
                    summary.hives_checked += 1;
                    summary.issues_found += issues_found;
                }
                Err(e) => {
                    summary.hives_failed += 1;
                    error!(
                        hive = %ctx.hive_id,
                        error = %e,
                        "hive check failed, continuing sweep with remaining hives"
                    );
                }
            }
        }

        crate::metrics::record_sweep(&summary);
        info!(
            hives_checked = summary.hives_checked,
            issues_found = summary.issues_found,
            hives_failed = summary.hives_failed,
            "alert sweep completed"
        );
        summary
    }

    /// Checks a single hive by id, e.g. in response to a domain event.
    ///
    /// # Errors
    ///
    /// Returns [`AlertError::NotFound`] for unknown hives and propagates
    /// store failures from reconciliation.
    pub fn check_hive(&self, hive_id: HiveId) -> Result<usize, AlertError> {
        let ctx = self.registry.hive(hive_id).ok_or(AlertError::NotFound)?;
        self.run_hive(&ctx)
    }

    /// Runs all checkers for one hive and reconciles the issues found.
    fn run_hive(&self, ctx: &HiveContext) -> Result<usize, AlertError> {
        let run = CheckRun::for_hive(ctx, Utc::now());
        let issues = self.checkers.run_all(ctx, &run);
        self.manager.process_issues(ctx.hive_id, ctx.user_id, &issues)?;
        Ok(issues.len())
    }

    /// Starts the periodic sweep loop. Runs until the shutdown signal.
    #[must_use]
    pub fn start(self: &Arc<Self>, mut shutdown_rx: broadcast::Receiver<()>) -> JoinHandle<()> {
        let sweeper = Arc::clone(self);

        tokio::spawn(async move {
            info!(
                interval_seconds = sweeper.sweep_interval.as_secs(),
                checkers = ?sweeper.checker_types(),
                "starting alert sweep loop"
            );
            let mut ticker = interval(sweeper.sweep_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        sweeper.sweep_all();
                    }
                    _ = shutdown_rx.recv() => {
                        info!("alert sweep loop shutting down");
                        break;
                    }
                }
            }
        })
    }

    /// Starts the retention purge loop deleting old resolved alerts.
    #[must_use]
    pub fn start_retention(
        self: &Arc<Self>,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        let sweeper = Arc::clone(self);

        tokio::spawn(async move {
            let mut ticker = interval(sweeper.purge_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = sweeper.manager.purge_resolved(sweeper.retention_days) {
                            error!(error = %e, "resolved alert purge failed");
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        info!("retention purge loop shutting down");
                        break;
                    }
                }
            }
        })
    }

    /// Starts the domain event listener. Each event triggers a single-hive
    /// check; failures are logged, never returned to the emitter.
    #[must_use]
    pub fn start_event_listener(
        self: &Arc<Self>,
        mut events_rx: mpsc::UnboundedReceiver<DomainEvent>,
        mut shutdown_rx: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        let sweeper = Arc::clone(self);

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    maybe_event = events_rx.recv() => {
                        match maybe_event {
                            Some(event) => sweeper.handle_event(event),
                            None => {
                                info!("event channel closed, listener exiting");
                                break;
                            }
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        info!("event listener shutting down");
                        break;
                    }
                }
            }
        })
    }

    /// Applies one domain event.
    pub fn handle_event(&self, event: DomainEvent) {
        let hive_id = event.hive_id();

        if let DomainEvent::InspectionRecorded { recorded_at, observations, .. } = &event {
            // Refresh the snapshot first so the re-check sees the new
            // inspection, then clear outstanding overdue alerts for the hive.
            if !self.registry.record_inspection(hive_id, *recorded_at, observations.clone()) {
                warn!(hive = %hive_id, "inspection event for unknown hive, ignoring");
                return;
            }
            if let Err(e) = self.manager.resolve_type_for_hive(hive_id, INSPECTION_OVERDUE) {
                error!(hive = %hive_id, error = %e, "failed to clear overdue alerts");
                return;
            }
        }

        match self.check_hive(hive_id) {
            Ok(issues_found) => {
                info!(hive = %hive_id, issues_found, "event-driven hive check completed");
            }
            Err(AlertError::NotFound) => {
                warn!(hive = %hive_id, "event for unknown hive, ignoring");
            }
            Err(e) => {
                error!(hive = %hive_id, error = %e, "event-driven hive check failed");
            }
        }
    }
}
