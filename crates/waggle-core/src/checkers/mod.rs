//! Pluggable hive checkers.
//!
//! A checker is a stateless rule evaluator: it inspects one hive's context
//! snapshot and emits zero or more alert-worthy issues. New rules are added by
//! implementing [`HiveChecker`] and registering the instance into the shared
//! [`CheckerSet`] at startup: the runner never changes.
//!
//! Failure semantics: a failing checker is logged with hive and checker
//! identity and skipped; it never aborts the remaining checkers for that hive
//! or the rest of the sweep.

pub mod health_score;
pub mod inspection_overdue;

pub use health_score::{HealthScoreChecker, HealthScoreConfig};
pub use inspection_overdue::{InspectionOverdueChecker, OverdueConfig};

use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use crate::{
    alerts::AlertIssue,
    types::{CheckRun, HiveContext},
};

/// Errors a checker may surface for one hive evaluation.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum CheckerError {
    /// The hive snapshot is missing data the checker cannot work without.
    #[error("invalid hive state: {0}")]
    InvalidHiveState(String),

    /// Catch-all evaluation failure.
    #[error("checker evaluation failed: {0}")]
    Failed(String),
}

/// A stateless rule evaluator over one hive's context.
pub trait HiveChecker: Send + Sync {
    /// Stable identifier for this checker; doubles as the issue type of the
    /// alerts it produces.
    fn checker_type(&self) -> &'static str;

    /// Evaluates the hive and returns the issues found, possibly none.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckerError`] when evaluation fails; the runner logs it
    /// and continues with the remaining checkers.
    fn check_hive(
        &self,
        ctx: &HiveContext,
        run: &CheckRun,
    ) -> Result<Vec<AlertIssue>, CheckerError>;
}

/// Blanket impl: `Arc<T>` implements [`HiveChecker`] by delegating to the
/// inner `T`, so a shared checker handle can be registered directly.
impl<T: HiveChecker + ?Sized> HiveChecker for Arc<T> {
    fn checker_type(&self) -> &'static str {
        (**self).checker_type()
    }

    fn check_hive(
        &self,
        ctx: &HiveContext,
        run: &CheckRun,
    ) -> Result<Vec<AlertIssue>, CheckerError> {
        (**self).check_hive(ctx, run)
    }
}

/// An ordered set of checkers evaluated uniformly for each hive.
///
/// Constructed explicitly at startup; there is no global registry.
#[derive(Default)]
pub struct CheckerSet {
    checkers: Vec<Box<dyn HiveChecker>>,
}

impl CheckerSet {
    /// Creates an empty checker set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a checker. Evaluation order is registration order.
    #[must_use]
    pub fn register(mut self, checker: Box<dyn HiveChecker>) -> Self {
        self.checkers.push(checker);
        self
    }

    /// Returns the registered checker type names, in evaluation order.
    #[must_use]
    pub fn checker_types(&self) -> Vec<&'static str> {
        self.checkers.iter().map(|c| c.checker_type()).collect()
    }

    /// Returns the number of registered checkers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.checkers.len()
    }

    /// Returns `true` when no checkers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checkers.is_empty()
    }

    /// Runs every checker against one hive, collecting all issues.
    ///
    /// Per-checker failures are logged and skipped so one broken rule cannot
    /// mask the findings of the others.
    #[must_use]
    pub fn run_all(&self, ctx: &HiveContext, run: &CheckRun) -> Vec<AlertIssue> {
        let mut issues = Vec::new();

        for checker in &self.checkers {
            match checker.check_hive(ctx, run) {
                Ok(found) => issues.extend(found),
                Err(e) => {
                    crate::metrics::record_checker_failure(checker.checker_type());
                    warn!(
                        hive = %ctx.hive_id,
                        checker = checker.checker_type(),
                        error = %e,
                        "checker failed, continuing with remaining checkers"
                    );
                }
            }
        }

        issues
    }
}
