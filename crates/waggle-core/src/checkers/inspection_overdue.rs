//! Inspection overdue checker.

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{CheckerError, HiveChecker};
use crate::{
    alerts::{AlertIssue, AlertSeverity},
    types::{CheckRun, HiveContext, HiveStatus},
};

/// Issue type emitted by [`InspectionOverdueChecker`].
pub const INSPECTION_OVERDUE: &str = "inspection_overdue";

/// Severity breakpoints for the overdue checker, expressed as multiples of
/// the hive's inspection frequency rather than absolute days, so a hive on a
/// 14-day schedule escalates at the same relative pace as one on 7 days.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct OverdueConfig {
    /// Severity becomes `Medium` once the days since the last inspection
    /// reach this multiple of the frequency (default: 2.0).
    #[serde(default = "default_medium_ratio")]
    pub medium_ratio: f64,

    /// Severity becomes `High` at this multiple (default: 4.0).
    #[serde(default = "default_high_ratio")]
    pub high_ratio: f64,

    /// Severity becomes `Critical` at this multiple (default: 8.0).
    #[serde(default = "default_critical_ratio")]
    pub critical_ratio: f64,
}

fn default_medium_ratio() -> f64 {
    2.0
}
fn default_high_ratio() -> f64 {
    4.0
}
fn default_critical_ratio() -> f64 {
    8.0
}

impl Default for OverdueConfig {
    fn default() -> Self {
        Self { medium_ratio: 2.0, high_ratio: 4.0, critical_ratio: 8.0 }
    }
}

/// Flags hives whose last inspection (or creation, if never inspected) is
/// older than their configured inspection frequency, with severity scaled to
/// how overdue the hive is.
pub struct InspectionOverdueChecker {
    config: OverdueConfig,
}

impl InspectionOverdueChecker {
    /// Creates the checker with the given severity breakpoints.
    #[must_use]
    pub fn new(config: OverdueConfig) -> Self {
        Self { config }
    }

    fn severity_for(&self, elapsed_days: i64, frequency_days: i64) -> AlertSeverity {
        #[allow(clippy::cast_precision_loss)]
        let ratio = elapsed_days as f64 / frequency_days as f64;

        if ratio >= self.config.critical_ratio {
            AlertSeverity::Critical
        } else if ratio >= self.config.high_ratio {
            AlertSeverity::High
        } else if ratio >= self.config.medium_ratio {
            AlertSeverity::Medium
        } else {
            AlertSeverity::Low
        }
    }
}

impl Default for InspectionOverdueChecker {
    fn default() -> Self {
        Self::new(OverdueConfig::default())
    }
}

impl HiveChecker for InspectionOverdueChecker {
    fn checker_type(&self) -> &'static str {
        INSPECTION_OVERDUE
    }

    fn check_hive(
        &self,
        ctx: &HiveContext,
        run: &CheckRun,
    ) -> Result<Vec<AlertIssue>, CheckerError> {
        if ctx.status != HiveStatus::Active {
            return Ok(Vec::new());
        }

        // A hive that was never inspected is measured from its creation date.
        let reference = ctx.last_inspection_date.unwrap_or(ctx.created_at);
        let elapsed_days = (run.now - reference).num_days();
        let frequency_days = i64::from(ctx.settings.inspection_frequency_days.max(1));

        if elapsed_days <= frequency_days {
            return Ok(Vec::new());
        }

        let severity = self.severity_for(elapsed_days, frequency_days);
        let message = format!(
            "Hive '{}' has not been inspected for {elapsed_days} days \
             (scheduled every {frequency_days} days)",
            ctx.name
        );

        Ok(vec![AlertIssue::new(INSPECTION_OVERDUE, message, severity).with_metadata(
            json!({
                "days_since_inspection": elapsed_days,
                "frequency_days": frequency_days,
                "last_inspection_date": ctx.last_inspection_date,
            }),
        )])
    }
}
