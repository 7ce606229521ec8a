//! Low health score checker.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{CheckerError, HiveChecker};
use crate::{
    alerts::{AlertIssue, AlertSeverity},
    scoring::HiveScorer,
    types::{CheckRun, HiveContext, HiveStatus},
};

/// Issue type emitted by [`HealthScoreChecker`].
pub const LOW_HEALTH_SCORE: &str = "low_health_score";

/// Thresholds for the health score checker, on the 0–10 score scale.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HealthScoreConfig {
    /// Overall scores below this emit a `Medium` issue (default: 5.0).
    #[serde(default = "default_warn_below")]
    pub warn_below: f64,

    /// Overall scores below this emit a `High` issue (default: 3.0).
    #[serde(default = "default_critical_below")]
    pub critical_below: f64,
}

fn default_warn_below() -> f64 {
    5.0
}
fn default_critical_below() -> f64 {
    3.0
}

impl Default for HealthScoreConfig {
    fn default() -> Self {
        Self { warn_below: 5.0, critical_below: 3.0 }
    }
}

/// Scores the hive's latest observations through the metrics engine and flags
/// hives whose overall health falls below the configured thresholds.
///
/// Emits nothing when the hive has no recorded observations or when the
/// overall score is not computable from what was observed.
pub struct HealthScoreChecker {
    scorer: Arc<HiveScorer>,
    config: HealthScoreConfig,
}

impl HealthScoreChecker {
    /// Creates the checker around a shared scorer.
    #[must_use]
    pub fn new(scorer: Arc<HiveScorer>, config: HealthScoreConfig) -> Self {
        Self { scorer, config }
    }
}

impl HiveChecker for HealthScoreChecker {
    fn checker_type(&self) -> &'static str {
        LOW_HEALTH_SCORE
    }

    fn check_hive(
        &self,
        ctx: &HiveContext,
        _run: &CheckRun,
    ) -> Result<Vec<AlertIssue>, CheckerError> {
        if ctx.status != HiveStatus::Active {
            return Ok(Vec::new());
        }
        let Some(observations) = &ctx.latest_observations else {
            return Ok(Vec::new());
        };

        let score = self.scorer.score(observations);
        let Some(overall) = score.overall else {
            return Ok(Vec::new());
        };

        let severity = if overall < self.config.critical_below {
            AlertSeverity::High
        } else if overall < self.config.warn_below {
            AlertSeverity::Medium
        } else {
            return Ok(Vec::new());
        };

        let message = format!(
            "Hive '{}' health score is {overall:.2} (confidence {:.0}%)",
            ctx.name,
            score.confidence * 100.0
        );

        Ok(vec![AlertIssue::new(LOW_HEALTH_SCORE, message, severity).with_metadata(json!({
            "overall": score.overall,
            "population": score.population,
            "stores": score.stores,
            "queen": score.queen,
            "confidence": score.confidence,
            "warnings": score.warnings,
        }))])
    }
}
