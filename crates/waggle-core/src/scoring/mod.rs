//! Weighted hive health scoring over inspection observations.
//!
//! Converts a set of optional inspection measurements into composite
//! population, stores, queen, and overall scores on a 0–10 scale, plus
//! qualitative warnings and a confidence measure. Absent observations are
//! skipped, never coerced to zero: a sub-score with no contributing inputs is
//! `None`, and missing sub-scores reduce the overall score's effective inputs
//! rather than dragging it down.

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One inspection's worth of observations. Every field is optional: absence
/// means "not observed", not zero.
///
/// Numeric fields use a 0–10 scale as entered by the beekeeper;
/// `queen_cells` is a raw count.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationSet {
    /// Colony strength estimate (0–10).
    pub strength: Option<f64>,
    /// Capped brood coverage (0–10).
    pub capped_brood: Option<f64>,
    /// Uncapped (open) brood coverage (0–10).
    pub uncapped_brood: Option<f64>,
    /// Honey stores (0–10).
    pub honey_stores: Option<f64>,
    /// Pollen stores (0–10).
    pub pollen_stores: Option<f64>,
    /// Number of queen cells seen.
    pub queen_cells: Option<u32>,
    /// Swarm cells present.
    pub swarm_cells: Option<bool>,
    /// Supersedure cells present.
    pub supersedure_cells: Option<bool>,
    /// Queen spotted during the inspection.
    pub queen_seen: Option<bool>,
}

/// Weights for each scoring factor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringWeights {
    /// Colony strength weight within the population score (default: 2.0).
    #[serde(default = "default_strength_weight")]
    pub strength: f64,

    /// Brood coverage weight within the population score (default: 1.0).
    #[serde(default = "default_brood_weight")]
    pub brood: f64,

    /// Honey stores weight within the stores score (default: 2.0).
    #[serde(default = "default_honey_weight")]
    pub honey: f64,

    /// Pollen stores weight within the stores score (default: 1.0).
    #[serde(default = "default_pollen_weight")]
    pub pollen: f64,

    /// Queen cell count weight within the queen score (default: 2.0).
    #[serde(default = "default_queen_cells_weight")]
    pub queen_cells: f64,

    /// Brood coverage weight within the queen score (default: 2.0).
    #[serde(default = "default_queen_brood_weight")]
    pub queen_brood: f64,

    /// Weight of each boolean queen signal (swarm cells, supersedure cells,
    /// queen seen) within the queen score (default: 1.0).
    #[serde(default = "default_queen_flag_weight")]
    pub queen_flag: f64,

    /// Population sub-score weight within the overall score (default: 2.0).
    #[serde(default = "default_overall_population_weight")]
    pub overall_population: f64,

    /// Stores sub-score weight within the overall score (default: 1.0).
    #[serde(default = "default_overall_stores_weight")]
    pub overall_stores: f64,

    /// Queen sub-score weight within the overall score (default: 1.0).
    #[serde(default = "default_overall_queen_weight")]
    pub overall_queen: f64,
}

fn default_strength_weight() -> f64 {
    2.0
}
fn default_brood_weight() -> f64 {
    1.0
}
fn default_honey_weight() -> f64 {
    2.0
}
fn default_pollen_weight() -> f64 {
    1.0
}
fn default_queen_cells_weight() -> f64 {
    2.0
}
fn default_queen_brood_weight() -> f64 {
    2.0
}
fn default_queen_flag_weight() -> f64 {
    1.0
}
fn default_overall_population_weight() -> f64 {
    2.0
}
fn default_overall_stores_weight() -> f64 {
    1.0
}
fn default_overall_queen_weight() -> f64 {
    1.0
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            strength: 2.0,
            brood: 1.0,
            honey: 2.0,
            pollen: 1.0,
            queen_cells: 2.0,
            queen_brood: 2.0,
            queen_flag: 1.0,
            overall_population: 2.0,
            overall_stores: 1.0,
            overall_queen: 1.0,
        }
    }
}

/// Computed health scores for one observation set.
///
/// Each sub-score is `None` when none of its inputs were observed. All present
/// values are rounded to two decimal places.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreResult {
    pub overall: Option<f64>,
    pub population: Option<f64>,
    pub stores: Option<f64>,
    pub queen: Option<f64>,
    /// Qualitative warnings in rule declaration order.
    pub warnings: Vec<&'static str>,
    /// Fraction of the three sub-scores (population, queen, stores) that had
    /// at least one contributing observation: 0, 1/3, 2/3, or 1.
    pub confidence: f64,
}

/// Warning emitted when both brood counts are exactly zero.
pub const WARNING_NO_BROOD: &str = "no brood recorded";
/// Warning emitted when swarm cells are present alongside queen cells.
pub const WARNING_SWARM_PREPARATION: &str = "possible swarm preparation";
/// Warning emitted when supersedure cells are present alongside queen cells.
pub const WARNING_SUPERSEDURE: &str = "possible supersedure";

/// Scoring engine holding hot-swappable weights.
///
/// Weights are stored in an `ArcSwap` so they can be re-tuned at runtime
/// (admin operation) without blocking concurrent scoring.
pub struct HiveScorer {
    weights: ArcSwap<ScoringWeights>,
}

impl HiveScorer {
    /// Creates a scorer with the given weights.
    #[must_use]
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights: ArcSwap::from_pointee(weights) }
    }

    /// Replaces the scoring weights at runtime.
    ///
    /// Lock-free operation using `ArcSwap::store`.
    pub fn update_weights(&self, weights: ScoringWeights) {
        self.weights.store(Arc::new(weights));
    }

    /// Returns the current weights.
    #[must_use]
    pub fn weights(&self) -> ScoringWeights {
        (**self.weights.load()).clone()
    }

    /// Scores one observation set.
    ///
    /// An all-null input yields all-`None` scores, no warnings, and
    /// confidence 0.
    #[must_use]
    pub fn score(&self, obs: &ObservationSet) -> ScoreResult {
        let w = self.weights.load();

        let population = weighted(&[
            (obs.strength, w.strength),
            (obs.capped_brood, w.brood),
            (obs.uncapped_brood, w.brood),
        ]);

        let stores = weighted(&[(obs.honey_stores, w.honey), (obs.pollen_stores, w.pollen)]);

        // Queen cells count against the queen: zero cells is a 10, ten or
        // more cells is a 0.
        let queen_cell_score =
            obs.queen_cells.map(|cells| 10.0 - f64::from(cells.min(10)));

        let queen = weighted(&[
            (queen_cell_score, w.queen_cells),
            (obs.capped_brood, w.queen_brood),
            (obs.uncapped_brood, w.queen_brood),
            (bool_score(obs.swarm_cells, 0.0, 10.0), w.queen_flag),
            (bool_score(obs.supersedure_cells, 0.0, 10.0), w.queen_flag),
            (bool_score(obs.queen_seen, 10.0, 0.0), w.queen_flag),
        ]);

        // Composed from the sub-scores, so a missing sub-score shrinks the
        // overall's effective inputs instead of counting as zero.
        let overall = weighted(&[
            (population, w.overall_population),
            (stores, w.overall_stores),
            (queen, w.overall_queen),
        ]);

        let present =
            [population, queen, stores].iter().filter(|s| s.is_some()).count();
        #[allow(clippy::cast_precision_loss)]
        let confidence = present as f64 / 3.0;

        ScoreResult {
            overall: overall.map(round2),
            population: population.map(round2),
            stores: stores.map(round2),
            queen: queen.map(round2),
            warnings: collect_warnings(obs),
            confidence,
        }
    }
}

impl Default for HiveScorer {
    fn default() -> Self {
        Self::new(ScoringWeights::default())
    }
}

/// Weighted average over `(value, weight)` pairs, skipping absent values.
///
/// Returns `None` when every value is absent: the weight sum of present
/// entries is the divisor, so there is no divide-by-zero path.
fn weighted(pairs: &[(Option<f64>, f64)]) -> Option<f64> {
    let mut sum = 0.0;
    let mut weight_sum = 0.0;

    for (value, weight) in pairs {
        if let Some(v) = value {
            sum += v * weight;
            weight_sum += weight;
        }
    }

    if weight_sum == 0.0 {
        None
    } else {
        Some(sum / weight_sum)
    }
}

/// Maps an optional boolean observation onto the score scale.
///
/// Absent booleans contribute nothing: an unanswered "swarm cells?" is not
/// the same observation as "no swarm cells".
fn bool_score(value: Option<bool>, if_true: f64, if_false: f64) -> Option<f64> {
    value.map(|v| if v { if_true } else { if_false })
}

/// Applies the ordered, independent warning rules over the raw observations.
fn collect_warnings(obs: &ObservationSet) -> Vec<&'static str> {
    let mut warnings = Vec::new();

    if obs.capped_brood == Some(0.0) && obs.uncapped_brood == Some(0.0) {
        warnings.push(WARNING_NO_BROOD);
    }

    let has_queen_cells = obs.queen_cells.is_some_and(|c| c > 0);
    if obs.swarm_cells == Some(true) && has_queen_cells {
        warnings.push(WARNING_SWARM_PREPARATION);
    }
    if obs.supersedure_cells == Some(true) && has_queen_cells {
        warnings.push(WARNING_SUPERSEDURE);
    }

    warnings
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
