//! Shared domain types: identifiers and the hive snapshot handed to checkers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scoring::ObservationSet;

/// Identifier of a hive.
pub type HiveId = Uuid;
/// Identifier of an apiary (a group of hives at one location).
pub type ApiaryId = Uuid;
/// Identifier of the owning user.
pub type UserId = Uuid;

/// Operational status of a hive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HiveStatus {
    /// Hive is in use and should be swept by the checkers.
    Active,
    /// Hive is retired, merged away, or dead; excluded from sweeps.
    Inactive,
}

/// Per-hive settings that influence checker behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiveSettings {
    /// How often the hive should be inspected, in days.
    #[serde(default = "default_inspection_frequency_days")]
    pub inspection_frequency_days: u32,
}

fn default_inspection_frequency_days() -> u32 {
    7
}

impl Default for HiveSettings {
    fn default() -> Self {
        Self { inspection_frequency_days: 7 }
    }
}

/// Read-only snapshot of a hive's state passed to checkers.
///
/// Assembled by the registry; checkers never mutate it. In the full platform
/// this is hydrated from the relational database, here the in-memory registry
/// plays that role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HiveContext {
    pub hive_id: HiveId,
    pub name: String,
    pub status: HiveStatus,
    pub apiary_id: ApiaryId,
    pub user_id: UserId,
    #[serde(default)]
    pub settings: HiveSettings,
    pub created_at: DateTime<Utc>,
    /// Date of the most recent inspection, if the hive was ever inspected.
    pub last_inspection_date: Option<DateTime<Utc>>,
    /// Observations from the most recent inspection, if any.
    pub latest_observations: Option<ObservationSet>,
}

/// Context for one checker evaluation run.
#[derive(Debug, Clone, Copy)]
pub struct CheckRun {
    /// Wall-clock time the run was started with; checkers must not call
    /// `Utc::now()` themselves so a run is reproducible.
    pub now: DateTime<Utc>,
    pub apiary_id: ApiaryId,
    pub user_id: UserId,
}

impl CheckRun {
    /// Creates a run context for the given hive snapshot, pinned to `now`.
    #[must_use]
    pub fn for_hive(ctx: &HiveContext, now: DateTime<Utc>) -> Self {
        Self { now, apiary_id: ctx.apiary_id, user_id: ctx.user_id }
    }
}
