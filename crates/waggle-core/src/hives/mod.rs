//! Read-side hive registry.
//!
//! The sweeper and HTTP handlers consult the registry for hive snapshots; in
//! the full platform it fronts the relational database, here a `DashMap`-backed
//! in-memory implementation plays that role.

use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::{
    scoring::ObservationSet,
    types::{HiveContext, HiveId, HiveStatus},
};

/// Source of hive snapshots for checker runs.
pub trait HiveRegistry: Send + Sync {
    /// Snapshots of every active hive, for the periodic sweep.
    fn active_hives(&self) -> Vec<HiveContext>;

    /// Snapshot of one hive, any status.
    fn hive(&self, id: HiveId) -> Option<HiveContext>;

    /// Inserts or replaces a hive snapshot.
    fn upsert(&self, ctx: HiveContext);

    /// Records an inspection: updates the last inspection date and the latest
    /// observations. Returns `false` when the hive is unknown.
    fn record_inspection(
        &self,
        id: HiveId,
        recorded_at: DateTime<Utc>,
        observations: ObservationSet,
    ) -> bool;

    /// Number of registered hives, any status.
    fn len(&self) -> usize;

    /// Returns `true` when no hives are registered.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-process registry backed by a `DashMap`.
#[derive(Default)]
pub struct InMemoryHiveRegistry {
    hives: DashMap<HiveId, HiveContext>,
}

impl InMemoryHiveRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl HiveRegistry for InMemoryHiveRegistry {
    fn active_hives(&self) -> Vec<HiveContext> {
        self.hives
            .iter()
            .filter(|entry| entry.value().status == HiveStatus::Active)
            .map(|entry| entry.value().clone())
            .collect()
    }

    fn hive(&self, id: HiveId) -> Option<HiveContext> {
        self.hives.get(&id).map(|entry| entry.value().clone())
    }

    fn upsert(&self, ctx: HiveContext) {
        self.hives.insert(ctx.hive_id, ctx);
    }

    fn record_inspection(
        &self,
        id: HiveId,
        recorded_at: DateTime<Utc>,
        observations: ObservationSet,
    ) -> bool {
        match self.hives.get_mut(&id) {
            Some(mut entry) => {
                let hive = entry.value_mut();
                // An out-of-order event must not roll the snapshot back.
                if hive.last_inspection_date.is_none_or(|prev| recorded_at >= prev) {
                    hive.last_inspection_date = Some(recorded_at);
                    hive.latest_observations = Some(observations);
                }
                true
            }
            None => false,
        }
    }

    fn len(&self) -> usize {
        self.hives.len()
    }
}
