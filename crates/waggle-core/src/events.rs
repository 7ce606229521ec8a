//! Domain events that trigger reactive single-hive checks.
//!
//! The wider platform emits these when hives and inspections change; the
//! sweeper consumes them from an in-process channel. Emission is
//! fire-and-forget: a send failure is logged, never propagated to the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::warn;

use crate::{
    scoring::ObservationSet,
    types::{ApiaryId, HiveId, UserId},
};

/// A domain event carrying the identifiers the checkers need.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DomainEvent {
    /// A hive was created.
    #[serde(rename = "hive.created")]
    HiveCreated { hive_id: HiveId, apiary_id: ApiaryId, user_id: UserId },

    /// A hive's settings or status changed.
    #[serde(rename = "hive.updated")]
    HiveUpdated { hive_id: HiveId, apiary_id: ApiaryId, user_id: UserId },

    /// An inspection was recorded for a hive.
    #[serde(rename = "inspection.created")]
    InspectionRecorded {
        hive_id: HiveId,
        apiary_id: ApiaryId,
        user_id: UserId,
        recorded_at: DateTime<Utc>,
        observations: ObservationSet,
    },
}

impl DomainEvent {
    /// The hive the event concerns.
    #[must_use]
    pub fn hive_id(&self) -> HiveId {
        match self {
            Self::HiveCreated { hive_id, .. } |
            Self::HiveUpdated { hive_id, .. } |
            Self::InspectionRecorded { hive_id, .. } => *hive_id,
        }
    }
}

/// Sending half of the event channel, handed to event producers.
#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<DomainEvent>,
}

impl EventSender {
    /// Emits an event, fire-and-forget.
    pub fn emit(&self, event: DomainEvent) {
        if self.tx.send(event).is_err() {
            warn!("event listener is gone, dropping domain event");
        }
    }
}

/// Creates the event channel. The receiver goes to the sweeper's listener
/// task, the sender to whatever produces domain events.
#[must_use]
pub fn channel() -> (EventSender, mpsc::UnboundedReceiver<DomainEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EventSender { tx }, rx)
}
