//! Alert lifecycle: typed issues, the durable alert store, reconciliation,
//! and the background sweeper.
//!
//! ## Components
//!
//! - **[`AlertManager`]**: reconciles checker issues into persisted alerts and
//!   handles explicit user transitions
//! - **[`AlertSweeper`]**: periodic and event-driven driver with per-hive
//!   error isolation
//! - **[`AlertStore`]**: storage seam, with an in-memory implementation
//! - **[`Alert`]**, **[`AlertIssue`]**: the persisted record and the transient
//!   checker output it is derived from
//!
//! ## Lifecycle
//!
//! ```text
//!            issue (same type, different severity)
//!          ┌────────────────────────────────────────┐
//!          │                                        ▼
//! create ──► ACTIVE ──(run with zero issues)──► RESOLVED
//!          │   │
//!          │   └──(user action)──► DISMISSED
//!          └──► SUPERSEDED
//! ```
//!
//! Invariant: at most one `Active` alert per `(hive, issue type)`. A dismissed
//! alert never suppresses recurrence: the next issue of the same type creates
//! a fresh `Active` alert.

pub mod manager;
pub mod store;
pub mod sweeper;
pub mod types;

pub use manager::AlertManager;
pub use store::{AlertFilter, AlertStore, MemoryAlertStore};
pub use sweeper::{AlertSweeper, SweepSummary};
pub use types::{Alert, AlertIssue, AlertSeverity, AlertStatus};

use thiserror::Error;

/// Errors surfaced by alert lookups, transitions, and reconciliation.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum AlertError {
    /// The alert does not exist, or belongs to another user. Ownership
    /// failures are deliberately indistinguishable from missing records.
    #[error("alert not found")]
    NotFound,

    /// The requested status change is not a legal lifecycle transition.
    #[error("invalid status transition from {from:?} to {to:?}")]
    InvalidTransition { from: AlertStatus, to: AlertStatus },

    /// The underlying store failed; alert consistency for the affected hive
    /// is not guaranteed and the caller must not swallow this mid-run.
    #[error("alert store failure: {0}")]
    Store(String),
}
