//! # Waggle Core
//!
//! Core library for the Waggle hive health monitoring service.
//!
//! This crate provides the foundational components for:
//!
//! - **[`scoring`]**: Pure metrics engine converting inspection observations into
//!   weighted composite health scores with partial-data handling.
//!
//! - **[`checkers`]**: Pluggable rule evaluators that inspect a hive's current
//!   state and emit alert-worthy issues (inspection overdue, low health score).
//!
//! - **[`alerts`]**: Alert store, lifecycle reconciliation (supersession,
//!   all-clear resolution, dismissal), and the background sweeper.
//!
//! - **[`hives`]**: Read-side hive registry the sweeper and handlers consult.
//!
//! - **[`events`]**: Domain events (`hive.created`, `hive.updated`,
//!   `inspection.created`) that trigger reactive single-hive checks.
//!
//! - **[`config`]**: Layered application configuration (defaults, TOML file,
//!   environment overrides).
//!
//! - **[`metrics`]**: Prometheus metrics recording for sweeps and alert
//!   lifecycle transitions.
//!
//! ## Architecture
//!
//! ```text
//! Scheduler / Domain Event
//!       │
//!       ▼
//! ┌──────────────┐     ┌───────────────┐
//! │ AlertSweeper │────►│  HiveRegistry │  (HiveContext snapshots)
//! └──────┬───────┘     └───────────────┘
//!        │
//!        ▼
//! ┌──────────────┐     ┌───────────────┐
//! │  CheckerSet  │────►│  HiveScorer   │  (observations → ScoreResult)
//! └──────┬───────┘     └───────────────┘
//!        │ issues
//!        ▼
//! ┌──────────────┐     ┌───────────────┐
//! │ AlertManager │────►│  AlertStore   │  (reconcile → Active/Superseded/
//! └──────────────┘     └───────────────┘   Resolved/Dismissed records)
//! ```
//!
//! Each hive is processed independently: one checker's failure never aborts the
//! other checkers for that hive, and one hive's failure never aborts the sweep.
//! Reconciliation is idempotent, so an event-driven check overlapping a
//! scheduled sweep for the same hive converges to the same alert state.

pub mod alerts;
pub mod checkers;
pub mod config;
pub mod events;
pub mod hives;
pub mod metrics;
pub mod scoring;
pub mod types;
