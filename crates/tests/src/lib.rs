//! Integration tests for the Waggle alerting core.
//!
//! This crate contains the cross-module test suites:
//!
//! - `scoring_tests`: weighted health scoring over inspection observations
//! - `reconciliation_tests`: alert lifecycle reconciliation driven through
//!   single-hive checks (idempotency, supersession, all-clear, dismissal)
//! - `checker_tests`: checker behavior and per-checker failure isolation
//! - `sweep_tests`: full sweeps, per-hive failure isolation, domain events,
//!   and background task shutdown
//! - `api_tests`: the HTTP surface, driven in-process with `oneshot`
//! - `support`: reusable fixtures (scripted checkers, a failing store,
//!   hive builders)
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --package tests
//! ```


#[cfg(test)]
mod reconciliation_tests;



#[cfg(test)]
mod api_tests;

/// Reusable fixtures for testing.
pub mod support;
