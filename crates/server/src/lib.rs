//! Waggle HTTP server library.
//!
//! Exposes the router and middleware so integration tests can drive the API
//! in-process with `tower::ServiceExt::oneshot`; the binary in `main.rs` wires
//! the same pieces against a real listener.

pub mod middleware;
pub mod router;
