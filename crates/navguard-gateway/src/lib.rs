//! navguard gateway library entry.
//!
//! This crate wires the policy guard, backend forwarder, audit sink,
//! dispatcher and HTTP surface into one stack. It is consumed by the binary
//! (`main.rs`) and by integration tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod app_state;
pub mod audit;
pub mod config;
pub mod dispatch;
pub mod forward;
pub mod obs;
pub mod ops;
pub mod policy;
pub mod router;
