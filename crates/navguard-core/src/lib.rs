//! navguard core: transport-agnostic action vocabulary and error types.
//!
//! This crate defines the action model and error surface shared by the
//! policy gate, the backend forwarder and the dispatcher. It carries no
//! transport or runtime dependencies.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `Rejection`/`NavGuardError` so a bad
//! request never takes the process down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod action;
pub mod error;

pub use action::{ActionKind, ActionRequest, ActionResult, BrowserCommand, Capability};
/// Shared result type.
pub use error::{NavGuardError, Rejection, Result};
