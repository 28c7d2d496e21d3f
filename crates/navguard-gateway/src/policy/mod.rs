//! Policy layer (master switch, capability flags, domain lists, session quota).
//!
//! Compiles the safety settings into fast lookup structures once, then
//! answers per-action authorization for the dispatcher.

pub mod domain;
pub mod guard;

pub use guard::{CapabilityFlags, PolicyConfig, PolicyDecision, PolicyGuard, StatusSnapshot};
