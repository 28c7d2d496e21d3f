//! Config loader (strict parsing, fail-closed fallback).
//!
//! YAML is parsed with `serde_yaml`, so the original JSON config files load
//! unchanged.

pub mod schema;

use std::fs;
use std::path::Path;

use navguard_core::error::{NavGuardError, Result};

pub use schema::{BackendSection, LoggingSection, NavGuardConfig, SafetySettings, ServerSection};

pub fn load_from_file(path: impl AsRef<Path>) -> Result<NavGuardConfig> {
    let path = path.as_ref();
    let s = fs::read_to_string(path)
        .map_err(|e| NavGuardError::Config(format!("read {} failed: {e}", path.display())))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<NavGuardConfig> {
    let cfg: NavGuardConfig = serde_yaml::from_str(s)
        .map_err(|e| NavGuardError::Config(format!("invalid config: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Load config, or fall back to [`NavGuardConfig::fail_closed`] on any error.
///
/// The process stays up with every browser action rejected.
pub fn load_or_fail_closed(path: impl AsRef<Path>) -> NavGuardConfig {
    let path = path.as_ref();
    match load_from_file(path) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "config unusable, navigation disabled");
            NavGuardConfig::fail_closed()
        }
    }
}
