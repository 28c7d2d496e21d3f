//! Action audit records and sinks.
//!
//! The forwarder emits one record per backend attempt. Parameters are already
//! redacted by the time a record is built.

use std::sync::Mutex;

use serde::Serialize;
use serde_json::Value;

use navguard_core::action::ActionKind;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionLogRecord {
    pub action: ActionKind,
    pub params: Value,
    pub succeeded: bool,
    /// RFC 3339 / ISO 8601, UTC.
    pub timestamp: String,
    pub session_actions_used: u64,
}

pub trait ActionLogSink: Send + Sync {
    fn record(&self, rec: &ActionLogRecord);
}

/// Production sink: one `tracing` event per record.
#[derive(Debug, Default)]
pub struct TracingSink;

impl ActionLogSink for TracingSink {
    fn record(&self, rec: &ActionLogRecord) {
        let result = if rec.succeeded { "success" } else { "failed" };
        tracing::info!(
            target: "navguard::actions",
            action = rec.action.as_str(),
            params = %rec.params,
            result,
            timestamp = %rec.timestamp,
            session_count = rec.session_actions_used,
            "navigation action"
        );
    }
}

/// Keeps records in memory; used by tests and introspection.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<ActionLogRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<ActionLogRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl ActionLogSink for MemorySink {
    fn record(&self, rec: &ActionLogRecord) {
        if let Ok(mut g) = self.records.lock() {
            g.push(rec.clone());
        }
    }
}
