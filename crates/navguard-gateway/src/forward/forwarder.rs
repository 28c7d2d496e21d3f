use std::sync::Arc;
use std::time::Instant;

use chrono::{SecondsFormat, Utc};

use navguard_core::action::{ActionResult, BrowserCommand};

use crate::audit::{ActionLogRecord, ActionLogSink};
use crate::obs::metrics::NavGuardMetrics;

use super::backend::AutomationBackend;

/// Turns an authorized command into one backend call and normalizes the
/// outcome. No retries; at most one delivery per call.
pub struct ActionForwarder {
    backend: Arc<dyn AutomationBackend>,
    sink: Arc<dyn ActionLogSink>,
    metrics: Arc<NavGuardMetrics>,
    log_actions: bool,
}

impl ActionForwarder {
    pub fn new(
        backend: Arc<dyn AutomationBackend>,
        sink: Arc<dyn ActionLogSink>,
        metrics: Arc<NavGuardMetrics>,
        log_actions: bool,
    ) -> Self {
        Self { backend, sink, metrics, log_actions }
    }

    /// Forward `cmd`. `actions_used` is the session count charged for it and
    /// only ends up in the audit record.
    pub async fn invoke(&self, cmd: &BrowserCommand, actions_used: u64) -> ActionResult {
        let action = cmd.kind().as_str();
        let started = Instant::now();
        let outcome = self.backend.post(cmd.endpoint(), &cmd.payload()).await;
        self.metrics
            .backend_duration
            .observe(&[("action", action)], started.elapsed());

        let result = match outcome {
            Ok(payload) => ActionResult::Success { payload },
            Err(e) => {
                tracing::warn!(action, endpoint = cmd.endpoint(), error = %e, "backend call failed");
                ActionResult::Failure { error: e.to_string() }
            }
        };

        let label = if result.succeeded() { "success" } else { "failure" };
        self.metrics
            .backend_requests
            .inc(&[("action", action), ("outcome", label)]);

        if self.log_actions {
            self.sink.record(&ActionLogRecord {
                action: cmd.kind(),
                params: cmd.redacted_params(),
                succeeded: result.succeeded(),
                timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                session_actions_used: actions_used,
            });
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use navguard_core::action::{ActionKind, REDACTED};
    use navguard_core::error::{NavGuardError, Result};

    use super::*;
    use crate::audit::MemorySink;

    /// Records calls; answers with a canned result.
    struct FakeBackend {
        calls: Mutex<Vec<(String, Value)>>,
        fail_with: Option<u16>,
    }

    impl FakeBackend {
        fn ok() -> Self {
            Self { calls: Mutex::new(vec![]), fail_with: None }
        }
        fn failing(status: u16) -> Self {
            Self { calls: Mutex::new(vec![]), fail_with: Some(status) }
        }
    }

    #[async_trait]
    impl AutomationBackend for FakeBackend {
        async fn post(&self, path: &str, body: &Value) -> Result<Value> {
            self.calls.lock().unwrap().push((path.to_string(), body.clone()));
            match self.fail_with {
                Some(status) => Err(NavGuardError::Backend { status, body: "boom".into() }),
                None => Ok(json!({ "success": true })),
            }
        }
    }

    fn forwarder(backend: Arc<FakeBackend>, sink: Arc<MemorySink>, log: bool) -> ActionForwarder {
        ActionForwarder::new(backend, sink, Arc::new(NavGuardMetrics::default()), log)
    }

    #[tokio::test]
    async fn fill_form_logs_redacted_value() {
        let backend = Arc::new(FakeBackend::ok());
        let sink = Arc::new(MemorySink::new());
        let fwd = forwarder(backend.clone(), sink.clone(), true);

        let cmd = BrowserCommand::FillForm { selector: "#pw".into(), value: "secret123".into() };
        let res = fwd.invoke(&cmd, 4).await;
        assert!(res.succeeded());

        // backend still receives the real value
        let calls = backend.calls.lock().unwrap().clone();
        assert_eq!(calls, vec![("/fill-form".to_string(), json!({ "selector": "#pw", "value": "secret123" }))]);

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action, ActionKind::FillForm);
        assert_eq!(records[0].params["value"], REDACTED);
        assert!(!records[0].params.to_string().contains("secret123"));
        assert_eq!(records[0].session_actions_used, 4);
        assert!(chrono::DateTime::parse_from_rfc3339(&records[0].timestamp).is_ok());
    }

    #[tokio::test]
    async fn failure_is_a_value_and_still_logged() {
        let backend = Arc::new(FakeBackend::failing(500));
        let sink = Arc::new(MemorySink::new());
        let fwd = forwarder(backend, sink.clone(), true);

        let res = fwd.invoke(&BrowserCommand::Click { selector: "#go".into() }, 1).await;
        assert_eq!(res, ActionResult::Failure { error: "backend returned 500: boom".into() });

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert!(!records[0].succeeded);
    }

    #[tokio::test]
    async fn logging_switch_off_emits_nothing() {
        let sink = Arc::new(MemorySink::new());
        let fwd = forwarder(Arc::new(FakeBackend::ok()), sink.clone(), false);
        fwd.invoke(&BrowserCommand::ScrollTo { x: 0.into(), y: 200.into() }, 1).await;
        assert!(sink.records().is_empty());
    }
}
