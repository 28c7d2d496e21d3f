//! Shared application state for the navguard gateway.
//!
//! Builds the policy guard, backend client, forwarder and dispatcher once
//! from config. Startup errors are explicit (Result instead of panic).

use std::sync::Arc;

use navguard_core::error::Result;

use crate::audit::{ActionLogSink, TracingSink};
use crate::config::NavGuardConfig;
use crate::dispatch::Dispatcher;
use crate::forward::{ActionForwarder, AutomationBackend, HttpBackend};
use crate::obs::metrics::NavGuardMetrics;
use crate::policy::PolicyGuard;

#[derive(Clone)]
pub struct AppState {
    dispatcher: Arc<Dispatcher>,
    metrics: Arc<NavGuardMetrics>,
}

impl AppState {
    /// Production wiring: HTTP backend from `cfg.backend`, tracing audit sink.
    pub fn new(cfg: NavGuardConfig) -> Result<Self> {
        let backend = HttpBackend::new(&cfg.backend)?;
        Self::with_parts(cfg, Arc::new(backend), Arc::new(TracingSink))
    }

    /// Wiring with caller-supplied backend and sink.
    pub fn with_parts(
        cfg: NavGuardConfig,
        backend: Arc<dyn AutomationBackend>,
        sink: Arc<dyn ActionLogSink>,
    ) -> Result<Self> {
        let policy = cfg.policy();
        let log_actions = policy.log_actions;

        tracing::info!(
            enabled = policy.navigation_enabled,
            navigate = policy.capabilities.navigate,
            click = policy.capabilities.click,
            fill_form = policy.capabilities.fill_form,
            max_actions = policy.max_actions_per_session,
            blocked = policy.blocked_domains.len(),
            allowed = policy.allowed_domains.len(),
            backend = %cfg.backend.base_url,
            "navigation policy loaded"
        );

        let guard = Arc::new(PolicyGuard::new(policy)?);
        let metrics = Arc::new(NavGuardMetrics::default());
        let forwarder = ActionForwarder::new(backend, sink, Arc::clone(&metrics), log_actions);
        let dispatcher = Dispatcher::new(guard, forwarder, Arc::clone(&metrics));

        Ok(Self {
            dispatcher: Arc::new(dispatcher),
            metrics,
        })
    }

    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.dispatcher)
    }

    pub fn metrics(&self) -> &NavGuardMetrics {
        &self.metrics
    }

    /// Session gauges appended to `/metrics`.
    pub fn metrics_extra(&self) -> Vec<(&'static str, u64)> {
        let snap = self.dispatcher.guard().status_snapshot();
        vec![
            ("navguard_session_actions_used", snap.actions_used),
            ("navguard_session_actions_max", snap.max_actions_per_session),
            ("navguard_navigation_enabled", u64::from(snap.enabled)),
        ]
    }
}
