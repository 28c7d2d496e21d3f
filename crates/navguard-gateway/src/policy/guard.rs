use std::sync::{Mutex, PoisonError};

use serde::Serialize;

use navguard_core::action::{ActionKind, ActionRequest, BrowserCommand, Capability};
use navguard_core::error::{Rejection, Result};

use super::domain::{DomainRules, DomainVerdict};

/// Per-family switches, resolved once from config.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CapabilityFlags {
    pub navigate: bool,
    pub click: bool,
    pub fill_form: bool,
}

impl CapabilityFlags {
    pub fn allows(&self, cap: Capability) -> bool {
        match cap {
            Capability::Navigate => self.navigate,
            Capability::Click => self.click,
            Capability::FillForm => self.fill_form,
        }
    }

    /// `None` when the kind is not gated by any capability flag.
    pub fn flag_for(&self, kind: ActionKind) -> Option<bool> {
        kind.capability().map(|c| self.allows(c))
    }
}

/// Fully resolved safety policy. Read-only once the guard is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyConfig {
    pub navigation_enabled: bool,
    pub capabilities: CapabilityFlags,
    pub blocked_domains: Vec<String>,
    pub allowed_domains: Vec<String>,
    pub max_actions_per_session: u64,
    pub log_actions: bool,
}

impl PolicyConfig {
    /// Fail-closed policy: nothing is allowed.
    pub fn disabled() -> Self {
        Self {
            navigation_enabled: false,
            capabilities: CapabilityFlags::default(),
            blocked_domains: Vec::new(),
            allowed_domains: Vec::new(),
            max_actions_per_session: 0,
            log_actions: false,
        }
    }
}

/// Decision from policy evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyDecision {
    /// `command` is `None` for the informational kinds, which never consume
    /// quota. `actions_used` is the session count after this decision.
    Authorized {
        command: Option<BrowserCommand>,
        actions_used: u64,
    },
    Rejected(Rejection),
}

/// Session-local accounting. Lives and dies with the process.
#[derive(Debug, Default)]
struct SessionState {
    actions_used: u64,
}

/// Read-only view for introspection tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusSnapshot {
    pub enabled: bool,
    pub capabilities: CapabilityFlags,
    pub actions_used: u64,
    pub max_actions_per_session: u64,
    pub blocked_domains: Vec<String>,
    pub allowed_domains: Vec<String>,
}

/// Single authority for "may this action proceed", and the only writer of
/// the session counter.
/// Construct once at startup, then share via Arc.
pub struct PolicyGuard {
    config: PolicyConfig,
    domains: DomainRules,
    session: Mutex<SessionState>,
}

impl PolicyGuard {
    pub fn new(config: PolicyConfig) -> Result<Self> {
        let domains = DomainRules::compile(&config.blocked_domains, &config.allowed_domains)?;
        Ok(Self {
            config,
            domains,
            session: Mutex::new(SessionState::default()),
        })
    }

    /// Evaluate `req` and, if it passes, charge one unit of session quota.
    ///
    /// The quota check and the increment happen under one lock, so
    /// concurrent callers can never overrun the quota.
    pub fn authorize(&self, req: &ActionRequest) -> PolicyDecision {
        let decision = self.evaluate(req);
        if let PolicyDecision::Rejected(reason) = &decision {
            tracing::debug!(action = req.kind.as_str(), reason = %reason, "action rejected");
        }
        decision
    }

    fn evaluate(&self, req: &ActionRequest) -> PolicyDecision {
        if !req.kind.is_browser_action() {
            return PolicyDecision::Authorized {
                command: None,
                actions_used: self.actions_used(),
            };
        }

        if !self.config.navigation_enabled {
            return PolicyDecision::Rejected(Rejection::NavigationDisabled);
        }

        // Poisoned mutex means logic bug; deny instead of panic.
        let Ok(mut session) = self.session.lock() else {
            return PolicyDecision::Rejected(Rejection::SessionUnavailable);
        };

        let max = self.config.max_actions_per_session;
        if session.actions_used >= max {
            return PolicyDecision::Rejected(Rejection::QuotaExceeded {
                used: session.actions_used,
                max,
            });
        }

        let command = match self.check_kind(req) {
            Ok(c) => c,
            Err(r) => return PolicyDecision::Rejected(r),
        };

        session.actions_used += 1;
        PolicyDecision::Authorized {
            command: Some(command),
            actions_used: session.actions_used,
        }
    }

    fn check_kind(&self, req: &ActionRequest) -> std::result::Result<BrowserCommand, Rejection> {
        if let Some(cap) = req.kind.capability() {
            if !self.config.capabilities.allows(cap) {
                return Err(Rejection::CapabilityDisabled(cap));
            }
        }

        if req.kind == ActionKind::NavigateToUrl {
            let url = req
                .str_param("url")
                .ok_or_else(|| Rejection::InvalidUrl("missing url".into()))?;
            self.check_domain(url)?;
        }

        BrowserCommand::from_request(req)
    }

    fn check_domain(&self, url: &str) -> std::result::Result<(), Rejection> {
        let host = hostname(url)?;
        match self.domains.check(&host) {
            DomainVerdict::Allowed => Ok(()),
            DomainVerdict::Blocked { pattern } => Err(Rejection::DomainBlocked { host, pattern }),
            DomainVerdict::NotInAllowList => Err(Rejection::DomainNotAllowed { host }),
        }
    }

    /// Current count. A poisoned lock still holds a valid counter, so it is
    /// read rather than reported as zero.
    pub fn actions_used(&self) -> u64 {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .actions_used
    }

    pub fn status_snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            enabled: self.config.navigation_enabled,
            capabilities: self.config.capabilities,
            actions_used: self.actions_used(),
            max_actions_per_session: self.config.max_actions_per_session,
            blocked_domains: self.config.blocked_domains.clone(),
            allowed_domains: self.config.allowed_domains.clone(),
        }
    }
}

fn hostname(raw: &str) -> std::result::Result<String, Rejection> {
    let parsed = url::Url::parse(raw).map_err(|e| Rejection::InvalidUrl(format!("{raw}: {e}")))?;
    match parsed.host_str() {
        Some(h) if !h.is_empty() => Ok(h.to_string()),
        _ => Err(Rejection::InvalidUrl(format!("{raw}: no host"))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    fn open_policy(max: u64) -> PolicyConfig {
        PolicyConfig {
            navigation_enabled: true,
            capabilities: CapabilityFlags { navigate: true, click: true, fill_form: true },
            blocked_domains: vec!["*.example.com".into()],
            allowed_domains: vec![],
            max_actions_per_session: max,
            log_actions: true,
        }
    }

    fn req(kind: ActionKind, args: Value) -> ActionRequest {
        ActionRequest::from_value(kind, args).unwrap()
    }

    fn rejection(d: PolicyDecision) -> Rejection {
        match d {
            PolicyDecision::Rejected(r) => r,
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[test]
    fn disabled_rejects_everything_and_keeps_counter() {
        let guard = PolicyGuard::new(PolicyConfig { navigation_enabled: false, ..open_policy(10) })
            .unwrap();
        for kind in ActionKind::ALL.into_iter().filter(|k| k.is_browser_action()) {
            let r = rejection(guard.authorize(&req(kind, json!({}))));
            assert_eq!(r, Rejection::NavigationDisabled);
        }
        assert_eq!(guard.actions_used(), 0);
    }

    #[test]
    fn quota_rejects_next_request_of_any_kind() {
        let guard = PolicyGuard::new(open_policy(2)).unwrap();
        let click = req(ActionKind::ClickElement, json!({ "selector": "#a" }));
        assert!(matches!(guard.authorize(&click), PolicyDecision::Authorized { actions_used: 1, .. }));
        assert!(matches!(guard.authorize(&click), PolicyDecision::Authorized { actions_used: 2, .. }));

        let scroll = req(ActionKind::ScrollTo, json!({ "x": 0, "y": 10 }));
        assert_eq!(
            rejection(guard.authorize(&scroll)),
            Rejection::QuotaExceeded { used: 2, max: 2 }
        );
        assert_eq!(guard.actions_used(), 2);
    }

    #[test]
    fn quota_is_reported_before_invalid_input() {
        let guard = PolicyGuard::new(open_policy(0)).unwrap();
        let bad = req(ActionKind::NavigateToUrl, json!({ "url": "not a url" }));
        assert!(matches!(rejection(guard.authorize(&bad)), Rejection::QuotaExceeded { .. }));
    }

    #[test]
    fn capability_flags_gate_their_kind_only() {
        let policy = PolicyConfig { capabilities: CapabilityFlags::default(), ..open_policy(10) };
        let guard = PolicyGuard::new(policy).unwrap();

        let r = rejection(guard.authorize(&req(ActionKind::ClickElement, json!({ "selector": "#a" }))));
        assert_eq!(r, Rejection::CapabilityDisabled(Capability::Click));
        let r = rejection(guard.authorize(&req(
            ActionKind::FillForm,
            json!({ "selector": "#a", "value": "x" }),
        )));
        assert_eq!(r, Rejection::CapabilityDisabled(Capability::FillForm));

        let scroll = guard.authorize(&req(ActionKind::ScrollTo, json!({ "x": 1, "y": 2 })));
        assert!(matches!(scroll, PolicyDecision::Authorized { actions_used: 1, .. }));
        let wait = guard.authorize(&req(ActionKind::WaitForElement, json!({ "selector": "#b" })));
        assert!(matches!(wait, PolicyDecision::Authorized { actions_used: 2, .. }));
    }

    #[test]
    fn navigate_checks_domain() {
        let guard = PolicyGuard::new(open_policy(10)).unwrap();

        let r = rejection(guard.authorize(&req(
            ActionKind::NavigateToUrl,
            json!({ "url": "https://evil.example.com/login" }),
        )));
        assert_eq!(
            r,
            Rejection::DomainBlocked { host: "evil.example.com".into(), pattern: "*.example.com".into() }
        );

        let ok = guard.authorize(&req(
            ActionKind::NavigateToUrl,
            json!({ "url": "https://good.test.com/" }),
        ));
        match ok {
            PolicyDecision::Authorized { command: Some(cmd), actions_used } => {
                assert_eq!(cmd, BrowserCommand::Navigate { url: "https://good.test.com/".into() });
                assert_eq!(actions_used, 1);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn allow_list_limits_navigation() {
        let policy = PolicyConfig {
            blocked_domains: vec![],
            allowed_domains: vec!["corp.internal".into()],
            ..open_policy(10)
        };
        let guard = PolicyGuard::new(policy).unwrap();

        let r = rejection(guard.authorize(&req(
            ActionKind::NavigateToUrl,
            json!({ "url": "https://external.com/" }),
        )));
        assert_eq!(r, Rejection::DomainNotAllowed { host: "external.com".into() });
        assert_eq!(guard.actions_used(), 0);

        let ok = guard.authorize(&req(
            ActionKind::NavigateToUrl,
            json!({ "url": "https://sub.corp.internal/wiki" }),
        ));
        assert!(matches!(ok, PolicyDecision::Authorized { command: Some(_), actions_used: 1 }));
    }

    #[test]
    fn poisoned_session_denies_but_reports_real_count() {
        let guard = PolicyGuard::new(open_policy(10)).unwrap();
        let click = req(ActionKind::ClickElement, json!({ "selector": "#a" }));
        assert!(matches!(guard.authorize(&click), PolicyDecision::Authorized { .. }));

        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _held = guard.session.lock().unwrap();
            panic!("poison session lock");
        }));
        assert!(guard.session.is_poisoned());

        assert_eq!(rejection(guard.authorize(&click)), Rejection::SessionUnavailable);
        assert_eq!(guard.actions_used(), 1);
        assert_eq!(guard.status_snapshot().actions_used, 1);
    }

    #[test]
    fn malformed_urls_become_rejections() {
        let guard = PolicyGuard::new(open_policy(10)).unwrap();
        for args in [json!({ "url": "::::" }), json!({}), json!({ "url": "mailto:a@b.c" })] {
            let r = rejection(guard.authorize(&req(ActionKind::NavigateToUrl, args)));
            assert!(matches!(r, Rejection::InvalidUrl(_)), "{r:?}");
        }
        assert_eq!(guard.actions_used(), 0);
    }

    #[test]
    fn status_never_consumes_quota() {
        let guard = PolicyGuard::new(PolicyConfig { navigation_enabled: false, ..open_policy(1) })
            .unwrap();
        for _ in 0..5 {
            let d = guard.authorize(&req(ActionKind::CheckStatus, json!({})));
            assert_eq!(d, PolicyDecision::Authorized { command: None, actions_used: 0 });
        }
        let snap = guard.status_snapshot();
        assert!(!snap.enabled);
        assert_eq!(snap.actions_used, 0);
        assert_eq!(snap.max_actions_per_session, 1);
        assert_eq!(snap.blocked_domains, vec!["*.example.com".to_string()]);
    }

    #[test]
    fn flag_for_is_total() {
        let flags = CapabilityFlags { navigate: true, click: false, fill_form: true };
        assert_eq!(flags.flag_for(ActionKind::NavigateToUrl), Some(true));
        assert_eq!(flags.flag_for(ActionKind::ClickElement), Some(false));
        assert_eq!(flags.flag_for(ActionKind::ScrollTo), None);
        assert_eq!(flags.flag_for(ActionKind::WaitForElement), None);
        assert_eq!(flags.flag_for(ActionKind::CheckStatus), None);
    }
}
