use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use navguard_core::action::{
    ActionKind, ActionRequest, ActionResult, BrowserCommand, EnableRequest,
};
use navguard_core::error::{ClientCode, NavGuardError, Result};

use crate::forward::ActionForwarder;
use crate::obs::metrics::NavGuardMetrics;
use crate::policy::{PolicyDecision, PolicyGuard, StatusSnapshot};

/// What a successful `execute` produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Execution {
    /// Browser action forwarded to the backend (which may still have failed).
    Action {
        command: BrowserCommand,
        result: ActionResult,
    },
    Status(StatusSnapshot),
    EnableInstructions(EnableRequest),
}

/// Text-only tool response. Errors also carry a stable client code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolResponse {
    pub content: Vec<ToolContent>,
    #[serde(rename = "isError")]
    pub is_error: bool,
    #[serde(rename = "errorCode", skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolContent {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
}

impl ToolResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent { kind: "text", text: text.into() }],
            is_error: false,
            error_code: None,
        }
    }

    pub fn error(code: ClientCode, text: impl Into<String>) -> Self {
        Self {
            is_error: true,
            error_code: Some(code.as_str()),
            ..Self::text(text)
        }
    }

    /// First (and only) text block.
    pub fn as_text(&self) -> &str {
        self.content.first().map(|c| c.text.as_str()).unwrap_or("")
    }
}

/// Composes the policy gate with the forwarder and renders outcomes as text.
pub struct Dispatcher {
    guard: Arc<PolicyGuard>,
    forwarder: ActionForwarder,
    metrics: Arc<NavGuardMetrics>,
}

impl Dispatcher {
    pub fn new(guard: Arc<PolicyGuard>, forwarder: ActionForwarder, metrics: Arc<NavGuardMetrics>) -> Self {
        Self { guard, forwarder, metrics }
    }

    pub fn guard(&self) -> &PolicyGuard {
        &self.guard
    }

    /// `authorize` then, for browser actions, `invoke`.
    ///
    /// A rejection surfaces as `NavGuardError::Rejected`; the backend is not
    /// contacted in that case.
    pub async fn execute(&self, req: ActionRequest) -> Result<Execution> {
        let action = req.kind.as_str();
        match self.guard.authorize(&req) {
            PolicyDecision::Rejected(reason) => {
                self.metrics
                    .policy_decisions
                    .inc(&[("action", action), ("outcome", reason.as_label())]);
                Err(reason.into())
            }
            PolicyDecision::Authorized { command, actions_used } => {
                self.metrics
                    .policy_decisions
                    .inc(&[("action", action), ("outcome", "pass")]);
                match (req.kind, command) {
                    (_, Some(command)) => {
                        let result = self.forwarder.invoke(&command, actions_used).await;
                        Ok(Execution::Action { command, result })
                    }
                    (ActionKind::CheckStatus, None) => {
                        Ok(Execution::Status(self.guard.status_snapshot()))
                    }
                    (ActionKind::EnableRequest, None) => {
                        Ok(Execution::EnableInstructions(EnableRequest::from_request(&req)?))
                    }
                    (kind, None) => Err(NavGuardError::Internal(format!(
                        "{} authorized without a command",
                        kind.as_str()
                    ))),
                }
            }
        }
    }

    /// Tool-call boundary: resolve the name, run, render. Never fails.
    pub async fn handle_tool(&self, name: &str, args: Value) -> ToolResponse {
        let Some(kind) = ActionKind::from_tool_name(name) else {
            return ToolResponse::error(
                ClientCode::BadRequest,
                format!("Unknown navigation tool: {name}"),
            );
        };

        let req = match ActionRequest::from_value(kind, args) {
            Ok(r) => r,
            Err(r) => return render_error(name, &NavGuardError::from(r)),
        };

        match self.execute(req).await {
            Ok(exec) => render_execution(name, &exec),
            Err(e) => render_error(name, &e),
        }
    }
}

fn render_error(tool: &str, err: &NavGuardError) -> ToolResponse {
    let text = match err {
        NavGuardError::Rejected(r) => r.to_string(),
        other => format!("Error executing {tool}: {other}"),
    };
    ToolResponse::error(err.client_code(), text)
}

fn render_execution(tool: &str, exec: &Execution) -> ToolResponse {
    match exec {
        Execution::Action { result: ActionResult::Failure { error }, .. } => {
            ToolResponse::error(ClientCode::BackendFailed, format!("Error executing {tool}: {error}"))
        }
        Execution::Action { command, result: ActionResult::Success { payload } } => {
            ToolResponse::text(render_success(command, payload))
        }
        Execution::Status(s) => ToolResponse::text(render_status(s)),
        Execution::EnableInstructions(r) => ToolResponse::text(render_enable(r)),
    }
}

/// Backend `success` flag from the passthrough payload, if it sent one.
fn success_flag(payload: &Value) -> String {
    payload
        .get("success")
        .map(|v| v.to_string())
        .unwrap_or_else(|| "unknown".into())
}

fn render_success(command: &BrowserCommand, payload: &Value) -> String {
    let ok = success_flag(payload);
    match command {
        BrowserCommand::Navigate { url } => {
            format!("Successfully navigated to {url}. Page loaded: {ok}")
        }
        BrowserCommand::Click { selector } => format!("Clicked element: {selector}. Success: {ok}"),
        BrowserCommand::FillForm { selector, .. } => {
            format!("Filled form field: {selector}. Success: {ok}")
        }
        BrowserCommand::ScrollTo { x, y } => {
            format!("Scrolled to position ({x}, {y}). Success: {ok}")
        }
        BrowserCommand::WaitForElement { selector, .. } => {
            format!("Waited for element: {selector}. Found: {ok}")
        }
    }
}

fn on_off(b: bool) -> &'static str {
    if b { "ENABLED" } else { "DISABLED" }
}

/// Zero means no usable quota was configured.
fn quota_or_not_set(max: u64) -> String {
    if max == 0 {
        "Not set".into()
    } else {
        max.to_string()
    }
}

fn list_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "None".into()
    } else {
        items.join(", ")
    }
}

fn render_status(s: &StatusSnapshot) -> String {
    format!(
        "Navigation Status:\n\
         - Navigation Abilities: {}\n\
         - URL Navigation: {}\n\
         - Element Clicking: {}\n\
         - Form Filling: {}\n\
         - Actions Used This Session: {}\n\
         - Max Actions Per Session: {}\n\
         - Blocked Domains: {}\n\
         - Allowed Domains: {}",
        on_off(s.enabled),
        on_off(s.capabilities.navigate),
        on_off(s.capabilities.click),
        on_off(s.capabilities.fill_form),
        s.actions_used,
        quota_or_not_set(s.max_actions_per_session),
        list_or_none(&s.blocked_domains),
        list_or_none(&s.allowed_domains),
    )
}

fn render_enable(r: &EnableRequest) -> String {
    format!(
        "To enable navigation abilities, please manually edit the config file and set:\n\
         - navigation_abilities: true\n\
         - enable_url_navigation: {}\n\
         - enable_clicking: {}\n\
         - enable_form_filling: {}\n\n\
         This manual step is required for security reasons.",
        r.enable_url_navigation, r.enable_clicking, r.enable_form_filling,
    )
}

#[cfg(test)]
mod tests {
    use navguard_core::error::Rejection;
    use serde_json::json;

    use super::*;

    #[test]
    fn scroll_coordinates_render_plainly() {
        let cmd = BrowserCommand::ScrollTo { x: 0.into(), y: 250.into() };
        let text = render_success(&cmd, &json!({ "success": true }));
        assert_eq!(text, "Scrolled to position (0, 250). Success: true");
    }

    #[test]
    fn missing_success_flag_is_unknown() {
        let text = render_success(&BrowserCommand::Click { selector: "#a".into() }, &json!("done"));
        assert_eq!(text, "Clicked element: #a. Success: unknown");
    }

    #[test]
    fn status_lists_domains() {
        let s = StatusSnapshot {
            enabled: true,
            capabilities: Default::default(),
            actions_used: 3,
            max_actions_per_session: 10,
            blocked_domains: vec!["*.ads.com".into(), "tracker".into()],
            allowed_domains: vec![],
        };
        let text = render_status(&s);
        assert!(text.contains("- Navigation Abilities: ENABLED"));
        assert!(text.contains("- Element Clicking: DISABLED"));
        assert!(text.contains("- Actions Used This Session: 3"));
        assert!(text.contains("- Max Actions Per Session: 10"));
        assert!(text.contains("- Blocked Domains: *.ads.com, tracker"));
        assert!(text.contains("- Allowed Domains: None"));
    }

    #[test]
    fn zero_quota_reads_not_set() {
        let s = StatusSnapshot {
            enabled: false,
            capabilities: Default::default(),
            actions_used: 0,
            max_actions_per_session: 0,
            blocked_domains: vec![],
            allowed_domains: vec!["corp.internal".into()],
        };
        let text = render_status(&s);
        assert!(text.contains("- Max Actions Per Session: Not set"));
        assert!(text.contains("- Allowed Domains: corp.internal"));
    }

    #[test]
    fn errors_carry_client_codes() {
        let err = NavGuardError::from(Rejection::QuotaExceeded { used: 1, max: 1 });
        let quota = render_error("mcp_clickElement", &err);
        assert_eq!(quota.error_code, Some("QUOTA_EXCEEDED"));
        assert_eq!(quota.as_text(), "Maximum navigation actions exceeded for this session (1/1).");

        let failed = render_execution(
            "mcp_clickElement",
            &Execution::Action {
                command: BrowserCommand::Click { selector: "#a".into() },
                result: ActionResult::Failure { error: "transport: refused".into() },
            },
        );
        assert_eq!(failed.error_code, Some("BACKEND_FAILED"));

        let ok = ToolResponse::text("fine");
        assert_eq!(ok.error_code, None);
        assert!(!serde_json::to_string(&ok).unwrap().contains("errorCode"));
    }
}
