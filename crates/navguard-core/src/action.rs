//! Action vocabulary shared by the policy gate, forwarder and dispatcher.
//!
//! Tool names map to [`ActionKind`] by exact lookup, once, at the boundary.
//! Browser actions are then parsed into a typed [`BrowserCommand`] which owns
//! its backend endpoint and payload shape.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Number, Value};

use crate::error::Rejection;

/// Default `timeout` (ms) for `WaitForElement` when the caller omits it.
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 5000;

/// Placeholder written over sensitive parameters before logging.
pub const REDACTED: &str = "[HIDDEN]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    NavigateToUrl,
    ClickElement,
    FillForm,
    ScrollTo,
    WaitForElement,
    CheckStatus,
    EnableRequest,
}

impl ActionKind {
    pub const ALL: [ActionKind; 7] = [
        ActionKind::NavigateToUrl,
        ActionKind::ClickElement,
        ActionKind::FillForm,
        ActionKind::ScrollTo,
        ActionKind::WaitForElement,
        ActionKind::CheckStatus,
        ActionKind::EnableRequest,
    ];

    /// Tool name exposed to the dispatcher.
    pub fn tool_name(self) -> &'static str {
        match self {
            ActionKind::NavigateToUrl => "mcp_navigateToUrl",
            ActionKind::ClickElement => "mcp_clickElement",
            ActionKind::FillForm => "mcp_fillForm",
            ActionKind::ScrollTo => "mcp_scrollTo",
            ActionKind::WaitForElement => "mcp_waitForElement",
            ActionKind::CheckStatus => "mcp_checkNavigationStatus",
            ActionKind::EnableRequest => "mcp_enableNavigation",
        }
    }

    pub fn from_tool_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.tool_name() == name)
    }

    /// Stable label for logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::NavigateToUrl => "navigate_to_url",
            ActionKind::ClickElement => "click_element",
            ActionKind::FillForm => "fill_form",
            ActionKind::ScrollTo => "scroll_to",
            ActionKind::WaitForElement => "wait_for_element",
            ActionKind::CheckStatus => "check_status",
            ActionKind::EnableRequest => "enable_request",
        }
    }

    /// True for kinds that reach the automation backend and consume quota.
    pub fn is_browser_action(self) -> bool {
        !matches!(self, ActionKind::CheckStatus | ActionKind::EnableRequest)
    }

    /// Capability flag gating this kind, if any.
    ///
    /// `ScrollTo` and `WaitForElement` are gated only by the master switch and
    /// the session quota.
    pub fn capability(self) -> Option<Capability> {
        match self {
            ActionKind::NavigateToUrl => Some(Capability::Navigate),
            ActionKind::ClickElement => Some(Capability::Click),
            ActionKind::FillForm => Some(Capability::FillForm),
            _ => None,
        }
    }
}

/// Independently switchable action families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    Navigate,
    Click,
    FillForm,
}

impl Capability {
    /// Human label used in rejection and status text.
    pub fn label(self) -> &'static str {
        match self {
            Capability::Navigate => "URL navigation",
            Capability::Click => "Element clicking",
            Capability::FillForm => "Form filling",
        }
    }
}

/// One requested action, as handed over by the dispatcher.
#[derive(Debug, Clone)]
pub struct ActionRequest {
    pub kind: ActionKind,
    pub params: Map<String, Value>,
}

impl ActionRequest {
    /// Build from a JSON value; anything but an object (or null) is malformed.
    pub fn from_value(kind: ActionKind, args: Value) -> Result<Self, Rejection> {
        let params = match args {
            Value::Object(m) => m,
            Value::Null => Map::new(),
            other => {
                return Err(Rejection::MalformedInput(format!(
                    "arguments must be a JSON object, got {other}"
                )))
            }
        };
        Ok(Self { kind, params })
    }

    pub fn str_param(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }
}

/// Typed browser action, ready to be forwarded.
///
/// Numeric parameters keep the caller's JSON number as-is, so `10` stays an
/// integer on the wire and `1500.5` is not truncated.
#[derive(Debug, Clone, PartialEq)]
pub enum BrowserCommand {
    Navigate { url: String },
    Click { selector: String },
    FillForm { selector: String, value: String },
    ScrollTo { x: Number, y: Number },
    WaitForElement { selector: String, timeout_ms: Number },
}

impl BrowserCommand {
    /// Parse the parameters of a browser action.
    ///
    /// Returns `MalformedInput` for a non-browser kind or a missing/ill-typed
    /// parameter.
    pub fn from_request(req: &ActionRequest) -> Result<Self, Rejection> {
        let cmd = match req.kind {
            ActionKind::NavigateToUrl => BrowserCommand::Navigate {
                url: required_str(req, "url")?,
            },
            ActionKind::ClickElement => BrowserCommand::Click {
                selector: required_str(req, "selector")?,
            },
            ActionKind::FillForm => BrowserCommand::FillForm {
                selector: required_str(req, "selector")?,
                value: required_str(req, "value")?,
            },
            ActionKind::ScrollTo => BrowserCommand::ScrollTo {
                x: required_number(req, "x")?,
                y: required_number(req, "y")?,
            },
            ActionKind::WaitForElement => BrowserCommand::WaitForElement {
                selector: required_str(req, "selector")?,
                timeout_ms: optional_timeout(req)?,
            },
            other => {
                return Err(Rejection::MalformedInput(format!(
                    "{} is not a browser action",
                    other.as_str()
                )))
            }
        };
        Ok(cmd)
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            BrowserCommand::Navigate { .. } => ActionKind::NavigateToUrl,
            BrowserCommand::Click { .. } => ActionKind::ClickElement,
            BrowserCommand::FillForm { .. } => ActionKind::FillForm,
            BrowserCommand::ScrollTo { .. } => ActionKind::ScrollTo,
            BrowserCommand::WaitForElement { .. } => ActionKind::WaitForElement,
        }
    }

    /// Backend path for this command (POST).
    pub fn endpoint(&self) -> &'static str {
        match self {
            BrowserCommand::Navigate { .. } => "/navigate",
            BrowserCommand::Click { .. } => "/click",
            BrowserCommand::FillForm { .. } => "/fill-form",
            BrowserCommand::ScrollTo { .. } => "/scroll",
            BrowserCommand::WaitForElement { .. } => "/wait-for-element",
        }
    }

    /// JSON request body sent to the backend.
    pub fn payload(&self) -> Value {
        match self {
            BrowserCommand::Navigate { url } => json!({ "url": url }),
            BrowserCommand::Click { selector } => json!({ "selector": selector }),
            BrowserCommand::FillForm { selector, value } => {
                json!({ "selector": selector, "value": value })
            }
            BrowserCommand::ScrollTo { x, y } => json!({ "x": x, "y": y }),
            BrowserCommand::WaitForElement { selector, timeout_ms } => {
                json!({ "selector": selector, "timeout": timeout_ms })
            }
        }
    }

    /// Payload with sensitive fields replaced, safe to log.
    pub fn redacted_params(&self) -> Value {
        match self {
            BrowserCommand::FillForm { selector, .. } => {
                json!({ "selector": selector, "value": REDACTED })
            }
            other => other.payload(),
        }
    }
}

fn required_str(req: &ActionRequest, key: &str) -> Result<String, Rejection> {
    match req.params.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(Rejection::MalformedInput(format!("{key} must be a string"))),
        None => Err(Rejection::MalformedInput(format!("missing required parameter: {key}"))),
    }
}

fn required_number(req: &ActionRequest, key: &str) -> Result<Number, Rejection> {
    match req.params.get(key) {
        Some(Value::Number(n)) => Ok(n.clone()),
        Some(_) => Err(Rejection::MalformedInput(format!("{key} must be a number"))),
        None => Err(Rejection::MalformedInput(format!("missing required parameter: {key}"))),
    }
}

fn optional_timeout(req: &ActionRequest) -> Result<Number, Rejection> {
    match req.params.get("timeout") {
        None | Some(Value::Null) => Ok(Number::from(DEFAULT_WAIT_TIMEOUT_MS)),
        Some(Value::Number(n)) => Ok(n.clone()),
        Some(_) => Err(Rejection::MalformedInput("timeout must be a number".into())),
    }
}

/// Flags a caller asked to have enabled. Purely informational: the config is
/// only ever changed by hand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EnableRequest {
    pub enable_url_navigation: bool,
    pub enable_clicking: bool,
    pub enable_form_filling: bool,
}

impl EnableRequest {
    pub fn from_request(req: &ActionRequest) -> Result<Self, Rejection> {
        serde_json::from_value(Value::Object(req.params.clone()))
            .map_err(|e| Rejection::MalformedInput(format!("invalid enable request: {e}")))
    }
}

/// Outcome of a forwarded action.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ActionResult {
    /// Backend answered 2xx; body passed through untouched.
    Success { payload: Value },
    /// Transport error or non-success status.
    Failure { error: String },
}

impl ActionResult {
    pub fn succeeded(&self) -> bool {
        matches!(self, ActionResult::Success { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn req(kind: ActionKind, args: Value) -> ActionRequest {
        ActionRequest::from_value(kind, args).unwrap()
    }

    #[test]
    fn tool_names_are_exact() {
        for kind in ActionKind::ALL {
            assert_eq!(ActionKind::from_tool_name(kind.tool_name()), Some(kind));
        }
        assert_eq!(ActionKind::from_tool_name("mcp_navigateToUrlExtra"), None);
        assert_eq!(ActionKind::from_tool_name("mcp_navigate"), None);
    }

    #[test]
    fn wait_defaults_timeout() {
        let cmd = BrowserCommand::from_request(&req(
            ActionKind::WaitForElement,
            json!({ "selector": "#app" }),
        ))
        .unwrap();
        assert_eq!(cmd.endpoint(), "/wait-for-element");
        assert_eq!(cmd.payload(), json!({ "selector": "#app", "timeout": 5000 }));
    }

    #[test]
    fn numbers_are_forwarded_as_given() {
        let cmd = BrowserCommand::from_request(&req(ActionKind::ScrollTo, json!({ "x": 10, "y": 20 })))
            .unwrap();
        assert_eq!(cmd.payload(), json!({ "x": 10, "y": 20 }));
        assert_eq!(cmd.payload().to_string(), r#"{"x":10,"y":20}"#);

        let cmd = BrowserCommand::from_request(&req(ActionKind::ScrollTo, json!({ "x": -4.5, "y": 0 })))
            .unwrap();
        assert_eq!(cmd.payload(), json!({ "x": -4.5, "y": 0 }));

        let cmd = BrowserCommand::from_request(&req(
            ActionKind::WaitForElement,
            json!({ "selector": "#a", "timeout": 1500.7 }),
        ))
        .unwrap();
        assert_eq!(cmd.payload(), json!({ "selector": "#a", "timeout": 1500.7 }));

        let err = BrowserCommand::from_request(&req(
            ActionKind::WaitForElement,
            json!({ "selector": "#a", "timeout": "soon" }),
        ))
        .unwrap_err();
        assert_eq!(err, Rejection::MalformedInput("timeout must be a number".into()));
    }

    #[test]
    fn fill_form_redacts_value() {
        let cmd = BrowserCommand::from_request(&req(
            ActionKind::FillForm,
            json!({ "selector": "#pw", "value": "secret123" }),
        ))
        .unwrap();
        assert_eq!(cmd.payload()["value"], "secret123");
        assert_eq!(cmd.redacted_params()["value"], REDACTED);
        assert!(!cmd.redacted_params().to_string().contains("secret123"));
    }

    #[test]
    fn missing_params_are_malformed() {
        let err = BrowserCommand::from_request(&req(ActionKind::ScrollTo, json!({ "x": 1 })))
            .unwrap_err();
        assert_eq!(err, Rejection::MalformedInput("missing required parameter: y".into()));

        let err = BrowserCommand::from_request(&req(ActionKind::ClickElement, json!({ "selector": 7 })))
            .unwrap_err();
        assert!(matches!(err, Rejection::MalformedInput(_)));
    }

    #[test]
    fn non_object_args_rejected() {
        let err = ActionRequest::from_value(ActionKind::ClickElement, json!([1, 2])).unwrap_err();
        assert!(matches!(err, Rejection::MalformedInput(_)));
    }

    #[test]
    fn enable_request_defaults_to_false() {
        let r = EnableRequest::from_request(&req(
            ActionKind::EnableRequest,
            json!({ "enable_clicking": true }),
        ))
        .unwrap();
        assert!(r.enable_clicking);
        assert!(!r.enable_url_navigation);
        assert!(!r.enable_form_filling);
    }
}
