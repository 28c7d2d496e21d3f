//! Tool catalog: one declaration per `ActionKind`.

use serde::Serialize;
use serde_json::{json, Value};

use navguard_core::action::{ActionKind, DEFAULT_WAIT_TIMEOUT_MS};

#[derive(Debug, Clone, Serialize)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

pub fn tool_catalog() -> Vec<ToolSpec> {
    ActionKind::ALL.into_iter().map(tool_spec).collect()
}

pub fn tool_spec(kind: ActionKind) -> ToolSpec {
    let (description, input_schema) = match kind {
        ActionKind::NavigateToUrl => (
            "Navigate to a specific URL",
            object(
                json!({ "url": { "type": "string", "description": "The URL to navigate to" } }),
                &["url"],
            ),
        ),
        ActionKind::ClickElement => (
            "Click on an element using CSS selector",
            object(
                json!({ "selector": { "type": "string", "description": "CSS selector for the element to click" } }),
                &["selector"],
            ),
        ),
        ActionKind::FillForm => (
            "Fill a form field with a value",
            object(
                json!({
                    "selector": { "type": "string", "description": "CSS selector for the form field" },
                    "value": { "type": "string", "description": "Value to fill in the form field" }
                }),
                &["selector", "value"],
            ),
        ),
        ActionKind::ScrollTo => (
            "Scroll to a specific position on the page",
            object(
                json!({
                    "x": { "type": "number", "description": "X coordinate to scroll to" },
                    "y": { "type": "number", "description": "Y coordinate to scroll to" }
                }),
                &["x", "y"],
            ),
        ),
        ActionKind::WaitForElement => (
            "Wait for an element to appear on the page",
            object(
                json!({
                    "selector": { "type": "string", "description": "CSS selector for the element to wait for" },
                    "timeout": {
                        "type": "number",
                        "description": format!("Timeout in milliseconds (default: {DEFAULT_WAIT_TIMEOUT_MS})"),
                        "default": DEFAULT_WAIT_TIMEOUT_MS
                    }
                }),
                &["selector"],
            ),
        ),
        ActionKind::CheckStatus => (
            "Check if navigation abilities are enabled and current limits",
            object(json!({}), &[]),
        ),
        ActionKind::EnableRequest => (
            "Enable navigation abilities (requires manual config change)",
            object(
                json!({
                    "enable_url_navigation": { "type": "boolean", "description": "Enable URL navigation" },
                    "enable_clicking": { "type": "boolean", "description": "Enable element clicking" },
                    "enable_form_filling": { "type": "boolean", "description": "Enable form filling" }
                }),
                &[],
            ),
        ),
    };

    ToolSpec {
        name: kind.tool_name(),
        description,
        input_schema,
    }
}

fn object(properties: Value, required: &[&str]) -> Value {
    let mut schema = json!({ "type": "object", "properties": properties });
    if !required.is_empty() {
        schema["required"] = json!(required);
    }
    schema
}
