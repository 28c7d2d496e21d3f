use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use navguard_core::error::{NavGuardError, Result};

use crate::config::BackendSection;

/// Remote automation backend. One POST per forwarded action.
#[async_trait]
pub trait AutomationBackend: Send + Sync {
    /// POST `body` to `path`; 2xx yields the response body, anything else an
    /// error.
    async fn post(&self, path: &str, body: &Value) -> Result<Value>;
}

/// HTTP backend speaking JSON over `reqwest`.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(cfg: &BackendSection) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(cfg.request_timeout_ms))
            .build()
            .map_err(|e| NavGuardError::Internal(format!("http client build failed: {e}")))?;
        Ok(Self {
            client,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl AutomationBackend for HttpBackend {
    async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| NavGuardError::Transport(format!("POST {url} failed: {e}")))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| NavGuardError::Transport(format!("read body from {url} failed: {e}")))?;

        if !status.is_success() {
            return Err(NavGuardError::Backend {
                status: status.as_u16(),
                body: text.trim().to_string(),
            });
        }
        Ok(parse_body(&text))
    }
}

/// The body is opaque to the gate: JSON when it parses, a string otherwise.
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
