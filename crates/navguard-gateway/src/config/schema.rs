use std::net::SocketAddr;

use serde::Deserialize;
use navguard_core::error::{NavGuardError, Result};

use crate::policy::domain::DomainRules;
use crate::policy::{CapabilityFlags, PolicyConfig};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NavGuardConfig {
    pub version: u32,

    #[serde(default)]
    pub server: ServerSection,

    #[serde(default)]
    pub backend: BackendSection,

    /// Master switch.
    #[serde(default)]
    pub navigation_abilities: bool,

    #[serde(default)]
    pub safety_settings: SafetySettings,

    #[serde(default)]
    pub logging: LoggingSection,
}

impl NavGuardConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(NavGuardError::UnsupportedVersion);
        }

        self.server.validate()?;
        self.backend.validate()?;
        self.safety_settings.validate()?;

        Ok(())
    }

    /// Everything defaulted and navigation switched off.
    pub fn fail_closed() -> Self {
        Self {
            version: 1,
            server: ServerSection::default(),
            backend: BackendSection::default(),
            navigation_abilities: false,
            safety_settings: SafetySettings::default(),
            logging: LoggingSection::default(),
        }
    }

    /// Resolve the policy view consumed by `PolicyGuard`.
    pub fn policy(&self) -> PolicyConfig {
        let s = &self.safety_settings;
        PolicyConfig {
            navigation_enabled: self.navigation_abilities,
            capabilities: CapabilityFlags {
                navigate: s.enable_url_navigation,
                click: s.enable_clicking,
                fill_form: s.enable_form_filling,
            },
            blocked_domains: s.blocked_domains.clone(),
            allowed_domains: s.allowed_domains.clone(),
            max_actions_per_session: s.max_navigation_actions_per_session,
            log_actions: self.logging.log_navigation_actions,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self { listen: default_listen() }
    }
}

impl ServerSection {
    pub fn validate(&self) -> Result<()> {
        self.listen
            .parse::<SocketAddr>()
            .map_err(|_| NavGuardError::Config("server.listen must be a valid SocketAddr".into()))?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for BackendSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl BackendSection {
    pub fn validate(&self) -> Result<()> {
        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| NavGuardError::Config(format!("backend.base_url invalid: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(NavGuardError::Config(
                "backend.base_url must be http or https".into(),
            ));
        }
        if !(1000..=600000).contains(&self.request_timeout_ms) {
            return Err(NavGuardError::Config(
                "backend.request_timeout_ms must be between 1000 and 600000".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SafetySettings {
    #[serde(default)]
    pub enable_url_navigation: bool,
    #[serde(default)]
    pub enable_clicking: bool,
    #[serde(default)]
    pub enable_form_filling: bool,

    #[serde(default = "default_max_actions")]
    pub max_navigation_actions_per_session: u64,

    #[serde(default)]
    pub blocked_domains: Vec<String>,
    #[serde(default)]
    pub allowed_domains: Vec<String>,
}

impl Default for SafetySettings {
    fn default() -> Self {
        Self {
            enable_url_navigation: false,
            enable_clicking: false,
            enable_form_filling: false,
            max_navigation_actions_per_session: default_max_actions(),
            blocked_domains: Vec::new(),
            allowed_domains: Vec::new(),
        }
    }
}

impl SafetySettings {
    pub fn validate(&self) -> Result<()> {
        let empty = self
            .blocked_domains
            .iter()
            .chain(&self.allowed_domains)
            .any(|p| p.trim().is_empty());
        if empty {
            return Err(NavGuardError::Config(
                "safety_settings domain patterns must not be empty".into(),
            ));
        }
        DomainRules::compile(&self.blocked_domains, &self.allowed_domains)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    #[serde(default = "default_true")]
    pub log_navigation_actions: bool,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self { log_navigation_actions: default_true() }
    }
}

fn default_listen() -> String {
    "127.0.0.1:8088".into()
}
fn default_base_url() -> String {
    "http://localhost:3025".into()
}
fn default_request_timeout_ms() -> u64 {
    30000
}
fn default_max_actions() -> u64 {
    50
}
fn default_true() -> bool {
    true
}
