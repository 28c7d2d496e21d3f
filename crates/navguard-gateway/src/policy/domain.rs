//! Domain block/allow list compilation and matching.
//!
//! Blocked entries containing `*` compile into an anchored regex where `*`
//! matches any run of characters; other blocked entries, and every allowed
//! entry, are case-sensitive substring matches against the hostname.

use regex::Regex;

use navguard_core::error::{NavGuardError, Result};

/// Compiled blocked-domain entry.
#[derive(Debug, Clone)]
pub enum BlockRule {
    Wildcard { raw: String, re: Regex },
    Substring(String),
}

impl BlockRule {
    pub fn compile(raw: &str) -> Result<Self> {
        if !raw.contains('*') {
            return Ok(BlockRule::Substring(raw.to_string()));
        }
        let body = raw
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        let re = Regex::new(&format!("^{body}$")).map_err(|e| {
            NavGuardError::Config(format!("invalid blocked_domains entry: {raw} ({e})"))
        })?;
        Ok(BlockRule::Wildcard { raw: raw.to_string(), re })
    }

    pub fn matches(&self, host: &str) -> bool {
        match self {
            BlockRule::Wildcard { re, .. } => re.is_match(host),
            BlockRule::Substring(s) => host.contains(s.as_str()),
        }
    }

    pub fn raw(&self) -> &str {
        match self {
            BlockRule::Wildcard { raw, .. } => raw,
            BlockRule::Substring(s) => s,
        }
    }
}

/// Verdict for a single hostname.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainVerdict {
    Allowed,
    Blocked { pattern: String },
    NotInAllowList,
}

#[derive(Debug, Clone, Default)]
pub struct DomainRules {
    blocked: Vec<BlockRule>,
    allowed: Vec<String>,
}

impl DomainRules {
    pub fn compile(blocked: &[String], allowed: &[String]) -> Result<Self> {
        let mut out = Vec::with_capacity(blocked.len());
        for b in blocked {
            out.push(BlockRule::compile(b)?);
        }
        Ok(Self {
            blocked: out,
            allowed: allowed.to_vec(),
        })
    }

    /// Block list first (first matching entry wins), then the allow-list if
    /// one is configured.
    pub fn check(&self, host: &str) -> DomainVerdict {
        if let Some(rule) = self.blocked.iter().find(|r| r.matches(host)) {
            return DomainVerdict::Blocked { pattern: rule.raw().to_string() };
        }

        if !self.allowed.is_empty() && !self.allowed.iter().any(|a| host.contains(a.as_str())) {
            return DomainVerdict::NotInAllowList;
        }

        DomainVerdict::Allowed
    }
}
