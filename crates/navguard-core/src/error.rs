//! Shared error type across navguard crates.

use thiserror::Error;

use crate::action::Capability;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed request.
    BadRequest,
    /// Not allowed by policy.
    NotAllowed,
    /// Session action quota used up.
    QuotaExceeded,
    /// Automation backend unreachable or returned an error.
    BackendFailed,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::NotAllowed => "NOT_ALLOWED",
            ClientCode::QuotaExceeded => "QUOTA_EXCEEDED",
            ClientCode::BackendFailed => "BACKEND_FAILED",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Why the policy gate refused an action.
///
/// Rejections are values, never faults: they do not consume quota and the
/// backend is never contacted for a rejected action.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Navigation is disabled. Please enable navigation_abilities in the config file.")]
    NavigationDisabled,
    #[error("Maximum navigation actions exceeded for this session ({used}/{max}).")]
    QuotaExceeded { used: u64, max: u64 },
    #[error("{} is disabled in safety settings.", .0.label())]
    CapabilityDisabled(Capability),
    #[error("Domain not allowed: {host} (blocked by {pattern})")]
    DomainBlocked { host: String, pattern: String },
    #[error("Domain not allowed: {host} (not in allow-list)")]
    DomainNotAllowed { host: String },
    #[error("Invalid url: {0}")]
    InvalidUrl(String),
    #[error("Malformed input: {0}")]
    MalformedInput(String),
    #[error("Session state unavailable")]
    SessionUnavailable,
}

impl Rejection {
    pub fn client_code(&self) -> ClientCode {
        match self {
            Rejection::QuotaExceeded { .. } => ClientCode::QuotaExceeded,
            Rejection::InvalidUrl(_) | Rejection::MalformedInput(_) => ClientCode::BadRequest,
            Rejection::SessionUnavailable => ClientCode::Internal,
            _ => ClientCode::NotAllowed,
        }
    }

    /// Short label for metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            Rejection::NavigationDisabled => "disabled",
            Rejection::QuotaExceeded { .. } => "quota_exceeded",
            Rejection::CapabilityDisabled(_) => "capability_disabled",
            Rejection::DomainBlocked { .. } => "domain_blocked",
            Rejection::DomainNotAllowed { .. } => "domain_not_allowed",
            Rejection::InvalidUrl(_) => "invalid_url",
            Rejection::MalformedInput(_) => "malformed_input",
            Rejection::SessionUnavailable => "session_unavailable",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, NavGuardError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum NavGuardError {
    #[error(transparent)]
    Rejected(#[from] Rejection),
    #[error("transport: {0}")]
    Transport(String),
    #[error("backend returned {status}: {body}")]
    Backend { status: u16, body: String },
    #[error("config: {0}")]
    Config(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("internal: {0}")]
    Internal(String),
}

impl NavGuardError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            NavGuardError::Config(_) => ClientCode::BadRequest,
            NavGuardError::Rejected(r) => r.client_code(),
            NavGuardError::Transport(_) | NavGuardError::Backend { .. } => ClientCode::BackendFailed,
            NavGuardError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            NavGuardError::Internal(_) => ClientCode::Internal,
        }
    }
}
