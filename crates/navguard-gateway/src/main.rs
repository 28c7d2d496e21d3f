//! navguard gateway
//!
//! - Config from `$NAVGUARD_CONFIG` (default `navguard.yaml`), fail-closed
//! - Policy-gated browser actions forwarded to the automation backend
//! - Ops endpoints: /healthz, /metrics, /v1/status

use std::net::SocketAddr;

use tracing_subscriber::{fmt, EnvFilter};

use navguard_core::error::{NavGuardError, Result};
use navguard_gateway::{app_state, config, router};

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::var("NAVGUARD_CONFIG").unwrap_or_else(|_| "navguard.yaml".into());
    let cfg = config::load_or_fail_closed(&path);
    let listen: SocketAddr = cfg
        .server
        .listen
        .parse()
        .map_err(|_| NavGuardError::Config("server.listen must be a valid SocketAddr".into()))?;

    let state = app_state::AppState::new(cfg)?;
    let app = router::build_router(state);

    tracing::info!(%listen, config = %path, "navguard-gateway starting");
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .map_err(|e| NavGuardError::Internal(format!("failed to bind {listen}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| NavGuardError::Internal(format!("server failed: {e}")))
}
