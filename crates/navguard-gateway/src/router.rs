//! Axum router wiring.

use axum::{
    routing::{get, post},
    Router,
};

use crate::{app_state::AppState, ops};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(ops::healthz))
        .route("/metrics", get(ops::metrics))
        .route("/v1/status", get(ops::status))
        .route("/v1/tools", get(ops::tools))
        .route("/v1/tools/:name", post(ops::call_tool))
        .with_state(state)
}
