//! HTTP endpoints.
//!
//! - `/healthz`          : liveness
//! - `/metrics`          : Prometheus text format
//! - `/v1/status`        : policy + session snapshot (JSON)
//! - `/v1/tools`         : tool catalog (JSON)
//! - `/v1/tools/:name`   : run one tool, JSON args in, text response out

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use navguard_core::error::ClientCode;

use crate::app_state::AppState;
use crate::dispatch::{tool_catalog, ToolResponse};

pub async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let extra = state.metrics_extra();
    let body = state.metrics().render(&extra);

    (
        StatusCode::OK,
        [(axum::http::header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response()
}

pub async fn status(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.dispatcher().guard().status_snapshot())
}

pub async fn tools() -> impl IntoResponse {
    Json(tool_catalog())
}

/// Body is optional; an empty body means "no arguments".
pub async fn call_tool(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Json<ToolResponse> {
    let args = if body.is_empty() {
        Value::Null
    } else {
        match serde_json::from_slice::<Value>(&body) {
            Ok(v) => v,
            Err(e) => {
                return Json(ToolResponse::error(
                    ClientCode::BadRequest,
                    format!("Malformed input: invalid JSON body: {e}"),
                ))
            }
        }
    };

    Json(state.dispatcher().handle_tool(&name, args).await)
}
