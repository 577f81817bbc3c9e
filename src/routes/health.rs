//! Liveness and readiness endpoints for container orchestration.
//!
//! `/health` answers as long as the process can serve HTTP and reports how
//! long it has been up. `/ready` reports readiness unconditionally: the service
//! has no dependencies, so once it is listening it can take traffic.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::runtime::format_uptime;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime: String,
}

#[derive(Debug, Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
}

/// Liveness check. Never consults anything outside the process.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        uptime: format_uptime(state.uptime()),
    })
}

/// Readiness check.
///
/// No readiness condition is evaluated; this always answers 200 "ready".
pub async fn ready() -> (StatusCode, Json<ReadyResponse>) {
    (StatusCode::OK, Json(ReadyResponse { status: "ready" }))
}
