//! Root descriptor route.

use axum::{extract::State, Json};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::config::SERVICE_MESSAGE;
use crate::state::AppState;

/// Body of `GET /`.
#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub version: String,
    pub environment: String,
    /// Empty when the hostname cannot be resolved
    pub hostname: String,
    pub architecture: String,
    /// Current UTC time, RFC 3339 with second precision
    pub timestamp: String,
}

/// Describes the running instance: version, environment, host and architecture.
pub async fn index(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        message: SERVICE_MESSAGE,
        version: state.config.version.clone(),
        environment: state.config.environment.clone(),
        hostname: state.stats.hostname().unwrap_or_default(),
        architecture: state.stats.architecture().to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    })
}
