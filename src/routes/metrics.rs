//! Lightweight runtime metrics snapshot.
//!
//! Values are read live from the `RuntimeStats` provider on every request;
//! nothing is cached between calls.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

/// Body of `GET /metrics`.
#[derive(Debug, Serialize)]
pub struct MetricsResponse {
    pub uptime_seconds: u64,
    /// Live tasks in the async runtime. Named for compatibility with existing dashboards.
    pub goroutines: usize,
    pub memory_mb: u64,
    pub architecture: String,
    pub num_cpu: usize,
}

pub async fn metrics(State(state): State<AppState>) -> Json<MetricsResponse> {
    let stats = &state.stats;
    Json(MetricsResponse {
        uptime_seconds: state.uptime().as_secs(),
        goroutines: stats.task_count(),
        memory_mb: stats.memory_mb(),
        architecture: stats.architecture().to_string(),
        num_cpu: stats.num_cpu(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;

    use crate::config::{AppConfig, InMemoryEnv};
    use crate::routes::create_router;
    use crate::routes::test_support::{get_json, test_app};
    use crate::state::AppState;

    #[tokio::test]
    async fn test_metrics_from_fixed_stats() {
        let (status, headers, body) = get_json(test_app(), "/metrics").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["content-type"], "application/json");

        assert_eq!(body["uptime_seconds"], 0);
        assert_eq!(body["goroutines"], 4);
        assert_eq!(body["memory_mb"], 12);
        assert_eq!(body["architecture"], "arm64");
        assert_eq!(body["num_cpu"], 2);
    }

    #[tokio::test]
    async fn test_metrics_from_live_stats() {
        let state = AppState::new(AppConfig::from_env(&InMemoryEnv::new()));
        let (status, _, body) = get_json(create_router(state), "/metrics").await;
        assert_eq!(status, StatusCode::OK);

        let expected_cpus = std::thread::available_parallelism().unwrap().get();
        assert_eq!(body["num_cpu"].as_u64(), Some(expected_cpus as u64));
        assert!(body["goroutines"].as_u64().unwrap() >= 1);
        assert_eq!(body["architecture"], std::env::consts::ARCH);
        assert!(body["memory_mb"].is_u64());
        assert!(body["uptime_seconds"].is_u64());
    }

    #[tokio::test]
    async fn test_metrics_shape_is_stable() {
        let state = AppState::new(AppConfig::from_env(&InMemoryEnv::new()));
        let app = create_router(state);
        let (_, _, first) = get_json(app.clone(), "/metrics").await;
        let (_, _, second) = get_json(app, "/metrics").await;

        let keys = |v: &serde_json::Value| {
            let mut keys: Vec<String> = v.as_object().unwrap().keys().cloned().collect();
            keys.sort();
            keys
        };
        assert_eq!(keys(&first), keys(&second));
        assert_eq!(
            keys(&first),
            ["architecture", "goroutines", "memory_mb", "num_cpu", "uptime_seconds"]
        );
        assert_eq!(first["architecture"], second["architecture"]);
        assert_eq!(first["num_cpu"], second["num_cpu"]);
    }

    #[tokio::test]
    async fn test_metrics_uptime_seconds_advances() {
        let state = AppState::with_stats(
            AppConfig::from_env(&InMemoryEnv::new()),
            Arc::new(crate::runtime::FixedRuntimeStats::default()),
        );
        let app = create_router(state);
        tokio::time::sleep(std::time::Duration::from_millis(1050)).await;
        let (_, _, body) = get_json(app, "/metrics").await;
        assert!(body["uptime_seconds"].as_u64().unwrap() >= 1);
    }
}
