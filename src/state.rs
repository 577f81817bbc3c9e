//! Shared application state for request handlers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::AppConfig;
use crate::runtime::{RuntimeStats, SystemRuntimeStats};

/// Shared application state, cloneable across handlers via Arc-wrapped fields.
///
/// Everything here is fixed at startup. Handlers only read it, so no locking
/// is involved.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub stats: Arc<dyn RuntimeStats>,
    started: Instant,
}

impl AppState {
    /// Creates state backed by live runtime statistics, starting the uptime clock now.
    pub fn new(config: AppConfig) -> Self {
        Self::with_stats(config, Arc::new(SystemRuntimeStats))
    }

    /// Creates state with a custom statistics provider.
    pub fn with_stats(config: AppConfig, stats: Arc<dyn RuntimeStats>) -> Self {
        Self {
            config: Arc::new(config),
            stats,
            started: Instant::now(),
        }
    }

    /// Measure uptime from `started` instead of from construction, e.g. from
    /// the first instant of `main`.
    pub fn with_start_time(mut self, started: Instant) -> Self {
        self.started = started;
        self
    }

    /// Time elapsed since the start time.
    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InMemoryEnv;

    #[test]
    fn test_uptime_is_monotonic() {
        let state = AppState::new(AppConfig::from_env(&InMemoryEnv::new()));
        let first = state.uptime();
        std::thread::sleep(Duration::from_millis(20));
        let second = state.uptime();
        assert!(second >= first + Duration::from_millis(20));
    }

    #[test]
    fn test_clones_share_start_time() {
        let state = AppState::new(AppConfig::from_env(&InMemoryEnv::new()));
        let clone = state.clone();
        std::thread::sleep(Duration::from_millis(5));
        let (a, b) = (state.uptime(), clone.uptime());
        let diff = if a > b { a - b } else { b - a };
        assert!(diff < Duration::from_millis(5));
        assert!(Arc::ptr_eq(&state.config, &clone.config));
    }

    #[test]
    fn test_uptime_counts_from_given_start() {
        let launched = Instant::now()
            .checked_sub(Duration::from_secs(3))
            .expect("clock too close to boot");
        let state =
            AppState::new(AppConfig::from_env(&InMemoryEnv::new())).with_start_time(launched);
        assert!(state.uptime() >= Duration::from_secs(3));
    }
}
