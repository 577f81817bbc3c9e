//! bench-api: an informational HTTP workload for orchestration benchmarks.
//!
//! Serves four JSON routes (`/`, `/health`, `/ready`, `/metrics`) derived from
//! process state fixed at startup and runtime statistics queried per request.

pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod middleware;
pub mod routes;
pub mod runtime;
pub mod state;

pub use config::AppConfig;
pub use error::ServerError;
pub use routes::create_router;
pub use state::AppState;
