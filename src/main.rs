//! bench-api entry point.
//!
//! Initializes tracing, reads configuration from the environment, builds the
//! router and serves it until SIGTERM/SIGINT. Any startup failure is logged and
//! the process exits non-zero.

use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use bench_api::config::{LoggingConfig, SystemEnv};
use bench_api::logging::{init_tracing, resolve_filter};
use bench_api::runtime::{RuntimeStats, SystemRuntimeStats};
use bench_api::{create_router, http, AppConfig, AppState};

/// Informational HTTP workload for cluster orchestration benchmarks.
///
/// Configured through PORT, APP_VERSION and ENVIRONMENT.
#[derive(Parser, Debug)]
#[command(name = "bench-api", version, about)]
struct Args {
    /// Log level filter (e.g., "bench_api=debug,tower_http=info")
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let started = Instant::now();
    let args = Args::parse();

    // Tracing first, so warnings raised while reading the rest are kept
    let logging = LoggingConfig::from_env(&SystemEnv);
    init_tracing(
        &resolve_filter(args.log_level.as_deref(), &logging),
        logging.format,
    );

    let config = AppConfig::from_env(&SystemEnv);

    let stats = SystemRuntimeStats;
    tracing::info!(port = %config.port, "Server starting");
    tracing::info!(
        environment = %config.environment,
        version = %config.version,
        "Loaded configuration"
    );
    tracing::info!(
        architecture = stats.architecture(),
        cpus = stats.num_cpu(),
        "Runtime detected"
    );

    let state = AppState::new(config.clone()).with_start_time(started);
    let app = create_router(state);

    match http::start_server(app, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}
