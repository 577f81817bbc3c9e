//! Configuration loading and constants.
//!
//! All settings come from environment variables read once at startup. The
//! resulting `AppConfig` is immutable and shared with handlers through
//! `AppState`. Environment access goes through the `ReadEnv` trait so lookups
//! can be exercised against an in-memory environment in tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::env;
use std::net::{Ipv6Addr, SocketAddr};

use const_format::formatcp;

use crate::error::ServerError;

// =============================================================================
// Environment Variables
// =============================================================================

/// TCP port to bind
pub const ENV_PORT: &str = "PORT";

/// Reported application version
pub const ENV_APP_VERSION: &str = "APP_VERSION";

/// Reported deployment environment
pub const ENV_ENVIRONMENT: &str = "ENVIRONMENT";

/// Log filter directives
pub const ENV_LOG_FILTER: &str = "RUST_LOG";

/// Log output format
pub const ENV_LOG_FORMAT: &str = "LOG_FORMAT";

// =============================================================================
// Defaults
// =============================================================================

pub const DEFAULT_PORT: &str = "8080";
pub const DEFAULT_VERSION: &str = "1.0.0";
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Default log filter when neither `--log-level` nor RUST_LOG is set
pub const DEFAULT_LOG_FILTER: &str = formatcp!(
    "{}=info,tower_http=info",
    env!("CARGO_CRATE_NAME")
);

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

/// Fixed descriptor returned by the root route
pub const SERVICE_MESSAGE: &str = "EKS Karpenter GitOps Bench API";

/// Cache-Control for every response. Health and metrics output must never be
/// served from an intermediate cache.
pub const CACHE_CONTROL_NO_STORE: &str = "no-store";

// =============================================================================
// Environment Access
// =============================================================================

/// Read-only view of the process environment.
pub trait ReadEnv {
    fn var(&self, key: &str) -> Result<String, env::VarError>;
}

/// Delegates to `std::env`.
pub struct SystemEnv;

impl ReadEnv for SystemEnv {
    #[inline]
    fn var(&self, key: &str) -> Result<String, env::VarError> {
        env::var(key)
    }
}

/// Environment backed by a map. Never touches the process environment.
#[derive(Default)]
pub struct InMemoryEnv {
    vars: RefCell<HashMap<String, String>>,
}

impl InMemoryEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.borrow_mut().insert(key.into(), value.into());
    }

    pub fn remove(&self, key: &str) {
        self.vars.borrow_mut().remove(key);
    }
}

impl ReadEnv for InMemoryEnv {
    fn var(&self, key: &str) -> Result<String, env::VarError> {
        self.vars
            .borrow()
            .get(key)
            .cloned()
            .ok_or(env::VarError::NotPresent)
    }
}

/// Look up `key`, falling back to `fallback` when the variable is absent.
///
/// A variable that is present but empty is returned as-is.
pub fn get_env<E: ReadEnv + ?Sized>(env: &E, key: &str, fallback: &str) -> String {
    match env.var(key) {
        Ok(value) => value,
        Err(env::VarError::NotPresent) => fallback.to_string(),
        Err(env::VarError::NotUnicode(_)) => {
            tracing::warn!(key, "Environment variable is not valid UTF-8, using default");
            fallback.to_string()
        }
    }
}

// =============================================================================
// Application Config
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Port as given in the environment; validated only when binding
    pub port: String,
    pub version: String,
    pub environment: String,
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Filter directives from RUST_LOG, if set
    pub filter: Option<String>,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    /// Parse a LOG_FORMAT value. Anything other than "json" is text.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }
}

impl LoggingConfig {
    /// Read only the logging settings, so tracing can be installed before the
    /// rest of the configuration is loaded.
    pub fn from_env<E: ReadEnv + ?Sized>(env: &E) -> Self {
        Self {
            filter: env.var(ENV_LOG_FILTER).ok(),
            format: LogFormat::parse(&get_env(env, ENV_LOG_FORMAT, DEFAULT_LOG_FORMAT)),
        }
    }
}

impl AppConfig {
    /// Build the configuration from the given environment.
    pub fn from_env<E: ReadEnv + ?Sized>(env: &E) -> Self {
        Self {
            port: get_env(env, ENV_PORT, DEFAULT_PORT),
            version: get_env(env, ENV_APP_VERSION, DEFAULT_VERSION),
            environment: get_env(env, ENV_ENVIRONMENT, DEFAULT_ENVIRONMENT),
            logging: LoggingConfig::from_env(env),
        }
    }

    /// Address to listen on: the IPv6 wildcard at the configured port.
    ///
    /// On dual-stack hosts this also accepts IPv4 connections.
    /// `http::bind` falls back to the IPv4 wildcard where IPv6 is unavailable.
    pub fn bind_addr(&self) -> Result<SocketAddr, ServerError> {
        let port: u16 = self
            .port
            .trim()
            .parse()
            .map_err(|source| ServerError::InvalidPort {
                port: self.port.clone(),
                source,
            })?;
        Ok(SocketAddr::from((Ipv6Addr::UNSPECIFIED, port)))
    }
}
