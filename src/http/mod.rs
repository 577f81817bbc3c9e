//! HTTP listener lifecycle.
//!
//! Binds a plain HTTP listener on all interfaces, serves the router on it and
//! drains in-flight requests on SIGTERM/SIGINT. A bind failure is returned to
//! the caller; there is no retry and no fallback port.

mod server;
mod shutdown;

pub use server::{bind, serve, start_server};
pub use shutdown::shutdown_signal;
