use std::io;
use std::net::SocketAddr;
use std::num::ParseIntError;

/// Server startup error. Every variant is fatal.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid port {port:?}: {source}")]
    InvalidPort {
        port: String,
        #[source]
        source: ParseIntError,
    },

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] io::Error),
}
