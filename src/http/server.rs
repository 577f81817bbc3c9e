//! HTTP server startup logic.

use std::future::Future;
use std::io;
use std::net::{Ipv4Addr, SocketAddr};

use axum::Router;
use tokio::net::TcpListener;

use crate::config::AppConfig;
use crate::error::ServerError;

use super::shutdown;

/// Start the HTTP server based on configuration.
///
/// This function blocks until the server shuts down.
pub async fn start_server(app: Router, config: &AppConfig) -> Result<(), ServerError> {
    let addr = config.bind_addr()?;
    let listener = bind(addr).await?;
    serve(listener, app, shutdown::shutdown_signal()).await
}

/// Bind a TCP listener on `addr`.
///
/// If `addr` is the IPv6 wildcard and the host has no usable IPv6 stack, the
/// IPv4 wildcard on the same port is tried instead. A port that is taken or
/// forbidden is reported as-is.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener, ServerError> {
    match TcpListener::bind(addr).await {
        Ok(listener) => Ok(listener),
        Err(source) if is_ipv6_wildcard(&addr) && ipv6_unavailable(&source) => {
            let fallback = SocketAddr::from((Ipv4Addr::UNSPECIFIED, addr.port()));
            tracing::warn!(error = %source, %fallback, "IPv6 unavailable, listening on IPv4 only");
            TcpListener::bind(fallback)
                .await
                .map_err(|source| ServerError::Bind {
                    addr: fallback,
                    source,
                })
        }
        Err(source) => Err(ServerError::Bind { addr, source }),
    }
}

fn is_ipv6_wildcard(addr: &SocketAddr) -> bool {
    addr.is_ipv6() && addr.ip().is_unspecified()
}

fn ipv6_unavailable(err: &io::Error) -> bool {
    !matches!(
        err.kind(),
        io::ErrorKind::AddrInUse | io::ErrorKind::PermissionDenied
    )
}

/// Serve `app` on `listener` until `signal` resolves, then let in-flight
/// requests finish.
pub async fn serve<F>(listener: TcpListener, app: Router, signal: F) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    match listener.local_addr() {
        Ok(addr) => tracing::info!(%addr, "Starting HTTP server"),
        Err(e) => tracing::warn!(error = %e, "Starting HTTP server on unknown address"),
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(signal)
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv6Addr, SocketAddr};

    use tokio::net::TcpStream;

    use super::*;
    use crate::config::{InMemoryEnv, ENV_PORT};

    #[tokio::test]
    async fn test_bind_port_in_use() {
        let first = bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0))).await.unwrap();
        let taken = first.local_addr().unwrap();

        let err = bind(taken).await.unwrap_err();
        match err {
            ServerError::Bind { addr, .. } => assert_eq!(addr, taken),
            other => panic!("expected Bind error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_start_server_invalid_port() {
        let env = InMemoryEnv::new();
        env.set(ENV_PORT, "not-a-port");
        let config = AppConfig::from_env(&env);

        let err = start_server(Router::new(), &config).await.unwrap_err();
        assert!(matches!(err, ServerError::InvalidPort { .. }));
    }

    #[tokio::test]
    async fn test_serve_returns_after_signal() {
        let listener = bind(SocketAddr::from((Ipv4Addr::LOCALHOST, 0))).await.unwrap();
        let result = serve(listener, Router::new(), async {}).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_default_bind_accepts_ipv4_and_ipv6() {
        let env = InMemoryEnv::new();
        env.set(ENV_PORT, "0");
        let addr = AppConfig::from_env(&env).bind_addr().unwrap();
        let listener = bind(addr).await.unwrap();
        let local = listener.local_addr().unwrap();

        let accept = tokio::spawn(async move {
            loop {
                if listener.accept().await.is_err() {
                    break;
                }
            }
        });

        let v4 = SocketAddr::from((Ipv4Addr::LOCALHOST, local.port()));
        assert!(TcpStream::connect(v4).await.is_ok(), "IPv4 connect to {} failed", v4);

        // Only meaningful when the host has an IPv6 stack
        if local.is_ipv6() {
            let v6 = SocketAddr::from((Ipv6Addr::LOCALHOST, local.port()));
            assert!(TcpStream::connect(v6).await.is_ok(), "IPv6 connect to {} failed", v6);
        }

        accept.abort();
    }

    #[test]
    fn test_ipv6_fallback_only_for_missing_stack() {
        let wildcard = SocketAddr::from((Ipv6Addr::UNSPECIFIED, 8080));
        assert!(is_ipv6_wildcard(&wildcard));
        assert!(!is_ipv6_wildcard(&SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080))));
        assert!(!is_ipv6_wildcard(&SocketAddr::from((Ipv6Addr::LOCALHOST, 8080))));

        assert!(ipv6_unavailable(&io::Error::from(io::ErrorKind::AddrNotAvailable)));
        assert!(!ipv6_unavailable(&io::Error::from(io::ErrorKind::AddrInUse)));
        assert!(!ipv6_unavailable(&io::Error::from(io::ErrorKind::PermissionDenied)));
    }
}
