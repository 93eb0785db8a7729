//! HTTP server startup logic.

use std::net::{SocketAddr, TcpListener};
use std::time::Duration;

use axum::Router;
use axum_server::Handle;

use crate::config::AppConfig;
use crate::state::Readiness;

use super::shutdown;

/// Server startup error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Invalid listen address {0}")]
    Address(String),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Server(String),
}

/// Start the HTTP server from configuration.
///
/// Binds the configured address, installs the signal handler, and serves
/// until shutdown. This function blocks until the server stops; a bind
/// failure returns before any route is served.
pub async fn start_server(
    app: Router,
    config: &AppConfig,
    readiness: Readiness,
) -> Result<(), ServerError> {
    let addr: SocketAddr = format!("{}:{}", config.http.host, config.http.port)
        .parse()
        .map_err(|e| {
            ServerError::Address(format!(
                "{}:{} ({})",
                config.http.host, config.http.port, e
            ))
        })?;

    let listener = bind(addr)?;

    let handle = Handle::new();
    shutdown::setup_shutdown_handler(
        handle.clone(),
        readiness.clone(),
        Duration::from_secs(config.http.shutdown_grace_seconds),
    );

    tracing::info!(%addr, "Starting HTTP server");
    serve(app, listener, handle, readiness).await
}

/// Bind the listen socket. Fails fast when the port is taken.
pub fn bind(addr: SocketAddr) -> Result<TcpListener, ServerError> {
    let listener = TcpListener::bind(addr).map_err(|source| ServerError::Bind { addr, source })?;
    listener
        .set_nonblocking(true)
        .map_err(|source| ServerError::Bind { addr, source })?;
    Ok(listener)
}

/// Serve the router on an already-bound listener until the handle stops it.
///
/// Readiness flips to ready as serving begins and back to not-ready once the
/// server returns, so health probes track the actual serving window.
pub async fn serve(
    app: Router,
    listener: TcpListener,
    handle: Handle,
    readiness: Readiness,
) -> Result<(), ServerError> {
    readiness.mark_ready();
    let result = axum_server::from_tcp(listener)
        .handle(handle)
        .serve(app.into_make_service())
        .await
        .map_err(|e| ServerError::Server(e.to_string()));
    readiness.mark_not_ready();
    result
}
