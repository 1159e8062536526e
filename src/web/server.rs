// src/web/server.rs
//! HTTP server bring-up

use super::api::{create_router, AppState};
use crate::{
    error::{NavError, Result},
    nav::NavStore,
};
use std::future::Future;
use tokio::net::TcpListener;

/// Serve the dashboard and `/data` until `shutdown` resolves
pub async fn start_web_server(
    store: NavStore,
    addr: &str,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let app = create_router(AppState { store });

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| NavError::Connection(format!("Failed to bind {}: {}", addr, e)))?;
    tracing::info!("Web server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| NavError::Server(e.to_string()))
}
