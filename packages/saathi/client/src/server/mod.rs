//! HTTP surface of the app: currently just the health endpoint.

pub mod health;

use crate::api::ApiClient;
use crate::config::ServeConfig;
use axum::routing::get;
use axum::Router;
use health::{HealthState, ProbeError, TcpProbe};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ProbeError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn router(state: Arc<HealthState>) -> Router {
    Router::new()
        .route("/api/health", get(health::get_health))
        .with_state(state)
}

/// Serve the health endpoint until SIGINT or SIGTERM.
pub async fn serve(config: &ServeConfig, backend: ApiClient) -> Result<(), ServerError> {
    let database = TcpProbe::from_url(&config.database_url)?;
    info!(host = %database.host, port = database.port, "database probe configured");

    let state = HealthState::new(
        Arc::new(database),
        Arc::new(backend),
        config.health_timeout(),
        config.environment.clone(),
    );
    let app = router(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.bind,
            source,
        })?;
    info!(addr = %config.bind, environment = %config.environment, "health endpoint listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = until_signal("SIGINT", tokio::signal::ctrl_c());

    #[cfg(unix)]
    let terminate = until_signal("SIGTERM", async {
        use tokio::signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate())?.recv().await;
        Ok::<(), std::io::Error>(())
    });

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received");
}

/// Wait for `signal`. A handler that cannot be installed never fires.
async fn until_signal<F>(name: &str, signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        warn!(error = %e, signal = name, "failed to install signal handler");
        std::future::pending::<()>().await;
    }
}
