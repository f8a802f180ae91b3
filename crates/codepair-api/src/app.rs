//! Application builder: wires router, middleware and state into an Axum app.

use std::future::{Future, IntoFuture};
use std::pin::pin;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower_http::trace::TraceLayer;

use codepair_core::config::AppConfig;
use codepair_core::AppResult;
use codepair_core::error::AppError;

use crate::middleware::compression::build_compression_layer;
use crate::middleware::cors::build_cors_layer;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);
    build_router(state)
        .layer(build_compression_layer())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Serves `state` on `listener` until `shutdown` resolves, then stops the relay.
///
/// Live sessions get up to `server.shutdown_grace_seconds` to drain after the
/// relay has closed them.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> AppResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let realtime = state.realtime.clone();
    let grace = Duration::from_secs(state.config.server.shutdown_grace_seconds);
    let app = build_app(state);

    let (drain_tx, drain_rx) = oneshot::channel::<()>();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown.await;
        tracing::info!("Shutdown signal received");
        // Upgraded sockets are not tracked by axum; close them through the relay.
        realtime.shutdown().await;
        let _ = drain_tx.send(());
    });
    let mut server = pin!(server.into_future());

    tokio::select! {
        result = &mut server => {
            return result.map_err(|e| AppError::internal(format!("Server error: {e}")));
        }
        Ok(()) = drain_rx => {}
    }

    match tokio::time::timeout(grace, server).await {
        Ok(result) => result.map_err(|e| AppError::internal(format!("Server error: {e}"))),
        Err(_) => {
            tracing::warn!(
                grace_secs = grace.as_secs(),
                "Grace period elapsed with requests still in flight"
            );
            Ok(())
        }
    }
}

/// Runs the CodePair server with the given configuration.
pub async fn run_server(config: AppConfig) -> AppResult<()> {
    tracing::info!("Starting CodePair server...");

    let addr = config.server.bind_address();
    let state = AppState::new(config);

    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!(
        "CodePair server listening on {}",
        listener.local_addr().map(|a| a.to_string()).unwrap_or(addr)
    );

    serve(listener, state, shutdown_signal()).await?;

    tracing::info!("CodePair server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
