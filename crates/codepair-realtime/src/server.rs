//! Top-level relay engine that ties the registry, hubs and pumps together.

use std::fmt::Display;
use std::sync::Arc;

use futures::{Sink, SinkExt, Stream};
use tracing::{info, warn};

use codepair_core::config::RealtimeConfig;
use codepair_core::types::SessionId;

use crate::connection::frame::Frame;
use crate::connection::handle::{ConnectionHandle, ConnectionInfo, ConnectionState};
use crate::connection::pump::{PumpConfig, run_inbound, run_outbound};
use crate::error::RelayError;
use crate::metrics::{MetricsSnapshot, RelayMetrics};
use crate::registry::SessionRegistry;

/// Central relay engine shared by every transport handler.
#[derive(Clone)]
pub struct RealtimeEngine {
    /// Session registry.
    pub registry: Arc<SessionRegistry>,
    /// Metrics collector.
    pub metrics: Arc<RelayMetrics>,
    pump: PumpConfig,
}

impl std::fmt::Debug for RealtimeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeEngine").finish()
    }
}

impl RealtimeEngine {
    /// Creates the engine with an empty registry.
    pub fn new(config: &RealtimeConfig) -> Self {
        let metrics = Arc::new(RelayMetrics::new());
        let registry = Arc::new(SessionRegistry::new(config, metrics.clone()));

        info!(
            outbound_queue_size = config.outbound_queue_size,
            idle_session_timeout_secs = config.idle_session_timeout_seconds,
            "Relay engine initialized"
        );

        Self {
            registry,
            metrics,
            pump: PumpConfig::from(config),
        }
    }

    /// Point-in-time copy of the relay counters.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Runs one participant from join to teardown.
    ///
    /// Registers a new connection with the hub of `session_id`, then drives
    /// the outbound pump on its own task and the inbound pump on the calling
    /// task. Returns once both pumps have exited.
    pub async fn serve_connection<R, W, E>(
        &self,
        session_id: SessionId,
        reader: R,
        mut writer: W,
    ) -> Result<ConnectionInfo, RelayError>
    where
        R: Stream<Item = Result<Frame, E>> + Unpin,
        E: Display,
        W: Sink<Frame> + Unpin + Send + 'static,
        W::Error: Display,
    {
        let connection = Arc::new(ConnectionHandle::new(session_id));

        let (hub, queue) = match self.registry.join(connection.clone()).await {
            Ok(joined) => joined,
            Err(err) => {
                warn!(
                    session_id = %connection.session_id,
                    conn_id = %connection.id,
                    error = %err,
                    "Join refused"
                );
                let _ = writer.send(Frame::Close).await;
                return Err(err);
            }
        };

        connection.advance(ConnectionState::Active);
        info!(
            session_id = %connection.session_id,
            conn_id = %connection.id,
            members = hub.member_count(),
            "Connection joined session"
        );

        let outbound = tokio::spawn(run_outbound(
            connection.clone(),
            hub.clone(),
            queue,
            writer,
            self.pump.clone(),
            self.metrics.clone(),
        ));

        run_inbound(
            connection.clone(),
            hub,
            reader,
            self.pump.clone(),
            self.metrics.clone(),
        )
        .await;

        if let Err(e) = outbound.await {
            warn!(conn_id = %connection.id, error = %e, "Outbound pump task failed");
        }

        connection.advance(ConnectionState::Closed);

        let info = connection.info();
        info!(
            session_id = %info.session_id,
            conn_id = %info.id,
            alive = info.alive,
            "Connection left session"
        );
        Ok(info)
    }

    /// Stops every hub; live connections see their queues released and close.
    pub async fn shutdown(&self) {
        info!("Shutting down relay engine");
        self.registry.shutdown().await;
        info!("Relay engine shut down");
    }
}
