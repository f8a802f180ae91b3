//! The inbound and outbound pumps of a connection.
//!
//! Both pumps are generic over the transport: the inbound side reads any
//! `Stream` of [`Frame`]s, the outbound side writes any `Sink` of them. Only
//! the outbound pump ever writes to the transport.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::time::error::Elapsed;
use tokio::time::{Instant, MissedTickBehavior, timeout};
use tracing::{debug, warn};

use codepair_core::config::RealtimeConfig;

use crate::hub::HubHandle;
use crate::metrics::{RelayMetrics, messages};

use super::frame::{Frame, Payload};
use super::handle::ConnectionHandle;

/// Timing knobs for the pumps.
#[derive(Debug, Clone)]
pub struct PumpConfig {
    /// Interval between keepalive pings.
    pub ping_interval: Duration,
    /// Close the connection if nothing is read for this long; `None` never times out.
    pub read_idle_timeout: Option<Duration>,
    /// Upper bound on a single write.
    pub write_timeout: Duration,
}

impl From<&RealtimeConfig> for PumpConfig {
    fn from(config: &RealtimeConfig) -> Self {
        Self {
            ping_interval: config.ping_interval(),
            read_idle_timeout: config.read_idle_timeout(),
            write_timeout: config.write_timeout(),
        }
    }
}

/// Read frames until the transport ends, forwarding text to the hub.
pub async fn run_inbound<R, E>(
    connection: Arc<ConnectionHandle>,
    hub: HubHandle,
    mut reader: R,
    config: PumpConfig,
    metrics: Arc<RelayMetrics>,
) where
    R: Stream<Item = Result<Frame, E>> + Unpin,
    E: Display,
{
    loop {
        let next = tokio::select! {
            _ = connection.closed() => {
                debug!(conn_id = %connection.id, "Inbound pump stopped by close");
                break;
            }
            next = read_frame(&mut reader, config.read_idle_timeout) => next,
        };

        match next {
            Ok(Some(Ok(Frame::Text(payload)))) => {
                messages::record_received(&metrics);
                if let Err(e) = hub.broadcast(payload).await {
                    warn!(conn_id = %connection.id, error = %e, "Broadcast rejected");
                    break;
                }
            }
            Ok(Some(Ok(Frame::Close))) | Ok(None) => {
                debug!(conn_id = %connection.id, "Peer closed connection");
                break;
            }
            Ok(Some(Ok(Frame::Ping | Frame::Pong))) => {}
            Ok(Some(Err(e))) => {
                warn!(conn_id = %connection.id, error = %e, "Transport read failed");
                break;
            }
            Err(_) => {
                warn!(
                    conn_id = %connection.id,
                    idle = ?config.read_idle_timeout,
                    "Connection idle, closing"
                );
                break;
            }
        }
    }

    if connection.close() {
        hub.unregister(connection.id).await;
    }
}

async fn read_frame<R>(
    reader: &mut R,
    idle_timeout: Option<Duration>,
) -> Result<Option<R::Item>, Elapsed>
where
    R: Stream + Unpin,
{
    match idle_timeout {
        Some(idle_timeout) => timeout(idle_timeout, reader.next()).await,
        None => Ok(reader.next().await),
    }
}

/// Drain the connection's outbound queue onto the transport.
///
/// Ends when the hub releases the queue, the connection closes, or a write
/// fails; in the first two cases a close frame is written before returning.
pub async fn run_outbound<W>(
    connection: Arc<ConnectionHandle>,
    hub: HubHandle,
    mut queue: mpsc::Receiver<Payload>,
    mut writer: W,
    config: PumpConfig,
    metrics: Arc<RelayMetrics>,
) where
    W: Sink<Frame> + Unpin,
    W::Error: Display,
{
    let mut ping = tokio::time::interval_at(
        Instant::now() + config.ping_interval,
        config.ping_interval,
    );
    ping.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let frame = tokio::select! {
            biased;

            _ = connection.closed() => break,
            payload = queue.recv() => match payload {
                Some(payload) => Frame::Text(payload),
                None => {
                    debug!(conn_id = %connection.id, "Outbound queue released by hub");
                    break;
                }
            },
            _ = ping.tick() => Frame::Ping,
        };

        let is_text = matches!(frame, Frame::Text(_));
        match timeout(config.write_timeout, writer.send(frame)).await {
            Ok(Ok(())) => {
                if is_text {
                    messages::record_delivered(&metrics);
                }
            }
            Ok(Err(e)) => {
                warn!(conn_id = %connection.id, error = %e, "Transport write failed");
                connection.mark_dead();
                break;
            }
            Err(_) => {
                warn!(
                    conn_id = %connection.id,
                    timeout_secs = config.write_timeout.as_secs(),
                    "Transport write timed out"
                );
                connection.mark_dead();
                break;
            }
        }
    }

    if connection.is_alive() {
        let _ = timeout(config.write_timeout, writer.send(Frame::Close)).await;
    }
    let _ = timeout(config.write_timeout, writer.close()).await;

    if connection.close() {
        hub.unregister(connection.id).await;
    }
}
