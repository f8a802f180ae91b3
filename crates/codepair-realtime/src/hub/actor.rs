//! The hub event loop.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use codepair_core::config::RealtimeConfig;
use codepair_core::types::{ConnectionId, SessionId};

use crate::connection::frame::Payload;
use crate::connection::handle::{ConnectionHandle, ConnectionState};
use crate::error::RelayError;
use crate::metrics::{RelayMetrics, connections, hubs};
use crate::registry::HubMap;

use super::{HubHandle, Registration};

/// Sizing and eviction knobs for one hub.
#[derive(Debug, Clone)]
pub(crate) struct HubSettings {
    pub(crate) outbound_queue_size: usize,
    pub(crate) command_queue_size: usize,
    pub(crate) idle_timeout: Option<Duration>,
}

impl From<&RealtimeConfig> for HubSettings {
    fn from(config: &RealtimeConfig) -> Self {
        Self {
            outbound_queue_size: config.outbound_queue_size.max(1),
            command_queue_size: config.hub_queue_size.max(1),
            idle_timeout: config.idle_session_timeout(),
        }
    }
}

#[derive(Debug)]
struct Member {
    connection: Arc<ConnectionHandle>,
    outbound: mpsc::Sender<Payload>,
}

/// Why a member left the set.
#[derive(Debug, Clone, Copy)]
enum Departure {
    Unregistered,
    Overflow,
    QueueClosed,
}

/// State owned by a hub's loop. Nothing else can reach `members`.
pub(crate) struct Hub {
    session_id: SessionId,
    instance: Uuid,
    members: HashMap<ConnectionId, Member>,
    member_count: Arc<AtomicUsize>,
    register_rx: mpsc::Receiver<Registration>,
    unregister_rx: mpsc::Receiver<ConnectionId>,
    broadcast_rx: mpsc::Receiver<Payload>,
    settings: HubSettings,
    hubs: HubMap,
    metrics: Arc<RelayMetrics>,
    shutdown: CancellationToken,
}

impl Hub {
    /// Build a hub, start its loop on the runtime, and return a handle to it.
    pub(crate) fn spawn(
        session_id: SessionId,
        settings: HubSettings,
        hubs: HubMap,
        metrics: Arc<RelayMetrics>,
        shutdown: CancellationToken,
    ) -> HubHandle {
        let (register_tx, register_rx) = mpsc::channel(settings.command_queue_size);
        let (unregister_tx, unregister_rx) = mpsc::channel(settings.command_queue_size);
        let (broadcast_tx, broadcast_rx) = mpsc::channel(settings.command_queue_size);
        let instance = Uuid::new_v4();
        let member_count = Arc::new(AtomicUsize::new(0));

        let handle = HubHandle {
            session_id: session_id.clone(),
            instance,
            register_tx,
            unregister_tx,
            broadcast_tx,
            member_count: member_count.clone(),
        };

        let hub = Hub {
            session_id,
            instance,
            members: HashMap::new(),
            member_count,
            register_rx,
            unregister_rx,
            broadcast_rx,
            settings,
            hubs,
            metrics,
            shutdown,
        };
        tokio::spawn(hub.run());

        handle
    }

    async fn run(mut self) {
        hubs::record_loop_started(&self.metrics);
        info!(session_id = %self.session_id, "Hub started");

        let mut idle_deadline = self.idle_deadline();

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => {
                    self.release_all();
                    break;
                }
                Some(registration) = self.register_rx.recv() => {
                    if self.register(registration) {
                        idle_deadline = None;
                    } else if self.members.is_empty() && idle_deadline.is_none() {
                        idle_deadline = self.idle_deadline();
                    }
                }
                Some(conn_id) = self.unregister_rx.recv() => {
                    self.remove(conn_id, Departure::Unregistered);
                    if self.members.is_empty() && idle_deadline.is_none() {
                        idle_deadline = self.idle_deadline();
                    }
                }
                Some(payload) = self.broadcast_rx.recv() => {
                    self.broadcast(payload);
                    if self.members.is_empty() && idle_deadline.is_none() {
                        idle_deadline = self.idle_deadline();
                    }
                }
                _ = sleep_until(idle_deadline) => {
                    if self.try_evict().await {
                        break;
                    }
                    // A queued registration kept the hub alive; re-arm in
                    // case it never lands.
                    idle_deadline = if self.members.is_empty() {
                        self.idle_deadline()
                    } else {
                        None
                    };
                }
            }
        }

        info!(session_id = %self.session_id, "Hub stopped");
    }

    fn idle_deadline(&self) -> Option<Instant> {
        self.settings.idle_timeout.map(|timeout| Instant::now() + timeout)
    }

    /// Returns whether the connection became a member.
    fn register(&mut self, registration: Registration) -> bool {
        let Registration { connection, ack } = registration;
        let (outbound, queue) = mpsc::channel(self.settings.outbound_queue_size);

        if ack.send(Ok(queue)).is_err() {
            debug!(
                session_id = %self.session_id,
                conn_id = %connection.id,
                "Registrant went away before acknowledgement"
            );
            return false;
        }

        connection.advance(ConnectionState::Registered);
        connections::record_connect(&self.metrics);
        self.members.insert(
            connection.id,
            Member {
                connection: connection.clone(),
                outbound,
            },
        );
        self.sync_member_count();

        info!(
            session_id = %self.session_id,
            conn_id = %connection.id,
            members = self.members.len(),
            "Connection registered"
        );
        true
    }

    fn remove(&mut self, conn_id: ConnectionId, departure: Departure) {
        let Some(member) = self.members.remove(&conn_id) else {
            return;
        };
        self.sync_member_count();
        connections::record_disconnect(&self.metrics);

        match departure {
            Departure::Overflow => {
                connections::record_overflow(&self.metrics);
                member.connection.close();
                warn!(
                    session_id = %self.session_id,
                    conn_id = %conn_id,
                    capacity = self.settings.outbound_queue_size,
                    "Outbound queue full, disconnecting slow member"
                );
            }
            Departure::QueueClosed => {
                member.connection.close();
                debug!(
                    session_id = %self.session_id,
                    conn_id = %conn_id,
                    "Outbound pump already gone, dropping member"
                );
            }
            Departure::Unregistered => {
                info!(
                    session_id = %self.session_id,
                    conn_id = %conn_id,
                    members = self.members.len(),
                    "Connection unregistered"
                );
            }
        }
        // Dropping `member.outbound` here releases the queue; the outbound
        // pump sees the end of its queue and closes the transport.
    }

    fn broadcast(&mut self, payload: Payload) {
        let mut departures = Vec::new();

        for (conn_id, member) in &self.members {
            match member.outbound.try_send(payload.clone()) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => departures.push((*conn_id, Departure::Overflow)),
                Err(TrySendError::Closed(_)) => {
                    departures.push((*conn_id, Departure::QueueClosed))
                }
            }
        }

        for (conn_id, departure) in departures {
            self.remove(conn_id, departure);
        }
    }

    /// Remove this hub from the registry if it is still empty.
    ///
    /// Holding the registry write lock while checking guarantees no lookup
    /// can hand this hub out after it is gone. Registrations that were
    /// already queued are refused so their callers retry on a fresh hub.
    async fn try_evict(&mut self) -> bool {
        if !self.members.is_empty() {
            return false;
        }

        let mut hubs = self.hubs.write().await;
        if !self.register_rx.is_empty() {
            return false;
        }
        if hubs
            .get(&self.session_id)
            .is_some_and(|current| current.instance == self.instance)
        {
            hubs.remove(&self.session_id);
        }
        self.register_rx.close();
        drop(hubs);

        while let Ok(Registration { ack, .. }) = self.register_rx.try_recv() {
            let _ = ack.send(Err(RelayError::HubClosed(self.session_id.to_string())));
        }

        hubs::record_evicted(&self.metrics);
        info!(session_id = %self.session_id, "Idle hub evicted");
        true
    }

    fn release_all(&mut self) {
        let released: Vec<Member> = self.members.drain().map(|(_, member)| member).collect();
        self.sync_member_count();
        for member in released {
            member.connection.close();
            connections::record_disconnect(&self.metrics);
        }
    }

    fn sync_member_count(&self) {
        self.member_count.store(self.members.len(), Ordering::SeqCst);
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
