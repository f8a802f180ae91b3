//! Per-session hub actors.
//!
//! A hub is a task that owns one session's membership set. Everything that
//! wants to change or use the set goes through a [`HubHandle`], which only
//! enqueues commands; the hub's loop is the sole reader and writer of the set.

mod actor;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use codepair_core::types::{ConnectionId, SessionId};

use crate::connection::frame::Payload;
use crate::connection::handle::ConnectionHandle;
use crate::error::RelayError;

pub(crate) use actor::{Hub, HubSettings};

/// A register request. The hub creates the member's outbound queue and hands
/// the receiving half back through `ack`.
#[derive(Debug)]
pub(crate) struct Registration {
    pub(crate) connection: Arc<ConnectionHandle>,
    pub(crate) ack: oneshot::Sender<Result<mpsc::Receiver<Payload>, RelayError>>,
}

/// Cloneable handle to a running hub.
#[derive(Debug, Clone)]
pub struct HubHandle {
    session_id: SessionId,
    instance: Uuid,
    register_tx: mpsc::Sender<Registration>,
    unregister_tx: mpsc::Sender<ConnectionId>,
    broadcast_tx: mpsc::Sender<Payload>,
    member_count: Arc<AtomicUsize>,
}

impl HubHandle {
    /// Session this hub serves.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Whether two handles point at the same hub instance.
    pub fn same_hub(&self, other: &HubHandle) -> bool {
        self.instance == other.instance
    }

    /// Number of members as of the hub's last membership change.
    pub fn member_count(&self) -> usize {
        self.member_count.load(Ordering::SeqCst)
    }

    /// Add a connection to the hub and receive its outbound queue.
    ///
    /// Fails with [`RelayError::HubClosed`] when the hub was evicted or shut
    /// down before it processed the request.
    pub async fn register(
        &self,
        connection: Arc<ConnectionHandle>,
    ) -> Result<mpsc::Receiver<Payload>, RelayError> {
        let (ack, ack_rx) = oneshot::channel();
        self.register_tx
            .send(Registration { connection, ack })
            .await
            .map_err(|_| self.closed_error())?;
        ack_rx.await.map_err(|_| self.closed_error())?
    }

    /// Remove a connection. Unknown ids are ignored by the hub.
    pub async fn unregister(&self, id: ConnectionId) {
        // A stopped hub has no members left to remove.
        let _ = self.unregister_tx.send(id).await;
    }

    /// Queue a payload for fan-out to every member, the sender included.
    pub async fn broadcast(&self, payload: Payload) -> Result<(), RelayError> {
        self.broadcast_tx
            .send(payload)
            .await
            .map_err(|_| self.closed_error())
    }

    fn closed_error(&self) -> RelayError {
        RelayError::HubClosed(self.session_id.to_string())
    }
}
