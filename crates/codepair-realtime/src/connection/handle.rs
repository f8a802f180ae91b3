//! Per-connection state shared by the two pumps and the owning hub.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::{CancellationToken, WaitForCancellationFuture};

use codepair_core::types::{ConnectionId, SessionId};

/// Lifecycle of a connection. States only ever move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ConnectionState {
    /// Transport upgraded, register not yet acknowledged.
    Connecting = 0,
    /// The hub has added the connection to its membership.
    Registered = 1,
    /// Both pumps are running; traffic flows in both directions.
    Active = 2,
    /// A pump failed, the peer closed, or the hub dropped the member.
    Unregistering = 3,
    /// Both pumps have exited.
    Closed = 4,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Connecting,
            1 => Self::Registered,
            2 => Self::Active,
            3 => Self::Unregistering,
            _ => Self::Closed,
        }
    }
}

/// A handle to a single relay connection.
///
/// The handle never owns the outbound queue: the sending half lives in the
/// hub's membership set, so removing the member is what releases the queue.
#[derive(Debug)]
pub struct ConnectionHandle {
    /// Unique connection ID
    pub id: ConnectionId,
    /// Session this connection belongs to
    pub session_id: SessionId,
    /// When the connection was established
    pub connected_at: DateTime<Utc>,
    state: AtomicU8,
    /// Cleared when a write to the transport fails
    alive: AtomicBool,
    closing: AtomicBool,
    shutdown: CancellationToken,
}

impl ConnectionHandle {
    /// Create a handle in the `Connecting` state.
    pub fn new(session_id: SessionId) -> Self {
        Self {
            id: ConnectionId::new(),
            session_id,
            connected_at: Utc::now(),
            state: AtomicU8::new(ConnectionState::Connecting as u8),
            alive: AtomicBool::new(true),
            closing: AtomicBool::new(false),
            shutdown: CancellationToken::new(),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Move to `next` unless the connection is already at or past it.
    ///
    /// Returns `true` when the state changed.
    pub fn advance(&self, next: ConnectionState) -> bool {
        let previous = self.state.fetch_max(next as u8, Ordering::SeqCst);
        previous < next as u8
    }

    /// Whether the transport is still writable.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    /// Mark the transport as unusable for writes.
    pub fn mark_dead(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    /// Begin tearing the connection down and stop both pumps.
    ///
    /// Returns `true` for the first caller only; that caller is responsible
    /// for telling the hub (unless it is the hub itself).
    pub fn close(&self) -> bool {
        let first = !self.closing.swap(true, Ordering::SeqCst);
        self.advance(ConnectionState::Unregistering);
        self.shutdown.cancel();
        first
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closing(&self) -> bool {
        self.closing.load(Ordering::SeqCst)
    }

    /// Resolves once the connection starts closing.
    pub fn closed(&self) -> WaitForCancellationFuture<'_> {
        self.shutdown.cancelled()
    }

    /// Get a snapshot of connection info
    pub fn info(&self) -> ConnectionInfo {
        ConnectionInfo {
            id: self.id,
            session_id: self.session_id.clone(),
            connected_at: self.connected_at,
            state: self.state(),
            alive: self.is_alive(),
        }
    }
}

/// Snapshot of connection info (serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionInfo {
    /// Connection ID
    pub id: ConnectionId,
    /// Session ID
    pub session_id: SessionId,
    /// Connected at
    pub connected_at: DateTime<Utc>,
    /// Lifecycle state
    pub state: ConnectionState,
    /// Is alive
    pub alive: bool,
}
