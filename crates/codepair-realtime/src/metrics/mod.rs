//! Relay metrics.

pub mod connections;
pub mod hubs;
pub mod messages;

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Relay-wide counters, shared by the registry, every hub and every pump.
#[derive(Debug)]
pub struct RelayMetrics {
    /// Connections ever registered
    pub connections_total: AtomicU64,
    /// Connections currently registered
    pub connections_active: AtomicU64,
    /// Text frames read from clients
    pub messages_received: AtomicU64,
    /// Text frames written to clients
    pub messages_delivered: AtomicU64,
    /// Members dropped because their outbound queue was full
    pub overflow_disconnects: AtomicU64,
    /// Hubs created by the registry
    pub hubs_created: AtomicU64,
    /// Hubs removed after staying empty
    pub hubs_evicted: AtomicU64,
    /// Hub event loops that started running
    pub hub_loops_started: AtomicU64,
}

impl RelayMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self {
            connections_total: AtomicU64::new(0),
            connections_active: AtomicU64::new(0),
            messages_received: AtomicU64::new(0),
            messages_delivered: AtomicU64::new(0),
            overflow_disconnects: AtomicU64::new(0),
            hubs_created: AtomicU64::new(0),
            hubs_evicted: AtomicU64::new(0),
            hub_loops_started: AtomicU64::new(0),
        }
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            connections_total: self.connections_total.load(Ordering::Relaxed),
            connections_active: self.connections_active.load(Ordering::Relaxed),
            messages_received: self.messages_received.load(Ordering::Relaxed),
            messages_delivered: self.messages_delivered.load(Ordering::Relaxed),
            overflow_disconnects: self.overflow_disconnects.load(Ordering::Relaxed),
            hubs_created: self.hubs_created.load(Ordering::Relaxed),
            hubs_evicted: self.hubs_evicted.load(Ordering::Relaxed),
            hub_loops_started: self.hub_loops_started.load(Ordering::Relaxed),
        }
    }
}

impl Default for RelayMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable metrics snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Connections ever registered
    pub connections_total: u64,
    /// Connections currently registered
    pub connections_active: u64,
    /// Text frames read from clients
    pub messages_received: u64,
    /// Text frames written to clients
    pub messages_delivered: u64,
    /// Members dropped because their outbound queue was full
    pub overflow_disconnects: u64,
    /// Hubs created by the registry
    pub hubs_created: u64,
    /// Hubs removed after staying empty
    pub hubs_evicted: u64,
    /// Hub event loops that started running
    pub hub_loops_started: u64,
}
