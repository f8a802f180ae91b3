//! Session relay configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Session relay (WebSocket) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Capacity of each connection's outbound queue. A broadcast that finds
    /// the queue full disconnects that connection.
    #[serde(default = "default_outbound_queue")]
    pub outbound_queue_size: usize,
    /// Capacity of each hub's register/unregister/broadcast queues.
    #[serde(default = "default_hub_queue")]
    pub hub_queue_size: usize,
    /// Largest accepted inbound frame in bytes.
    #[serde(default = "default_max_message_size")]
    pub max_message_size_bytes: usize,
    /// Interval between keepalive pings written by the outbound pump.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_seconds: u64,
    /// A connection that delivers no frame (pongs included) for this long is
    /// closed. `0` disables the deadline.
    #[serde(default = "default_read_idle_timeout")]
    pub read_idle_timeout_seconds: u64,
    /// Upper bound on a single transport write.
    #[serde(default = "default_write_timeout")]
    pub write_timeout_seconds: u64,
    /// How long an empty session survives before its hub is evicted. `0` keeps
    /// hubs for the lifetime of the process.
    #[serde(default = "default_idle_session_timeout")]
    pub idle_session_timeout_seconds: u64,
    /// Longest session id accepted on the join path.
    #[serde(default = "default_max_session_id_length")]
    pub max_session_id_length: usize,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            outbound_queue_size: default_outbound_queue(),
            hub_queue_size: default_hub_queue(),
            max_message_size_bytes: default_max_message_size(),
            ping_interval_seconds: default_ping_interval(),
            read_idle_timeout_seconds: default_read_idle_timeout(),
            write_timeout_seconds: default_write_timeout(),
            idle_session_timeout_seconds: default_idle_session_timeout(),
            max_session_id_length: default_max_session_id_length(),
        }
    }
}

impl RealtimeConfig {
    /// Keepalive ping period, never shorter than one second.
    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_seconds.max(1))
    }

    /// Read deadline per inbound frame, `None` when disabled.
    pub fn read_idle_timeout(&self) -> Option<Duration> {
        match self.read_idle_timeout_seconds {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Deadline per outbound write, never shorter than one second.
    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_seconds.max(1))
    }

    /// Eviction grace period for empty sessions, `None` when eviction is disabled.
    pub fn idle_session_timeout(&self) -> Option<Duration> {
        match self.idle_session_timeout_seconds {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

fn default_outbound_queue() -> usize {
    256
}

fn default_hub_queue() -> usize {
    1024
}

fn default_max_message_size() -> usize {
    64 * 1024
}

fn default_ping_interval() -> u64 {
    54
}

fn default_read_idle_timeout() -> u64 {
    60
}

fn default_write_timeout() -> u64 {
    10
}

fn default_idle_session_timeout() -> u64 {
    300
}

fn default_max_session_id_length() -> usize {
    128
}
