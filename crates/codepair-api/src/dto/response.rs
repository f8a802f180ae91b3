//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use codepair_realtime::metrics::MetricsSnapshot;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Liveness response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `ok` when the process answers.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Seconds since the server started.
    pub uptime_seconds: i64,
}

/// Relay-level health.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    /// Always `ok` when the process answers.
    pub status: String,
    /// When the server started.
    pub started_at: DateTime<Utc>,
    /// Live sessions (hubs).
    pub sessions: usize,
    /// Registered connections across all sessions.
    pub connections: usize,
    /// Whether `/compile` accepts requests.
    pub execution_enabled: bool,
    /// Relay counters.
    pub relay: MetricsSnapshot,
}
