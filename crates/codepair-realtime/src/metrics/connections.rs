//! Connection metrics helpers.

use std::sync::atomic::Ordering;

use super::RelayMetrics;

/// Record a connection joining a hub
pub fn record_connect(metrics: &RelayMetrics) {
    metrics.connections_total.fetch_add(1, Ordering::Relaxed);
    metrics.connections_active.fetch_add(1, Ordering::Relaxed);
}

/// Record a connection leaving a hub
pub fn record_disconnect(metrics: &RelayMetrics) {
    metrics.connections_active.fetch_sub(1, Ordering::Relaxed);
}

/// Record a member dropped for not draining its queue
pub fn record_overflow(metrics: &RelayMetrics) {
    metrics.overflow_disconnects.fetch_add(1, Ordering::Relaxed);
}
