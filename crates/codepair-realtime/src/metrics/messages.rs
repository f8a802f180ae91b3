//! Message metrics helpers.

use std::sync::atomic::Ordering;

use super::RelayMetrics;

/// Record a frame read from a client
pub fn record_received(metrics: &RelayMetrics) {
    metrics.messages_received.fetch_add(1, Ordering::Relaxed);
}

/// Record a frame written to a client
pub fn record_delivered(metrics: &RelayMetrics) {
    metrics.messages_delivered.fetch_add(1, Ordering::Relaxed);
}
