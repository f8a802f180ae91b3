//! Hub lifecycle metrics helpers.

use std::sync::atomic::Ordering;

use super::RelayMetrics;

/// Record the registry inserting a new hub
pub fn record_created(metrics: &RelayMetrics) {
    metrics.hubs_created.fetch_add(1, Ordering::Relaxed);
}

/// Record a hub loop starting
pub fn record_loop_started(metrics: &RelayMetrics) {
    metrics.hub_loops_started.fetch_add(1, Ordering::Relaxed);
}

/// Record a hub removing itself after the idle timeout
pub fn record_evicted(metrics: &RelayMetrics) {
    metrics.hubs_evicted.fetch_add(1, Ordering::Relaxed);
}
