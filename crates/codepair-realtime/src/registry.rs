//! Session registry: maps session ids to their hubs.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use codepair_core::config::RealtimeConfig;
use codepair_core::types::SessionId;

use crate::connection::frame::Payload;
use crate::connection::handle::ConnectionHandle;
use crate::error::RelayError;
use crate::hub::{Hub, HubHandle, HubSettings};
use crate::metrics::{RelayMetrics, hubs};

/// Shared id → hub map. Hubs hold a clone so they can remove themselves on eviction.
pub(crate) type HubMap = Arc<RwLock<HashMap<SessionId, HubHandle>>>;

/// How many times `join` retries after racing an eviction.
const JOIN_ATTEMPTS: usize = 3;

/// Registry of all live sessions.
///
/// Constructed once at startup and shared through the application state.
/// Lookups take the read lock; a miss re-checks under the write lock before
/// creating, so concurrent first joins of one id produce a single hub.
#[derive(Debug)]
pub struct SessionRegistry {
    hubs: HubMap,
    settings: HubSettings,
    metrics: Arc<RelayMetrics>,
    shutdown: CancellationToken,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new(config: &RealtimeConfig, metrics: Arc<RelayMetrics>) -> Self {
        Self {
            hubs: Arc::new(RwLock::new(HashMap::new())),
            settings: HubSettings::from(config),
            metrics,
            shutdown: CancellationToken::new(),
        }
    }

    /// Returns the hub for `session_id`, creating and starting it on first use.
    pub async fn get_or_create_hub(&self, session_id: &SessionId) -> HubHandle {
        if let Some(hub) = self.hubs.read().await.get(session_id) {
            return hub.clone();
        }

        let mut hubs = self.hubs.write().await;
        if let Some(hub) = hubs.get(session_id) {
            return hub.clone();
        }

        let hub = Hub::spawn(
            session_id.clone(),
            self.settings.clone(),
            self.hubs.clone(),
            self.metrics.clone(),
            self.shutdown.child_token(),
        );
        hubs.insert(session_id.clone(), hub.clone());
        hubs::record_created(&self.metrics);

        info!(session_id = %session_id, sessions = hubs.len(), "Session created");
        hub
    }

    /// Registers `connection` with the hub of its session.
    ///
    /// If the hub is evicted between lookup and registration, the lookup is
    /// repeated so the connection lands on a fresh hub.
    pub async fn join(
        &self,
        connection: Arc<ConnectionHandle>,
    ) -> Result<(HubHandle, mpsc::Receiver<Payload>), RelayError> {
        let session_id = connection.session_id.clone();
        let mut last_error = RelayError::HubClosed(session_id.to_string());

        for attempt in 1..=JOIN_ATTEMPTS {
            if self.shutdown.is_cancelled() {
                return Err(RelayError::RegistryClosed);
            }

            let hub = self.get_or_create_hub(&session_id).await;
            match hub.register(connection.clone()).await {
                Ok(queue) => return Ok((hub, queue)),
                Err(err) => {
                    debug!(
                        session_id = %session_id,
                        conn_id = %connection.id,
                        attempt,
                        error = %err,
                        "Hub closed during join, retrying"
                    );
                    last_error = err;
                }
            }
        }

        warn!(session_id = %session_id, conn_id = %connection.id, "Join failed");
        Err(last_error)
    }

    /// Number of live sessions.
    pub async fn session_count(&self) -> usize {
        self.hubs.read().await.len()
    }

    /// Whether a hub currently exists for `session_id`.
    pub async fn contains(&self, session_id: &SessionId) -> bool {
        self.hubs.read().await.contains_key(session_id)
    }

    /// Current member count of a session, `None` if it has no hub.
    pub async fn member_count(&self, session_id: &SessionId) -> Option<usize> {
        self.hubs
            .read()
            .await
            .get(session_id)
            .map(HubHandle::member_count)
    }

    /// Total members across all sessions.
    pub async fn total_members(&self) -> usize {
        self.hubs
            .read()
            .await
            .values()
            .map(HubHandle::member_count)
            .sum()
    }

    /// Stops every hub and refuses further joins.
    pub async fn shutdown(&self) {
        self.shutdown.cancel();
        let drained = {
            let mut hubs = self.hubs.write().await;
            let count = hubs.len();
            hubs.clear();
            count
        };
        info!(sessions = drained, "Session registry shut down");
    }
}

impl Drop for SessionRegistry {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
