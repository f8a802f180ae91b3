//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use codepair_core::config::AppConfig;
use codepair_realtime::RealtimeEngine;
use codepair_runner::{Executor, ProcessExecutor};

/// Shared application state, cloned into every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Session relay.
    pub realtime: Arc<RealtimeEngine>,
    /// Compile/run collaborator.
    pub executor: Arc<dyn Executor>,
    /// Process start time.
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Build state with the process-backed executor.
    pub fn new(config: AppConfig) -> Self {
        let executor = Arc::new(ProcessExecutor::new(config.execution.clone()));
        Self::with_executor(config, executor)
    }

    /// Build state around a specific executor.
    pub fn with_executor(config: AppConfig, executor: Arc<dyn Executor>) -> Self {
        let realtime = Arc::new(RealtimeEngine::new(&config.realtime));
        Self {
            config: Arc::new(config),
            realtime,
            executor,
            started_at: Utc::now(),
        }
    }
}
