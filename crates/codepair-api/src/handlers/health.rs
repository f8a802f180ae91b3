//! Health check handlers.

use axum::Json;
use axum::extract::State;
use chrono::Utc;

use crate::dto::response::{ApiResponse, DetailedHealthResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: (Utc::now() - state.started_at).num_seconds(),
    }))
}

/// GET /api/health/detailed
pub async fn detailed_health(
    State(state): State<AppState>,
) -> Json<ApiResponse<DetailedHealthResponse>> {
    let registry = &state.realtime.registry;

    Json(ApiResponse::ok(DetailedHealthResponse {
        status: "ok".to_string(),
        started_at: state.started_at,
        sessions: registry.session_count().await,
        connections: registry.total_members().await,
        execution_enabled: state.config.execution.enabled,
        relay: state.realtime.metrics_snapshot(),
    }))
}
