//! Editor page and session creation.

use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use tracing::{error, info};

use codepair_core::error::AppError;
use codepair_core::types::SessionId;

use crate::state::AppState;

/// GET /: the editor page.
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    load_index(&state).await
}

/// GET /interview/{session_id}: the editor page for one session.
///
/// The page itself opens `/ws/{session_id}`; the id is only checked here.
pub async fn interview(
    State(state): State<AppState>,
    Path(raw_session_id): Path<String>,
) -> Result<Html<String>, AppError> {
    SessionId::parse(&raw_session_id, state.config.realtime.max_session_id_length)?;
    load_index(&state).await
}

/// GET /create: mint a session id and redirect to its page.
pub async fn create() -> Response {
    let session_id = SessionId::generate();
    info!(session_id = %session_id, "New session id issued");

    (
        StatusCode::FOUND,
        [(header::LOCATION, format!("/interview/{session_id}"))],
    )
        .into_response()
}

async fn load_index(state: &AppState) -> Result<Html<String>, AppError> {
    let path = state.config.static_files.index_path();
    tokio::fs::read_to_string(&path).await.map(Html).map_err(|e| {
        error!(path = %path.display(), error = %e, "Failed to read index page");
        AppError::not_found("Editor page not found")
    })
}
