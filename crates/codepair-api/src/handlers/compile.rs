//! `POST /compile`: hand submitted code to the execution collaborator.

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use codepair_core::error::AppError;
use codepair_runner::{ExecutionError, ExecutionRequest};

use crate::state::AppState;

const DIAGNOSTICS_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// POST /compile
///
/// Success returns the artifact with its content type. Compiler diagnostics
/// come back as plain text with `400`; every other failure is an [`AppError`].
pub async fn compile(State(state): State<AppState>, body: Bytes) -> Result<Response, AppError> {
    let request: ExecutionRequest = serde_json::from_slice(&body)
        .map_err(|e| AppError::validation(format!("Invalid request body: {e}")))?;

    match state.executor.execute(request).await {
        Ok(output) => Ok((
            StatusCode::OK,
            [(header::CONTENT_TYPE, output.content_type)],
            output.payload,
        )
            .into_response()),
        Err(ExecutionError::CompileError { diagnostics }) => Ok((
            StatusCode::BAD_REQUEST,
            [(header::CONTENT_TYPE, DIAGNOSTICS_CONTENT_TYPE)],
            diagnostics,
        )
            .into_response()),
        Err(e) => Err(e.into()),
    }
}
