//! WebSocket upgrade handler: `GET /ws/{session_id}`.

use axum::extract::ws::{Message, Utf8Bytes, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::Response;
use bytes::Bytes;
use futures::future;
use futures::{SinkExt, StreamExt};
use tracing::{debug, info};

use codepair_core::error::AppError;
use codepair_core::types::SessionId;
use codepair_realtime::Frame;

use crate::state::AppState;

/// GET /ws/{session_id}: join a session over WebSocket.
///
/// The session id is validated before the upgrade, so a malformed join
/// never reaches the relay.
pub async fn ws_upgrade(
    State(state): State<AppState>,
    Path(raw_session_id): Path<String>,
    ws: WebSocketUpgrade,
) -> Result<Response, AppError> {
    let session_id = SessionId::parse(&raw_session_id, state.config.realtime.max_session_id_length)?;
    let max_message_size = state.config.realtime.max_message_size_bytes;

    Ok(ws
        .max_message_size(max_message_size)
        .on_upgrade(move |socket| handle_ws_connection(state, session_id, socket)))
}

/// GET /ws and /ws/: a join without a session id.
pub async fn ws_missing_session() -> AppError {
    AppError::validation("Session ID required")
}

/// Bridges an upgraded socket to the relay until either side closes.
async fn handle_ws_connection(state: AppState, session_id: SessionId, socket: WebSocket) {
    let (ws_tx, ws_rx) = socket.split();

    let reader = ws_rx.filter_map(|msg| future::ready(frame_from_message(msg)));
    let writer = ws_tx.with(|frame: Frame| future::ready(Ok::<_, axum::Error>(message_from_frame(frame))));

    info!(session_id = %session_id, "WebSocket connection established");

    match state
        .realtime
        .serve_connection(session_id.clone(), reader, writer)
        .await
    {
        Ok(conn) => info!(
            session_id = %session_id,
            conn_id = %conn.id,
            "WebSocket connection closed"
        ),
        Err(e) => debug!(session_id = %session_id, error = %e, "WebSocket join refused"),
    }
}

/// Binary frames are relayed as text when they hold UTF-8 and dropped otherwise.
fn frame_from_message(msg: Result<Message, axum::Error>) -> Option<Result<Frame, axum::Error>> {
    match msg {
        Ok(Message::Text(text)) => Some(Ok(Frame::text(text.as_str()))),
        Ok(Message::Binary(data)) => match std::str::from_utf8(&data) {
            Ok(text) => Some(Ok(Frame::text(text))),
            Err(_) => {
                debug!(len = data.len(), "Dropping non-UTF-8 binary frame");
                None
            }
        },
        Ok(Message::Ping(_)) => Some(Ok(Frame::Ping)),
        Ok(Message::Pong(_)) => Some(Ok(Frame::Pong)),
        Ok(Message::Close(_)) => Some(Ok(Frame::Close)),
        Err(e) => Some(Err(e)),
    }
}

fn message_from_frame(frame: Frame) -> Message {
    match frame {
        Frame::Text(payload) => Message::Text(Utf8Bytes::from(payload.to_string())),
        Frame::Ping => Message::Ping(Bytes::new()),
        Frame::Pong => Message::Pong(Bytes::new()),
        Frame::Close => Message::Close(None),
    }
}
