//! Shared test helpers for integration tests.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use futures::{SinkExt, StreamExt};
use http::{Request, StatusCode};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tower::ServiceExt;

use codepair_api::{AppState, build_app};
use codepair_core::config::AppConfig;
use codepair_core::types::SessionId;

/// Upper bound for anything a test waits on.
pub const TIMEOUT: Duration = Duration::from_secs(5);

/// A WebSocket client connection.
pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A running server plus the state it serves.
pub struct TestApp {
    /// Address the server listens on
    pub addr: SocketAddr,
    /// State shared with the running server
    pub state: AppState,
    shutdown: Option<oneshot::Sender<()>>,
    server: Option<JoinHandle<()>>,
}

/// Response of a one-shot HTTP request.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: http::HeaderMap,
    pub body: String,
}

impl TestApp {
    /// Start a server with the default configuration.
    pub async fn spawn() -> Self {
        Self::spawn_with(AppConfig::default()).await
    }

    /// Start a server with `config`.
    pub async fn spawn_with(config: AppConfig) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("local addr");
        let state = AppState::new(config);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let server_state = state.clone();
        let server = tokio::spawn(async move {
            codepair_api::serve(listener, server_state, async {
                let _ = shutdown_rx.await;
            })
            .await
            .expect("server failed");
        });

        Self {
            addr,
            state,
            shutdown: Some(shutdown_tx),
            server: Some(server),
        }
    }

    /// Router over the same state, for requests that need no socket.
    pub fn router(&self) -> Router {
        build_app(self.state.clone())
    }

    /// Send a one-shot HTTP request through the router.
    pub async fn request(&self, method: &str, path: &str, body: Option<&str>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if body.is_some() {
            builder = builder.header("content-type", "application/json");
        }
        let request = builder
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .expect("Failed to build request");

        let response = self.router().oneshot(request).await.expect("request failed");
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");

        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    /// Open a WebSocket to `/ws/{session}`.
    pub async fn connect(&self, session: &str) -> WsClient {
        let url = format!("ws://{}/ws/{}", self.addr, session);
        let (ws, _) = tokio::time::timeout(TIMEOUT, connect_async(url))
            .await
            .expect("connect timed out")
            .expect("WebSocket handshake failed");
        ws
    }

    /// Wait until the hub of `session` reports `expected` members.
    pub async fn wait_for_members(&self, session: &str, expected: usize) {
        let id = SessionId::from(session);
        let registry = self.state.realtime.registry.clone();
        tokio::time::timeout(TIMEOUT, async {
            while registry.member_count(&id).await.unwrap_or(0) != expected {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("session {session} never reached {expected} members"));
    }

    /// Stop the server and wait for it to exit.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(server) = self.server.take() {
            tokio::time::timeout(TIMEOUT, server)
                .await
                .expect("server did not stop")
                .expect("server task panicked");
        }
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Send a text frame.
pub async fn send_text(ws: &mut WsClient, text: &str) {
    ws.send(Message::text(text.to_owned())).await.expect("send failed");
}

/// Next text frame, skipping control frames.
pub async fn recv_text(ws: &mut WsClient) -> String {
    tokio::time::timeout(TIMEOUT, async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => return text.as_str().to_owned(),
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                other => panic!("expected text frame, got {other:?}"),
            }
        }
    })
    .await
    .expect("timed out waiting for text frame")
}

/// Assert nothing but control frames arrive within `window`.
pub async fn assert_silent(ws: &mut WsClient, window: Duration) {
    let waited = tokio::time::timeout(window, async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Ping(_) | Message::Pong(_))) => continue,
                other => return other,
            }
        }
    })
    .await;
    if let Ok(frame) = waited {
        panic!("expected silence, got {frame:?}");
    }
}
