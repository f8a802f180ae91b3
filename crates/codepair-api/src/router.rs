//! Route definitions for the CodePair HTTP surface.
//!
//! The router receives `AppState` and passes it to all handlers via Axum's
//! `State` extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Room for the JSON envelope around the largest accepted source.
const BODY_ENVELOPE_BYTES: usize = 16 * 1024;

/// Build the Axum router with all routes and request logging.
pub fn build_router(state: AppState) -> Router {
    let max_body = state.config.execution.max_source_bytes + BODY_ENVELOPE_BYTES;
    let static_dir = ServeDir::new(&state.config.static_files.directory);

    Router::new()
        .merge(page_routes())
        .merge(ws_routes())
        .merge(compile_routes().layer(DefaultBodyLimit::max(max_body)))
        .nest("/api", health_routes())
        .nest_service("/static", static_dir)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Editor page and session creation
fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::session::index))
        .route("/interview/{session_id}", get(handlers::session::interview))
        .route("/create", get(handlers::session::create))
}

/// Session joins
fn ws_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(handlers::ws::ws_missing_session))
        .route("/ws/", get(handlers::ws::ws_missing_session))
        .route("/ws/{session_id}", get(handlers::ws::ws_upgrade))
}

/// Execution collaborator
fn compile_routes() -> Router<AppState> {
    Router::new().route("/compile", post(handlers::compile::compile))
}

/// Liveness and relay health
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/health/detailed", get(handlers::health::detailed_health))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use bytes::Bytes;
    use tower::ServiceExt;

    use codepair_core::config::AppConfig;
    use codepair_runner::{ExecutionError, ExecutionOutput, ExecutionRequest, Executor};

    use super::*;

    /// Answers without spawning anything: `fail` in the code yields diagnostics.
    #[derive(Debug)]
    struct EchoExecutor;

    #[async_trait]
    impl Executor for EchoExecutor {
        async fn execute(
            &self,
            request: ExecutionRequest,
        ) -> Result<ExecutionOutput, ExecutionError> {
            match request.language.as_deref() {
                Some("cobol") => Err(ExecutionError::UnsupportedLanguage("cobol".into())),
                _ if request.code.contains("fail") => Err(ExecutionError::CompileError {
                    diagnostics: "main.go:1: nope".into(),
                }),
                _ => Ok(ExecutionOutput {
                    payload: Bytes::from(request.code.into_bytes()),
                    content_type: "application/wasm",
                }),
            }
        }
    }

    fn app_with_static(dir: &std::path::Path) -> Router {
        let mut config = AppConfig::default();
        config.static_files.directory = dir.to_string_lossy().into_owned();
        build_router(AppState::with_executor(config, Arc::new(EchoExecutor)))
    }

    fn app() -> Router {
        build_router(AppState::with_executor(
            AppConfig::default(),
            Arc::new(EchoExecutor),
        ))
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        String::from_utf8(bytes.to_vec()).expect("utf8 body")
    }

    fn post_compile(body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/compile")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .expect("request")
    }

    #[tokio::test]
    async fn test_create_redirects_to_fresh_session() {
        let response = app()
            .oneshot(Request::get("/create").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::FOUND);
        let location = response.headers()[header::LOCATION]
            .to_str()
            .expect("location header");
        let id = location.strip_prefix("/interview/").expect("interview path");
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_ws_without_session_id_is_bad_request() {
        for uri in ["/ws", "/ws/"] {
            let response = app()
                .oneshot(Request::get(uri).body(Body::empty()).expect("request"))
                .await
                .expect("response");
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_compile_rejects_get() {
        let response = app()
            .oneshot(Request::get("/compile").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_compile_rejects_malformed_json() {
        let response = app()
            .oneshot(post_compile("{not json"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_string(response).await.contains("VALIDATION"));
    }

    #[tokio::test]
    async fn test_compile_unsupported_language_is_bad_request() {
        let response = app()
            .oneshot(post_compile(r#"{"code":"x","language":"cobol"}"#))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_compile_success_carries_content_type() {
        let response = app()
            .oneshot(post_compile(r#"{"code":"package main"}"#))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/wasm"
        );
        assert_eq!(body_string(response).await, "package main");
    }

    #[tokio::test]
    async fn test_compile_diagnostics_are_plain_text() {
        let response = app()
            .oneshot(post_compile(r#"{"code":"fail","language":"go"}"#))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        assert_eq!(body_string(response).await, "main.go:1: nope");
    }

    #[tokio::test]
    async fn test_interview_page_is_served() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("index.html"), "<html>editor</html>").expect("write");

        let response = app_with_static(dir.path())
            .oneshot(
                Request::get("/interview/abc12345")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "<html>editor</html>");
    }

    #[tokio::test]
    async fn test_detailed_health_reports_empty_relay() {
        let response = app()
            .oneshot(
                Request::get("/api/health/detailed")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let body: serde_json::Value =
            serde_json::from_str(&body_string(response).await).expect("json");
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["sessions"], 0);
        assert_eq!(body["data"]["connections"], 0);
    }
}
