//! Integration tests for the plain HTTP surface.

use http::StatusCode;
use serde_json::Value;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_create_redirects_to_eight_hex_session() {
    let app = TestApp::spawn().await;

    let response = app.request("GET", "/create", None).await;

    assert_eq!(response.status, StatusCode::FOUND);
    let location = response.headers["location"].to_str().expect("location");
    let id = location.strip_prefix("/interview/").expect("interview path");
    assert_eq!(id.len(), 8);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
}

#[tokio::test]
async fn test_create_issues_distinct_ids() {
    let app = TestApp::spawn().await;

    let first = app.request("GET", "/create", None).await;
    let second = app.request("GET", "/create", None).await;

    assert_ne!(first.headers["location"], second.headers["location"]);
}

#[tokio::test]
async fn test_editor_page_is_served() {
    let app = TestApp::spawn().await;

    for path in ["/", "/interview/abcd1234"] {
        let response = app.request("GET", path, None).await;
        assert_eq!(response.status, StatusCode::OK, "{path}");
        assert!(response.body.contains("<title>CodePair</title>"), "{path}");
    }
}

#[tokio::test]
async fn test_join_without_session_id_is_rejected() {
    let app = TestApp::spawn().await;

    for path in ["/ws", "/ws/"] {
        let response = app.request("GET", path, None).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{path}");
    }
}

#[tokio::test]
async fn test_compile_requires_post() {
    let app = TestApp::spawn().await;

    let response = app.request("GET", "/compile", None).await;

    assert_eq!(response.status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_compile_rejects_invalid_json() {
    let app = TestApp::spawn().await;

    let response = app.request("POST", "/compile", Some("not json")).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_compile_rejects_unknown_language() {
    let app = TestApp::spawn().await;

    let response = app
        .request(
            "POST",
            "/compile",
            Some(r#"{"code":"print(1)","language":"python"}"#),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&response.body).expect("json error body");
    assert_eq!(body["error"], "VALIDATION");
}

#[tokio::test]
#[ignore = "requires node on PATH"]
async fn test_compile_runs_javascript() {
    let app = TestApp::spawn().await;

    let response = app
        .request(
            "POST",
            "/compile",
            Some(r#"{"code":"console.log('hi')","language":"javascript"}"#),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "hi\n");
}

#[tokio::test]
async fn test_health_reports_live_sessions() {
    let app = TestApp::spawn().await;
    let _client = app.connect("health-check").await;
    app.wait_for_members("health-check", 1).await;

    let response = app.request("GET", "/api/health/detailed", None).await;

    assert_eq!(response.status, StatusCode::OK);
    let body: Value = serde_json::from_str(&response.body).expect("json");
    assert_eq!(body["data"]["sessions"], 1);
    assert_eq!(body["data"]["connections"], 1);
    assert_eq!(body["data"]["relay"]["connections_total"], 1);
}
