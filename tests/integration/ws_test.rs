//! Integration tests for session joins and message relay over WebSocket.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message;

use codepair_core::config::AppConfig;

use crate::helpers::{TIMEOUT, TestApp, assert_silent, recv_text, send_text};

#[tokio::test]
async fn test_sender_receives_own_message() {
    let app = TestApp::spawn().await;
    let mut client = app.connect("test-session").await;
    app.wait_for_members("test-session", 1).await;

    send_text(&mut client, "hello world").await;

    assert_eq!(recv_text(&mut client).await, "hello world");
}

#[tokio::test]
async fn test_code_update_reaches_other_participant() {
    let app = TestApp::spawn().await;
    let mut client1 = app.connect("pair-session").await;
    let mut client2 = app.connect("pair-session").await;
    app.wait_for_members("pair-session", 2).await;

    let update = json!({"type": "code_update", "content": "console.log(1)"});
    send_text(&mut client1, &update.to_string()).await;

    let received: Value = serde_json::from_str(&recv_text(&mut client2).await).expect("json");
    assert_eq!(received["content"], "console.log(1)");

    // The sender gets the same payload back, byte for byte.
    assert_eq!(recv_text(&mut client1).await, update.to_string());
}

#[tokio::test]
async fn test_survivor_keeps_relaying_after_abrupt_disconnect() {
    let app = TestApp::spawn().await;
    let client1 = app.connect("abrupt").await;
    let mut client2 = app.connect("abrupt").await;
    app.wait_for_members("abrupt", 2).await;

    // Drop without a close handshake.
    drop(client1);
    app.wait_for_members("abrupt", 1).await;

    send_text(&mut client2, "still here").await;
    assert_eq!(recv_text(&mut client2).await, "still here");
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let app = TestApp::spawn().await;
    let mut alpha = app.connect("alpha").await;
    let mut beta = app.connect("beta").await;
    app.wait_for_members("alpha", 1).await;
    app.wait_for_members("beta", 1).await;

    send_text(&mut alpha, "for alpha only").await;

    assert_eq!(recv_text(&mut alpha).await, "for alpha only");
    assert_silent(&mut beta, Duration::from_millis(200)).await;
}

#[tokio::test]
async fn test_messages_arrive_in_the_same_order_for_everyone() {
    let app = TestApp::spawn().await;
    let mut writer = app.connect("ordered").await;
    let mut reader = app.connect("ordered").await;
    app.wait_for_members("ordered", 2).await;

    for i in 0..20 {
        send_text(&mut writer, &format!("edit-{i}")).await;
    }

    for i in 0..20 {
        let expected = format!("edit-{i}");
        assert_eq!(recv_text(&mut writer).await, expected);
        assert_eq!(recv_text(&mut reader).await, expected);
    }
}

#[tokio::test]
async fn test_clean_close_unregisters_member() {
    let app = TestApp::spawn().await;
    let mut client = app.connect("leaving").await;
    app.wait_for_members("leaving", 1).await;

    client.send(Message::Close(None)).await.expect("close");
    app.wait_for_members("leaving", 0).await;

    let snapshot = app.state.realtime.metrics_snapshot();
    assert_eq!(snapshot.connections_total, 1);
    assert_eq!(snapshot.connections_active, 0);
}

#[tokio::test]
async fn test_shutdown_closes_open_sockets() {
    let mut config = AppConfig::default();
    config.server.shutdown_grace_seconds = 1;
    let app = TestApp::spawn_with(config).await;
    let mut client = app.connect("closing").await;
    app.wait_for_members("closing", 1).await;

    app.shutdown().await;

    let closed = tokio::time::timeout(TIMEOUT, async {
        loop {
            match client.next().await {
                Some(Ok(Message::Close(_))) | None | Some(Err(_)) => return,
                Some(Ok(_)) => continue,
            }
        }
    })
    .await;
    assert!(closed.is_ok(), "socket stayed open after shutdown");
}
