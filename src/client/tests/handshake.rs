//! Version handshake tests for the muxframe client.

use std::sync::atomic::Ordering;

use super::helpers::{counting_hook, dial_client, error_channel, reply, wait_for_state};
use crate::{client::ConnectionState, request::Request};

#[tokio::test]
async fn handshake_precedes_open() {
    let (opened, increment) = counting_hook();
    let mut harness = dial_client(|builder| builder.handshake("2.0").on_open(increment)).await;

    let frame = harness.peer.recv().await.expect("handshake frame");
    assert_eq!(frame, r#"{"version":"2.0"}"#);
    assert_eq!(harness.client.state(), ConnectionState::Connecting);
    assert_eq!(opened.load(Ordering::SeqCst), 0);

    assert!(
        harness
            .peer
            .send(r#"{"version":"2.0","trackingID":"test-client"}"#)
    );
    harness.client.opened().await.expect("opened");
    assert_eq!(opened.load(Ordering::SeqCst), 1);
    harness.client.close().await;
}

#[tokio::test]
async fn handshake_reply_is_not_dispatched() {
    let mut harness = dial_client(|builder| builder.handshake("2.0")).await;
    harness.peer.recv().await.expect("handshake frame");
    assert!(harness.peer.send(r#"{"version":"2.0"}"#));
    harness.client.opened().await.expect("opened");

    let call = tokio::spawn({
        let client = harness.client.clone();
        async move { client.call(Request::get("/v1/rooms")).await }
    });
    let frame = harness.peer.recv().await.expect("request frame");
    assert!(frame.starts_with(r#"{"id":"0""#));
    assert!(harness.peer.send(reply("0", 200, "[]")));
    let response = call.await.expect("join call").expect("call");
    assert_eq!(response.code(), Some(200));
    harness.client.close().await;
}

#[tokio::test]
async fn rejected_handshake_drops_the_link() {
    let (closed, on_close) = counting_hook();
    let (mut errors, on_error) = error_channel();
    let mut harness = dial_client(|builder| {
        builder
            .handshake("9.9")
            .on_close(on_close)
            .on_error(on_error)
    })
    .await;

    harness.peer.recv().await.expect("handshake frame");
    assert!(harness.peer.send(r#"{"error":"unsupported version"}"#));

    let message = errors.recv().await.expect("rejection reported");
    assert!(message.contains("unsupported version"), "got {message}");
    assert!(harness.peer.recv().await.is_none(), "link closed");
    wait_for_state(&harness.client, ConnectionState::Disconnected).await;
    assert_eq!(closed.load(Ordering::SeqCst), 0);
    harness.client.close().await;
    assert_eq!(closed.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn heartbeat_does_not_complete_handshake() {
    let (mut errors, on_error) = error_channel();
    let mut harness = dial_client(|builder| builder.handshake("2.0").on_error(on_error)).await;

    harness.peer.recv().await.expect("handshake frame");
    assert!(harness.peer.send(r#"{"heartbeat":true}"#));
    assert!(
        harness
            .peer
            .send(r#"{"version":"2.0","error":"version_mismatch"}"#)
    );

    let message = errors.recv().await.expect("rejection reported");
    assert!(message.contains("version_mismatch"), "got {message}");
    assert!(harness.peer.recv().await.is_none(), "link closed");
    wait_for_state(&harness.client, ConnectionState::Disconnected).await;
    harness.client.close().await;
}

#[tokio::test(start_paused = true)]
async fn rejected_handshake_is_retried_on_next_tick() {
    let mut harness = dial_client(|builder| builder.handshake("2.0")).await;
    harness.peer.recv().await.expect("handshake frame");
    assert!(harness.peer.send("garbage"));

    let mut peer = harness.server.accept().await.expect("client redials");
    assert_eq!(peer.recv().await.as_deref(), Some(r#"{"version":"2.0"}"#));
    assert!(peer.send(r#"{"version":"2.0"}"#));
    harness.client.opened().await.expect("opened");
    assert_eq!(harness.dialer.dial_count(), 2);
    harness.client.close().await;
}
