//! Lifecycle hook and state tests for the muxframe client.

use std::sync::atomic::Ordering;

use rstest::rstest;
use tokio::sync::mpsc;

use super::helpers::{
    URL,
    counting_hook,
    error_channel,
    open_client,
    reply,
    wait_for_state,
};
use crate::{
    client::{Client, ClientError, ConnectionState},
    request::Request,
    response::Response,
    transport::{TransportError, memory_transport},
};

#[tokio::test]
async fn open_hook_runs_once_per_connection() {
    let (opened, increment) = counting_hook();
    let harness = open_client(|builder| builder.on_open(increment)).await;

    assert_eq!(opened.load(Ordering::SeqCst), 1, "open hook should run once");
    assert_eq!(harness.client.state(), ConnectionState::Open);
    harness.client.close().await;
}

#[tokio::test]
async fn dial_uses_tracking_url() {
    let harness = open_client(|builder| builder).await;
    assert_eq!(harness.peer.url(), "memory://chat?x-tracking-id=test-client");
    assert_eq!(harness.client.tracking_id(), "test-client");
    harness.client.close().await;
}

#[tokio::test]
async fn explicit_close_runs_close_hook_and_stops_client() {
    let (closed, increment) = counting_hook();
    let harness = open_client(|builder| builder.on_close(increment)).await;

    harness.client.close().await;

    assert_eq!(closed.load(Ordering::SeqCst), 1, "close hook should run once");
    assert_eq!(harness.client.state(), ConnectionState::Disconnected);
    assert!(matches!(
        harness.client.send(Request::get("/v1/rooms")),
        Err(ClientError::Shutdown)
    ));
}

#[tokio::test]
async fn closing_twice_is_harmless() {
    let (closed, increment) = counting_hook();
    let harness = open_client(|builder| builder.on_close(increment)).await;

    harness.client.close().await;
    harness.client.close().await;

    assert_eq!(closed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn close_ends_the_peer_side() {
    let mut harness = open_client(|builder| builder).await;
    harness.client.close().await;
    assert!(harness.peer.recv().await.is_none());
}

#[tokio::test]
async fn peer_close_fails_outstanding_requests_before_close_hook() {
    let (order_tx, mut order) = mpsc::unbounded_channel();
    let hook_tx = order_tx.clone();
    let mut harness = open_client(move |builder| {
        builder.on_close(move || {
            let hook_tx = hook_tx.clone();
            async move {
                let _ = hook_tx.send("closed".to_owned());
            }
        })
    })
    .await;

    harness
        .client
        .send_with(Request::get("/v1/rooms"), move |response: Response| {
            let _ = order_tx.send(format!("{:?}", response.code()));
        })
        .expect("send");
    harness.peer.recv().await.expect("request frame");
    harness.peer.close();

    assert_eq!(order.recv().await.as_deref(), Some("Some(503)"));
    assert_eq!(order.recv().await.as_deref(), Some("closed"));
    wait_for_state(&harness.client, ConnectionState::Disconnected).await;
}

#[tokio::test]
async fn close_hook_skipped_when_never_open() {
    let (dialer, _server) = memory_transport();
    dialer.set_refusing(true);
    let (closed, increment) = counting_hook();
    let (mut errors, on_error) = error_channel();
    let client = Client::builder(URL)
        .on_close(increment)
        .on_error(on_error)
        .open(dialer);

    let message = errors.recv().await.expect("dial failure reported");
    assert!(message.contains("refused"), "unexpected error: {message}");
    client.close().await;

    assert_eq!(closed.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn transport_errors_reach_error_hook_without_closing() {
    let (mut errors, on_error) = error_channel();
    let harness = open_client(|builder| builder.on_error(on_error)).await;

    assert!(harness
        .peer
        .send_error(TransportError::InvalidFrame("binary garbage".to_owned())));

    let message = errors.recv().await.expect("error reported");
    assert!(message.contains("binary garbage"), "unexpected error: {message}");
    assert_eq!(harness.client.state(), ConnectionState::Open);

    let call = tokio::spawn({
        let client = harness.client.clone();
        async move { client.call(Request::get("/v1/rooms")).await }
    });
    let mut peer = harness.peer;
    peer.recv().await.expect("request frame");
    assert!(peer.send(reply("0", 200, "[]")));
    let response = call.await.expect("join call").expect("call");
    assert_eq!(response.code(), Some(200));
}

#[rstest]
#[case(ConnectionState::Disconnected, "disconnected")]
#[case(ConnectionState::Connecting, "connecting")]
#[case(ConnectionState::Open, "open")]
fn states_display_lowercase(#[case] state: ConnectionState, #[case] expected: &str) {
    assert_eq!(state.to_string(), expected);
}

#[tokio::test]
async fn dropping_every_handle_stops_the_actor() {
    let mut harness = open_client(|builder| builder).await;
    let mut state = harness.client.state_changes();
    drop(harness.client);

    assert!(harness.peer.recv().await.is_none());
    state
        .wait_for(|current| *current == ConnectionState::Disconnected)
        .await
        .expect("disconnected before stopping");
}
