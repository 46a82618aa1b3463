//! Unit tests for client tracing spans and per-operation timing.
//!
//! Tests use `#[traced_test]` from `tracing-test` combined with `rstest` and
//! `tokio::test`. The actor runs inside the test's span, so its events are
//! captured. Span names appear in event lines as context prefixes, so tests
//! enable timing to produce an event within each span.

use rstest::rstest;
use tracing::Level;
use tracing_test::traced_test;

use super::helpers::{Harness, open_client, reply};
use crate::{client::TracingConfig, request::Request};

fn find_line(lines: &[&str], needles: &[&str]) -> Result<(), String> {
    lines
        .iter()
        .find(|line| needles.iter().all(|needle| line.contains(needle)))
        .map(|_| ())
        .ok_or_else(|| format!("no line with {needles:?} in:\n{}", lines.join("\n")))
}

#[rstest]
#[traced_test]
#[tokio::test]
async fn open_emits_span_with_url_and_timing() {
    let harness = open_client(|builder| {
        builder.tracing_config(TracingConfig::default().with_open_timing(true))
    })
    .await;
    harness.client.close().await;

    logs_assert(|lines: &[&str]| {
        find_line(lines, &["client.open", "memory://chat", "operation.timing"])
    });
}

#[rstest]
#[traced_test]
#[tokio::test]
async fn send_emits_span_with_request_id_and_frame_bytes() {
    let Harness {
        client, mut peer, ..
    } = open_client(|builder| {
        builder.tracing_config(TracingConfig::default().with_send_timing(true))
    })
    .await;

    client.send(Request::get("/v1/rooms")).expect("send");
    peer.recv().await.expect("request frame");
    client.close().await;

    logs_assert(|lines: &[&str]| {
        find_line(lines, &["client.send", "request.id", "frame.bytes=44", "elapsed_us"])
    });
}

#[rstest]
#[traced_test]
#[tokio::test]
async fn receive_span_records_outcome() {
    let Harness {
        client, mut peer, ..
    } = open_client(|builder| builder).await;

    assert!(peer.send(r#"{"heartbeat":true}"#));
    let call = tokio::spawn({
        let client = client.clone();
        async move { client.call(Request::get("/v1/rooms")).await }
    });
    peer.recv().await.expect("request frame");
    assert!(peer.send(reply("0", 200, "[]")));
    call.await.expect("join call").expect("call");
    client.close().await;

    logs_assert(|lines: &[&str]| find_line(lines, &["client.receive", "outcome=", "heartbeat"]));
}

#[rstest]
#[traced_test]
#[tokio::test]
async fn close_emits_span_with_timing() {
    let harness = open_client(|builder| {
        builder.tracing_config(TracingConfig::default().with_close_timing(true))
    })
    .await;
    harness.client.close().await;

    logs_assert(|lines: &[&str]| find_line(lines, &["client.close", "elapsed_us"]));
}

#[rstest]
#[traced_test]
#[tokio::test]
async fn timing_is_off_by_default() {
    let Harness {
        client, mut peer, ..
    } = open_client(|builder| builder).await;
    client.send(Request::get("/v1/rooms")).expect("send");
    peer.recv().await.expect("request frame");
    client.close().await;

    assert!(!logs_contain("elapsed_us"));
}

#[rstest]
#[traced_test]
#[tokio::test]
async fn all_timing_with_custom_level() {
    let harness = open_client(|builder| {
        builder.tracing_config(
            TracingConfig::default()
                .with_all_levels(Level::TRACE)
                .with_all_timing(true),
        )
    })
    .await;
    harness.client.close().await;

    logs_assert(|lines: &[&str]| find_line(lines, &["client.open", "elapsed_us"]));
    logs_assert(|lines: &[&str]| find_line(lines, &["client.close", "elapsed_us"]));
}
