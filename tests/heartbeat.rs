//! Heartbeat and dispatch-miss logging, captured through the `log` bridge.

use log::Level;
use muxframe::request::Request;
use muxframe_testing::{HEARTBEAT, LoggerHandle, TestResult, connect, logger, reply};
use rstest::rstest;

async fn round_trip(conn: &mut muxframe_testing::Connected) -> TestResult {
    let call = tokio::spawn({
        let client = conn.client.clone();
        async move { client.call(Request::get("/v1/rooms")).await }
    });
    let request = conn.next_request().await?;
    assert!(conn.peer.send(reply(&request.id, 200, "[]")));
    call.await??;
    Ok(())
}

#[rstest]
#[tokio::test]
async fn heartbeats_are_never_dispatch_misses(mut logger: LoggerHandle) -> TestResult {
    let mut conn = connect(|builder| builder).await?;

    for _ in 0..3 {
        assert!(conn.peer.send(HEARTBEAT));
    }
    assert!(conn.peer.send(r#"{"heartbeat":true,"id":"0"}"#));
    round_trip(&mut conn).await?;
    conn.client.close().await;

    let warnings = logger.drain_at(Level::Warn);
    assert!(
        warnings.iter().all(|message| !message.contains("dispatch miss")),
        "unexpected dispatch miss: {warnings:?}"
    );
    Ok(())
}

#[rstest]
#[tokio::test]
async fn replies_for_unknown_ids_are_logged(mut logger: LoggerHandle) -> TestResult {
    let mut conn = connect(|builder| builder).await?;

    assert!(conn.peer.send(reply("41", 200, "late")));
    round_trip(&mut conn).await?;
    conn.client.close().await;

    let warnings = logger.drain_at(Level::Warn);
    assert!(
        warnings
            .iter()
            .any(|message| message.contains("dispatch miss") && message.contains("41")),
        "dispatch miss not logged: {warnings:?}"
    );
    Ok(())
}
