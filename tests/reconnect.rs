//! Reconnect behaviour driven by the health check, on paused time.

use std::time::Duration;

use muxframe::{
    client::{ClientError, ConnectionState},
    request::Request,
    response::Response,
};
use muxframe_testing::{TestResult, connect, reply};
use rstest::rstest;
use tokio::sync::mpsc;

#[tokio::test(start_paused = true)]
async fn request_ids_are_never_reused_across_reconnects() -> TestResult {
    let mut conn = connect(|builder| builder).await?;
    let mut ids = Vec::new();

    for _ in 0..3 {
        conn.client.send(Request::get("/v1/rooms"))?;
        ids.push(conn.next_request().await?.id);
        conn.peer.close();
        conn.accept_reconnect().await?;
    }
    conn.client.send(Request::get("/v1/rooms"))?;
    ids.push(conn.next_request().await?.id);

    assert_eq!(ids, ["0", "1", "2", "3"]);
    assert_eq!(conn.dialer.dial_count(), 4);
    conn.client.close().await;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn requests_while_disconnected_fail_and_consume_ids() -> TestResult {
    let mut conn = connect(|builder| builder.health_check_interval(Duration::from_secs(1))).await?;
    let mut state = conn.client.state_changes();
    conn.dialer.set_refusing(true);
    conn.peer.close();
    state
        .wait_for(|current| *current == ConnectionState::Disconnected)
        .await?;

    let response = conn.client.call(Request::get("/v1/rooms")).await?;
    assert!(response.is_connection_lost());
    assert_eq!(response.id().as_str(), "0");

    conn.dialer.set_refusing(false);
    conn.accept_reconnect().await?;
    let call = tokio::spawn({
        let client = conn.client.clone();
        async move { client.call(Request::get("/v1/rooms")).await }
    });
    let request = conn.next_request().await?;
    assert_eq!(request.id, "1");
    assert!(conn.peer.send(reply(&request.id, 200, "[]")));
    assert!(call.await??.is_success());
    conn.client.close().await;
    Ok(())
}

#[rstest]
#[case(Duration::from_secs(1))]
#[case(Duration::from_secs(5))]
#[tokio::test(start_paused = true)]
async fn redial_waits_for_the_health_check(#[case] interval: Duration) -> TestResult {
    let mut conn = connect(|builder| builder.health_check_interval(interval)).await?;
    let closed_at = tokio::time::Instant::now();

    conn.peer.close();
    conn.accept_reconnect().await?;

    assert!(closed_at.elapsed() >= interval);
    assert!(closed_at.elapsed() < interval * 2);
    conn.client.close().await;
    Ok(())
}

#[tokio::test]
async fn close_hook_runs_after_subscription_loss() -> TestResult {
    let (closed_tx, mut closed) = mpsc::unbounded_channel();
    let mut conn = connect(move |builder| {
        builder.on_close(move || {
            let closed_tx = closed_tx.clone();
            async move {
                let _ = closed_tx.send(());
            }
        })
    })
    .await?;

    let (events_tx, mut events) = mpsc::unbounded_channel::<Response>();
    conn.client.send_with(
        Request::get("/v1/subscribe/{name}/{room}")
            .path_param("name", "alice")
            .path_param("room", "general")
            .subscribe(),
        move |response| {
            let _ = events_tx.send(response);
        },
    )?;
    conn.next_request().await?;
    conn.peer.close();

    let lost = events.recv().await.ok_or("missing connection loss")?;
    assert!(lost.is_connection_lost());
    closed.recv().await.ok_or("close hook did not run")?;

    conn.client.close().await;
    assert!(matches!(
        conn.client.send(Request::get("/v1/rooms")),
        Err(ClientError::Shutdown)
    ));
    Ok(())
}
