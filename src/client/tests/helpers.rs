//! Shared test helpers for client tests.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use futures::future::BoxFuture;
use tokio::sync::mpsc;

use crate::{
    client::{Client, ClientBuilder, ClientError, ConnectionState},
    transport::{MemoryDialer, MemoryPeer, MemoryServer, memory_transport},
};

pub const URL: &str = "memory://chat";
pub const TRACKING_ID: &str = "test-client";

/// A client wired to the server end of an in-memory transport.
pub struct Harness {
    pub client: Client,
    pub dialer: MemoryDialer,
    pub server: MemoryServer,
    pub peer: MemoryPeer,
}

/// Open a client configured via `configure` and accept its first link
/// without waiting for the connection to open.
pub async fn dial_client<F>(configure: F) -> Harness
where
    F: FnOnce(ClientBuilder) -> ClientBuilder,
{
    let (dialer, mut server) = memory_transport();
    let client = configure(Client::builder(URL).tracking_id(TRACKING_ID)).open(dialer.clone());
    let peer = server.accept().await.expect("client dials on open");
    Harness {
        client,
        dialer,
        server,
        peer,
    }
}

/// Open a client configured via `configure` and wait until it is open.
pub async fn open_client<F>(configure: F) -> Harness
where
    F: FnOnce(ClientBuilder) -> ClientBuilder,
{
    let harness = dial_client(configure).await;
    harness.client.opened().await.expect("connection opens");
    harness
}

/// Wait until the client publishes `state`.
pub async fn wait_for_state(client: &Client, state: ConnectionState) {
    client
        .state_changes()
        .wait_for(|current| *current == state)
        .await
        .expect("actor publishes state");
}

/// Encode an addressed reply frame.
pub fn reply(id: &str, code: u16, body: &str) -> String {
    format!(r#"{{"id":"{id}","code":{code}}}{body}"#)
}

/// Creates a counter and a lifecycle hook that increments it.
pub fn counting_hook() -> (
    Arc<AtomicUsize>,
    impl Fn() -> BoxFuture<'static, ()> + Send + Sync + 'static,
) {
    let counter = Arc::new(AtomicUsize::new(0));
    let count = counter.clone();
    let increment = move || -> BoxFuture<'static, ()> {
        let count = count.clone();
        Box::pin(async move {
            count.fetch_add(1, Ordering::SeqCst);
        })
    };
    (counter, increment)
}

/// Creates an `on_error` hook forwarding each error message to the returned
/// receiver.
pub fn error_channel() -> (
    mpsc::UnboundedReceiver<String>,
    impl for<'a> Fn(&'a ClientError) -> BoxFuture<'static, ()> + Send + Sync + 'static,
) {
    let (tx, rx) = mpsc::unbounded_channel();
    let hook = move |err: &ClientError| -> BoxFuture<'static, ()> {
        let _ = tx.send(err.to_string());
        Box::pin(async {})
    };
    (rx, hook)
}
