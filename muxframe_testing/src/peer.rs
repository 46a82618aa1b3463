//! Scripted peer helpers over the in-memory transport.

use muxframe::{
    client::{Client, ClientBuilder},
    framer::split_frame,
    transport::{MemoryDialer, MemoryPeer, MemoryServer, memory_transport},
};
use serde_json::{Map, Value};

use crate::{TestError, TestResult};

/// Base URL every test client dials.
pub const TEST_URL: &str = "memory://muxframe-test";

/// Heartbeat frame; the client must neither dispatch nor log it as a miss.
pub const HEARTBEAT: &str = r#"{"heartbeat":true}"#;

/// A client connected to the server end of an in-memory link.
#[derive(Debug)]
pub struct Connected {
    /// Client under test.
    pub client: Client,
    /// Dialer the client uses; toggle refusal to simulate an unreachable peer.
    pub dialer: MemoryDialer,
    /// Accepts the links the client dials after a reconnect.
    pub server: MemoryServer,
    /// Server end of the current link.
    pub peer: MemoryPeer,
}

impl Connected {
    /// Wait for the next request frame on the current link and decode it.
    ///
    /// # Errors
    ///
    /// Returns an error when the client closes the link first or writes a
    /// frame that is not a request.
    pub async fn next_request(&mut self) -> TestResult<ReceivedRequest> {
        let frame = self
            .peer
            .recv()
            .await
            .ok_or_else(|| TestError::from("link closed before a request arrived"))?;
        parse_request(&frame)
    }

    /// Accept the link the client dials next and wait for it to open.
    ///
    /// # Errors
    ///
    /// Returns an error when the dialer is dropped or the client stops.
    pub async fn accept_reconnect(&mut self) -> TestResult {
        self.peer = self
            .server
            .accept()
            .await
            .ok_or_else(|| TestError::from("client never redialled"))?;
        self.client.opened().await?;
        Ok(())
    }
}

/// Open a client configured by `configure` and wait until it is open.
///
/// # Errors
///
/// Returns an error when the client never dials or stops before opening.
pub async fn connect<F>(configure: F) -> TestResult<Connected>
where
    F: FnOnce(ClientBuilder) -> ClientBuilder,
{
    let (dialer, mut server) = memory_transport();
    let client = configure(Client::builder(TEST_URL)).open(dialer.clone());
    let peer = server
        .accept()
        .await
        .ok_or_else(|| TestError::from("client never dialled"))?;
    client.opened().await?;
    Ok(Connected {
        client,
        dialer,
        server,
        peer,
    })
}

/// A request frame as the peer sees it.
#[derive(Clone, Debug, PartialEq)]
pub struct ReceivedRequest {
    /// Correlation id to answer with.
    pub id: String,
    /// Request method.
    pub method: String,
    /// Resolved path, including any query string.
    pub path: String,
    /// Complete header object.
    pub header: Map<String, Value>,
    /// Raw body; empty when the request had none.
    pub body: String,
}

/// Decode a request frame written by the client.
///
/// # Errors
///
/// Returns an error when the header is not a JSON object or lacks a string
/// `id`, `method` or `path`.
pub fn parse_request(frame: &str) -> TestResult<ReceivedRequest> {
    let (raw_header, body) = split_frame(frame);
    let Value::Object(header) = serde_json::from_str::<Value>(raw_header)? else {
        return Err(format!("request header is not an object: {raw_header}").into());
    };
    let field = |name: &str| -> TestResult<String> {
        header
            .get(name)
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| format!("request header lacks `{name}`: {frame}").into())
    };
    Ok(ReceivedRequest {
        id: field("id")?,
        method: field("method")?,
        path: field("path")?,
        body: body.to_owned(),
        header,
    })
}

/// Encode a reply frame for `id`.
#[must_use]
pub fn reply(id: &str, code: u16, body: &str) -> String {
    format!(r#"{{"id":"{id}","code":{code}}}{body}"#)
}

/// Encode a subscription event for `id` whose body is `fields` plus a `type`
/// of `kind`.
#[must_use]
pub fn event(id: &str, kind: &str, fields: Value) -> String {
    let mut body = match fields {
        Value::Object(fields) => fields,
        _ => Map::new(),
    };
    body.insert("type".to_owned(), Value::String(kind.to_owned()));
    reply(id, 200, &Value::Object(body).to_string())
}
