//! Responses delivered to request handlers.
//!
//! Every outcome reaches the application the same way: a [`Response`] passed
//! to the handler registered for the request id. Real replies, subscription
//! events and the synthetic failure raised when the connection drops are told
//! apart by [`ResponseKind`].

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::correlation::RequestId;

/// Status code synthesised for requests outstanding when the transport
/// closes, or sent while the connection was not open.
pub const CONNECTION_LOST: u16 = 503;

/// Origin of a delivered [`Response`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseKind {
    /// Reply to a one-shot request; no further deliveries follow.
    Reply,
    /// Event for a standing subscription.
    Event,
    /// Synthetic failure produced locally; no further deliveries follow.
    ConnectionLost,
}

/// Failure to interpret a response body as the expected type.
///
/// The raw text remains available through [`Response::body`].
#[derive(Debug, Error)]
#[error("response body is not valid {expected}: {source}")]
pub struct BodyParseError {
    expected: &'static str,
    #[source]
    source: serde_json::Error,
}

impl BodyParseError {
    /// Name of the format the body failed to parse as.
    #[must_use]
    pub fn expected(&self) -> &'static str { self.expected }
}

/// One delivery for a request id.
#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    id: RequestId,
    kind: ResponseKind,
    header: Map<String, Value>,
    body: String,
}

impl Response {
    pub(crate) fn new(
        id: RequestId,
        kind: ResponseKind,
        header: Map<String, Value>,
        body: String,
    ) -> Self {
        Self {
            id,
            kind,
            header,
            body,
        }
    }

    /// Build the synthetic failure delivered for `id` when the connection is
    /// lost: header `{"id": id, "code": 503}` and an empty body.
    #[must_use]
    pub fn connection_lost(id: RequestId) -> Self {
        let mut header = Map::new();
        header.insert("id".to_owned(), Value::String(id.as_str().to_owned()));
        header.insert("code".to_owned(), Value::from(CONNECTION_LOST));
        Self::new(id, ResponseKind::ConnectionLost, header, String::new())
    }

    /// Request id this response belongs to.
    #[must_use]
    pub fn id(&self) -> &RequestId { &self.id }

    /// Origin of the response.
    #[must_use]
    pub fn kind(&self) -> ResponseKind { self.kind }

    /// Whether this is the synthetic connection-loss failure.
    #[must_use]
    pub fn is_connection_lost(&self) -> bool { self.kind == ResponseKind::ConnectionLost }

    /// Status code from the header, if the peer sent one.
    #[must_use]
    pub fn code(&self) -> Option<u16> {
        self.header
            .get("code")
            .and_then(Value::as_u64)
            .and_then(|code| u16::try_from(code).ok())
    }

    /// Whether the status code is in the 2xx range.
    #[must_use]
    pub fn is_success(&self) -> bool { self.code().is_some_and(|code| (200..300).contains(&code)) }

    /// Media type declared in the header's `type` field.
    #[must_use]
    pub fn media_type(&self) -> Option<&str> { self.header.get("type").and_then(Value::as_str) }

    /// Full decoded header object.
    #[must_use]
    pub fn header(&self) -> &Map<String, Value> { &self.header }

    /// Raw body text; empty when the frame carried no body.
    #[must_use]
    pub fn body(&self) -> &str { &self.body }

    /// Consume the response, returning the raw body.
    #[must_use]
    pub fn into_body(self) -> String { self.body }

    /// Parse the body as JSON into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`BodyParseError`] when the body is not valid JSON for `T`.
    ///
    /// # Examples
    ///
    /// ```
    /// use muxframe::{
    ///     envelope::{Envelope, decode},
    ///     response::ResponseKind,
    /// };
    ///
    /// let Envelope::Addressed(inbound) = decode(r#"{"id":"0","code":200}["general"]"#)? else {
    ///     unreachable!()
    /// };
    /// let response = inbound.into_response(ResponseKind::Reply);
    /// let rooms: Vec<String> = response.json()?;
    /// assert_eq!(rooms, ["general"]);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, BodyParseError> {
        serde_json::from_str(&self.body).map_err(|source| BodyParseError {
            expected: "JSON",
            source,
        })
    }

    /// Kind of a subscription event: the `type` field of a JSON object body.
    ///
    /// Returns `None` when the body is not a JSON object or has no string
    /// `type` field.
    #[must_use]
    pub fn event_kind(&self) -> Option<String> {
        match serde_json::from_str::<Value>(&self.body).ok()? {
            Value::Object(mut fields) => match fields.remove("type")? {
                Value::String(kind) => Some(kind),
                _ => None,
            },
            _ => None,
        }
    }
}
