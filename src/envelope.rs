//! Wire encoding of requests and classification of inbound frames.
//!
//! Outgoing messages are the JSON header `{id, method, path, type?}`
//! immediately followed by the body text. Inbound frames are split by the
//! [`framer`](crate::framer), the header is parsed as a JSON object, and the
//! frame is classified once into an [`Envelope`] variant so later stages never
//! re-test header fields.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{
    correlation::RequestId,
    framer::split_frame,
    request::Request,
    response::{Response, ResponseKind},
};

/// Failure to decode the header segment of an inbound frame.
///
/// Malformed frames are dropped by the client; this error never reaches
/// request handlers.
#[derive(Debug, Error)]
pub enum FrameError {
    /// The header segment is not valid JSON.
    #[error("frame header is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The header segment is valid JSON but not an object.
    #[error("frame header is not a JSON object")]
    NotAnObject,
}

/// Header written in front of every outgoing request.
#[derive(Debug, Serialize)]
struct OutgoingHeader<'a> {
    id: &'a str,
    method: &'a str,
    path: &'a str,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    content_type: Option<&'a str>,
    #[serde(skip_serializing_if = "no_headers")]
    headers: &'a BTreeMap<String, String>,
}

#[expect(
    clippy::trivially_copy_pass_by_ref,
    reason = "serde passes skip_serializing_if predicates a reference to the field"
)]
fn no_headers(headers: &&BTreeMap<String, String>) -> bool { headers.is_empty() }

/// Encode `request` for the wire under the identifier `id`.
///
/// The `type` field is present only when the request has a non-empty body.
/// An absent body and an empty body encode identically.
///
/// # Errors
///
/// Returns the serialisation error if the header cannot be written as JSON.
///
/// # Examples
///
/// ```
/// use muxframe::{correlation::RequestId, envelope::encode, request::Request};
///
/// let request = Request::post("/v1/echo").content("hola", "text/plain").build();
/// let wire = encode(&request, &RequestId::from(3))?;
/// assert_eq!(
///     wire,
///     r#"{"id":"3","method":"POST","path":"/v1/echo","type":"text/plain"}hola"#
/// );
/// # Ok::<(), serde_json::Error>(())
/// ```
pub fn encode(request: &Request, id: &RequestId) -> Result<String, serde_json::Error> {
    let path = request.resolved_path();
    let body = request.body();
    let header = OutgoingHeader {
        id: id.as_str(),
        method: request.method(),
        path: &path,
        content_type: body.and(request.content_type()),
        headers: request.header_params(),
    };
    let mut wire = serde_json::to_string(&header)?;
    if let Some(body) = body {
        wire.push_str(body);
    }
    Ok(wire)
}

/// An inbound frame addressed to a request id.
#[derive(Clone, Debug, PartialEq)]
pub struct Inbound {
    /// Request id the frame answers.
    pub id: RequestId,
    /// Decoded header object.
    pub header: Map<String, Value>,
    /// Raw body text.
    pub body: String,
}

impl Inbound {
    /// Status code carried in the header, if any.
    #[must_use]
    pub fn code(&self) -> Option<u64> { self.header.get("code").and_then(Value::as_u64) }

    /// Turn the frame into a [`Response`] of the given kind.
    #[must_use]
    pub fn into_response(self, kind: ResponseKind) -> Response {
        Response::new(self.id, kind, self.header, self.body)
    }
}

/// Classified inbound frame.
#[derive(Clone, Debug, PartialEq)]
pub enum Envelope {
    /// Liveness frame with no payload; discarded before any other handling.
    Heartbeat,
    /// Frame carrying a request id, routed through the registry.
    Addressed(Inbound),
    /// Frame without an id, routed to the catch-all log sink.
    Unaddressed {
        /// Decoded header object.
        header: Map<String, Value>,
        /// Raw body text.
        body: String,
    },
}

/// Split and classify one inbound frame.
///
/// A header with `"heartbeat": true` is a heartbeat regardless of its other
/// fields. A string or numeric `id` that is not empty makes the frame
/// addressed; anything else is unaddressed.
///
/// # Errors
///
/// Returns [`FrameError`] if the header segment is not a JSON object.
///
/// # Examples
///
/// ```
/// use muxframe::envelope::{Envelope, decode};
///
/// assert_eq!(decode(r#"{"heartbeat":true}"#)?, Envelope::Heartbeat);
/// let Envelope::Addressed(inbound) = decode(r#"{"id":"0","code":200}["general"]"#)? else {
///     unreachable!()
/// };
/// assert_eq!(inbound.id.as_str(), "0");
/// assert_eq!(inbound.body, r#"["general"]"#);
/// # Ok::<(), muxframe::envelope::FrameError>(())
/// ```
pub fn decode(frame: &str) -> Result<Envelope, FrameError> {
    let (header, body) = split_frame(frame);
    let Value::Object(header) = serde_json::from_str::<Value>(header)? else {
        return Err(FrameError::NotAnObject);
    };

    if header.get("heartbeat").and_then(Value::as_bool) == Some(true) {
        return Ok(Envelope::Heartbeat);
    }

    let id = match header.get("id") {
        Some(Value::String(id)) if !id.is_empty() => Some(RequestId::new(id.as_str())),
        Some(Value::Number(id)) => Some(RequestId::new(id.to_string())),
        _ => None,
    };
    let body = body.to_owned();
    Ok(match id {
        Some(id) => Envelope::Addressed(Inbound { id, header, body }),
        None => Envelope::Unaddressed { header, body },
    })
}
