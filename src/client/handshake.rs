//! Optional version handshake run after each transport open.
//!
//! The client writes `{"version": "<v>"}` and treats the next non-heartbeat
//! inbound frame as the peer's [`HandshakeResponse`]. A non-empty `error`
//! rejects the link.

use serde::{Deserialize, Serialize};

use super::ClientError;

#[derive(Debug, Serialize)]
struct HandshakeRequest<'a> {
    version: &'a str,
}

/// Peer reply to the version handshake.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct HandshakeResponse {
    /// Protocol version the peer agreed to.
    #[serde(default)]
    pub version: Option<String>,
    /// Tracking id the peer recorded for this client.
    #[serde(default, rename = "trackingID")]
    pub tracking_id: Option<String>,
    /// Reason the peer rejected the handshake.
    #[serde(default)]
    pub error: Option<String>,
}

/// Encode the handshake request frame for `version`.
pub(crate) fn request_frame(version: &str) -> Result<String, ClientError> {
    serde_json::to_string(&HandshakeRequest { version }).map_err(ClientError::Encode)
}

/// Parse the peer's handshake reply.
pub(crate) fn parse_response(frame: &str) -> Result<HandshakeResponse, ClientError> {
    let response: HandshakeResponse =
        serde_json::from_str(frame).map_err(ClientError::HandshakeResponse)?;
    match response.error.as_deref() {
        Some(error) if !error.is_empty() => Err(ClientError::Handshake(error.to_owned())),
        _ => Ok(response),
    }
}
