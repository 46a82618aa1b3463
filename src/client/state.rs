//! Connection state published by the connection actor.

use std::fmt;

/// Position of the connection in its `Disconnected → Connecting → Open` cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConnectionState {
    /// No transport link exists. The health check will dial again.
    #[default]
    Disconnected,
    /// A dial (and, when configured, the version handshake) is in progress.
    Connecting,
    /// The link is established and requests may be sent.
    Open,
}

impl ConnectionState {
    /// Whether requests can currently be written to the transport.
    #[must_use]
    pub fn is_open(self) -> bool { self == Self::Open }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Disconnected => "disconnected",
            Self::Connecting => "connecting",
            Self::Open => "open",
        })
    }
}
