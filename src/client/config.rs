//! Connection settings for muxframe clients.

use std::time::Duration;

use uuid::Uuid;

use crate::request::encode_component;

/// Query parameter carrying the tracking id when none is configured.
pub const DEFAULT_TRACKING_PARAM: &str = "x-tracking-id";

/// Period of the reconnect health check when none is configured.
pub const DEFAULT_HEALTH_CHECK_INTERVAL: Duration = Duration::from_secs(5);

/// Settings fixed for the lifetime of one client.
///
/// The tracking id is generated once as a UUID v4 and reused for every
/// reconnect so the peer can recognise the same client.
///
/// # Examples
///
/// ```
/// use muxframe::client::ClientConfig;
///
/// let config = ClientConfig::new("http://chat.example/ws").with_tracking_id("abc");
/// assert_eq!(config.connect_url(), "ws://chat.example/ws?x-tracking-id=abc");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    url: String,
    tracking_param: String,
    tracking_id: String,
    health_check_interval: Duration,
    handshake_version: Option<String>,
}

impl ClientConfig {
    /// Create settings for `url` with a fresh tracking id and the defaults.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            tracking_param: DEFAULT_TRACKING_PARAM.to_owned(),
            tracking_id: Uuid::new_v4().to_string(),
            health_check_interval: DEFAULT_HEALTH_CHECK_INTERVAL,
            handshake_version: None,
        }
    }

    /// Replace the tracking id.
    #[must_use]
    pub fn with_tracking_id(mut self, tracking_id: impl Into<String>) -> Self {
        self.tracking_id = tracking_id.into();
        self
    }

    /// Replace the name of the tracking query parameter.
    #[must_use]
    pub fn with_tracking_param(mut self, name: impl Into<String>) -> Self {
        self.tracking_param = name.into();
        self
    }

    /// Replace the reconnect health-check period.
    ///
    /// A zero duration is raised to one millisecond.
    #[must_use]
    pub fn with_health_check_interval(mut self, interval: Duration) -> Self {
        self.health_check_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Send `{"version": version}` after every transport open and wait for
    /// the peer's handshake response before reporting the connection open.
    #[must_use]
    pub fn with_handshake(mut self, version: impl Into<String>) -> Self {
        self.handshake_version = Some(version.into());
        self
    }

    /// Base URL as configured.
    #[must_use]
    pub fn url(&self) -> &str { &self.url }

    /// Tracking id sent on every connection attempt.
    #[must_use]
    pub fn tracking_id(&self) -> &str { &self.tracking_id }

    /// Name of the query parameter carrying the tracking id.
    #[must_use]
    pub fn tracking_param(&self) -> &str { &self.tracking_param }

    /// Reconnect health-check period.
    #[must_use]
    pub fn health_check_interval(&self) -> Duration { self.health_check_interval }

    /// Handshake version, when a handshake is configured.
    #[must_use]
    pub fn handshake_version(&self) -> Option<&str> { self.handshake_version.as_deref() }

    /// URL handed to the dialer.
    ///
    /// `http://` and `https://` schemes become `ws://` and `wss://`. The
    /// tracking parameter is appended with `?`, or with `&` when the URL
    /// already has a query string.
    #[must_use]
    pub fn connect_url(&self) -> String {
        let mut url = if let Some(rest) = self.url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else if let Some(rest) = self.url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else {
            self.url.clone()
        };
        url.push(if url.contains('?') { '&' } else { '?' });
        url.push_str(&encode_component(&self.tracking_param));
        url.push('=');
        url.push_str(&encode_component(&self.tracking_id));
        url
    }
}
