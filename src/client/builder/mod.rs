//! Builder for configuring and opening a muxframe client.

mod frame_hooks;
mod lifecycle;
mod open;
mod tracing;

use std::time::Duration;

use super::{
    ClientConfig,
    TracingConfig,
    hooks::{FrameHooks, LifecycleHooks},
};

/// Builder for [`Client`](super::Client).
///
/// Collects the connection settings, lifecycle and frame hooks, then
/// [`open`](Self::open) spawns the connection actor.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use muxframe::client::ClientBuilder;
///
/// let builder = ClientBuilder::new("http://127.0.0.1:8080/ws")
///     .tracking_id("cli-7")
///     .health_check_interval(Duration::from_secs(2));
/// assert_eq!(
///     builder.config().connect_url(),
///     "ws://127.0.0.1:8080/ws?x-tracking-id=cli-7"
/// );
/// ```
pub struct ClientBuilder {
    pub(crate) config: ClientConfig,
    pub(crate) lifecycle_hooks: LifecycleHooks,
    pub(crate) frame_hooks: FrameHooks,
    pub(crate) tracing_config: TracingConfig,
}

impl ClientBuilder {
    /// Create a builder for `url` with default settings.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self { Self::from_config(ClientConfig::new(url)) }

    /// Create a builder from complete connection settings.
    #[must_use]
    pub fn from_config(config: ClientConfig) -> Self {
        Self {
            config,
            lifecycle_hooks: LifecycleHooks::default(),
            frame_hooks: FrameHooks::default(),
            tracing_config: TracingConfig::default(),
        }
    }

    /// Use `tracking_id` instead of a generated UUID.
    #[must_use]
    pub fn tracking_id(mut self, tracking_id: impl Into<String>) -> Self {
        self.config = self.config.with_tracking_id(tracking_id);
        self
    }

    /// Carry the tracking id in the query parameter `name`.
    #[must_use]
    pub fn tracking_param(mut self, name: impl Into<String>) -> Self {
        self.config = self.config.with_tracking_param(name);
        self
    }

    /// Poll for a missing transport every `interval` instead of every five
    /// seconds.
    #[must_use]
    pub fn health_check_interval(mut self, interval: Duration) -> Self {
        self.config = self.config.with_health_check_interval(interval);
        self
    }

    /// Run the version handshake after every transport open.
    #[must_use]
    pub fn handshake(mut self, version: impl Into<String>) -> Self {
        self.config = self.config.with_handshake(version);
        self
    }

    /// Settings collected so far.
    #[must_use]
    pub fn config(&self) -> &ClientConfig { &self.config }
}
