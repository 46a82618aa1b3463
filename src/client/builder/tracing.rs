//! Tracing configuration builder method for [`ClientBuilder`].

use super::ClientBuilder;
use crate::client::tracing_config::TracingConfig;

impl ClientBuilder {
    /// Configure tracing instrumentation for the client.
    ///
    /// When not called, the client uses [`TracingConfig::default()`].
    ///
    /// # Examples
    ///
    /// ```
    /// use muxframe::client::{ClientBuilder, TracingConfig};
    ///
    /// let config = TracingConfig::default().with_all_timing(true);
    /// let builder = ClientBuilder::new("ws://127.0.0.1:8080/ws").tracing_config(config);
    /// let _ = builder;
    /// ```
    #[must_use]
    pub fn tracing_config(mut self, config: TracingConfig) -> Self {
        self.tracing_config = config;
        self
    }
}
