//! Tracing configuration for muxframe client operations.
//!
//! [`TracingConfig`] controls the level of the spans the connection actor
//! opens around each operation and whether elapsed-time events are recorded.

use tracing::Level;

/// Controls tracing span levels and per-operation timing.
///
/// By default the lifecycle operations (`open`, `close`) emit spans at `INFO`
/// level and the per-frame operations (`send`, `receive`) at `DEBUG`. Timing
/// is disabled for every operation.
///
/// When timing is enabled for an operation, an event recording `elapsed_us`
/// is emitted inside its span when the operation completes. For `open` this
/// measures the dial.
///
/// # Examples
///
/// ```
/// use muxframe::client::TracingConfig;
/// use tracing::Level;
///
/// let config = TracingConfig::default()
///     .with_open_timing(true)
///     .with_receive_level(Level::TRACE);
/// let _ = config;
/// ```
#[derive(Clone, Debug)]
pub struct TracingConfig {
    pub(crate) open_level: Level,
    pub(crate) send_level: Level,
    pub(crate) receive_level: Level,
    pub(crate) close_level: Level,
    pub(crate) open_timing: bool,
    pub(crate) send_timing: bool,
    pub(crate) close_timing: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            open_level: Level::INFO,
            send_level: Level::DEBUG,
            receive_level: Level::DEBUG,
            close_level: Level::INFO,
            open_timing: false,
            send_timing: false,
            close_timing: false,
        }
    }
}

impl TracingConfig {
    /// Set the tracing level for dialling and opening the connection.
    #[must_use]
    pub fn with_open_level(mut self, level: Level) -> Self {
        self.open_level = level;
        self
    }

    /// Enable or disable dial timing.
    #[must_use]
    pub fn with_open_timing(mut self, enabled: bool) -> Self {
        self.open_timing = enabled;
        self
    }

    /// Set the tracing level for writing request frames.
    #[must_use]
    pub fn with_send_level(mut self, level: Level) -> Self {
        self.send_level = level;
        self
    }

    /// Enable or disable per-frame write timing.
    #[must_use]
    pub fn with_send_timing(mut self, enabled: bool) -> Self {
        self.send_timing = enabled;
        self
    }

    /// Set the tracing level for decoding and dispatching inbound frames.
    #[must_use]
    pub fn with_receive_level(mut self, level: Level) -> Self {
        self.receive_level = level;
        self
    }

    /// Set the tracing level for the explicit `close` operation.
    #[must_use]
    pub fn with_close_level(mut self, level: Level) -> Self {
        self.close_level = level;
        self
    }

    /// Enable or disable timing of the explicit `close` operation.
    #[must_use]
    pub fn with_close_timing(mut self, enabled: bool) -> Self {
        self.close_timing = enabled;
        self
    }

    /// Set the tracing level for all operations at once.
    ///
    /// # Examples
    ///
    /// ```
    /// use muxframe::client::TracingConfig;
    /// use tracing::Level;
    ///
    /// let config = TracingConfig::default().with_all_levels(Level::TRACE);
    /// let _ = config;
    /// ```
    #[must_use]
    pub fn with_all_levels(mut self, level: Level) -> Self {
        self.open_level = level;
        self.send_level = level;
        self.receive_level = level;
        self.close_level = level;
        self
    }

    /// Enable or disable timing for every timed operation at once.
    #[must_use]
    pub fn with_all_timing(mut self, enabled: bool) -> Self {
        self.open_timing = enabled;
        self.send_timing = enabled;
        self.close_timing = enabled;
        self
    }
}
