//! Utilities for driving a [`muxframe::Client`] against a scripted in-memory
//! peer during tests.
//!
//! The helpers open a client over [`muxframe::transport::memory_transport`],
//! hand back the server end of the link, and decode the request frames the
//! client writes so tests can answer them by id.
//!
//! ```rust
//! use muxframe::request::Request;
//! use muxframe_testing::{TestResult, connect, reply};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> TestResult {
//! let mut conn = connect(|builder| builder).await?;
//! let call = tokio::spawn({
//!     let client = conn.client.clone();
//!     async move { client.call(Request::get("/v1/rooms")).await }
//! });
//! let request = conn.next_request().await?;
//! conn.peer.send(reply(&request.id, 200, r#"["general"]"#));
//! assert_eq!(call.await??.body(), r#"["general"]"#);
//! # Ok(())
//! # }
//! ```

pub mod logging;
pub mod peer;

pub use logging::{LoggerHandle, logger};
pub use peer::{
    Connected,
    HEARTBEAT,
    ReceivedRequest,
    TEST_URL,
    connect,
    event,
    parse_request,
    reply,
};

/// Boxed error type used by fallible test helpers.
pub type TestError = Box<dyn std::error::Error + Send + Sync>;

/// Result type returned by test helpers and tests using them.
pub type TestResult<T = ()> = Result<T, TestError>;
