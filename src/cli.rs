//! Command line interface for the `muxframe` binary.
//!
//! Describes one request to send over a multiplexed connection. The same
//! definition drives man page generation in the build script.

use clap::Parser;

/// Command line arguments for the `muxframe` binary.
#[derive(Debug, Parser)]
#[command(
    name = "muxframe",
    version,
    about = "Send one request over a multiplexed connection and print the responses"
)]
pub struct Cli {
    /// Base URL of the peer; `http` and `https` become `ws` and `wss`.
    #[arg(short, long)]
    pub url: String,
    /// Path template, with `{name}` placeholders filled from `--param`.
    #[arg(short, long)]
    pub path: String,
    /// Request method.
    #[arg(short, long, default_value = "GET")]
    pub method: String,
    /// Path parameter as `name=value`; may be repeated.
    #[arg(long = "param", value_name = "NAME=VALUE", value_parser = parse_pair)]
    pub params: Vec<(String, String)>,
    /// Query parameter as `name=value`; may be repeated and keeps its order.
    #[arg(long = "query", value_name = "NAME=VALUE", value_parser = parse_pair)]
    pub query: Vec<(String, String)>,
    /// Header parameter as `name=value`; may be repeated.
    #[arg(long = "header", value_name = "NAME=VALUE", value_parser = parse_pair)]
    pub headers: Vec<(String, String)>,
    /// Request body sent verbatim after the header.
    #[arg(short, long)]
    pub body: Option<String>,
    /// Media type of `--body`.
    #[arg(long, default_value = "text/plain", requires = "body")]
    pub content_type: String,
    /// Keep the request id open as a subscription and print every event.
    #[arg(short, long)]
    pub subscribe: bool,
    /// Tracking id to connect with instead of a generated one.
    #[arg(long)]
    pub tracking_id: Option<String>,
    /// Protocol version to negotiate before sending.
    #[arg(long)]
    pub handshake: Option<String>,
}

/// Parse a `name=value` argument.
///
/// # Errors
///
/// Returns a message when the argument has no `=` or an empty name.
pub fn parse_pair(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_owned(), value.to_owned())),
        _ => Err(format!("expected NAME=VALUE, got `{arg}`")),
    }
}
