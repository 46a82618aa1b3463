//! Command line client for a multiplexed connection.
//!
//! Opens a WebSocket connection, sends one request and prints each response
//! as `<code> <body>`.

mod cli;

use std::process::ExitCode;

use clap::Parser;
use futures::StreamExt;
use muxframe::{
    client::{Client, ClientError},
    request::Request,
    response::Response,
    transport::WebSocketDialer,
};
use tracing::warn;

fn build_request(cli: &cli::Cli) -> Request {
    let mut builder = Request::builder(cli.path.as_str()).method(cli.method.as_str());
    for (name, value) in &cli.params {
        builder = builder.path_param(name.as_str(), value.as_str());
    }
    for (name, value) in &cli.query {
        builder = builder.query_param(name.as_str(), value.as_str());
    }
    for (name, value) in &cli.headers {
        builder = builder.header_param(name.as_str(), value.as_str());
    }
    if let Some(body) = &cli.body {
        builder = builder.content(body.as_str(), cli.content_type.as_str());
    }
    builder.build()
}

fn print_response(response: &Response) {
    let code = response
        .code()
        .map_or_else(|| "-".to_owned(), |code| code.to_string());
    println!("{code} {}", response.body());
}

async fn run(cli: cli::Cli) -> Result<ExitCode, ClientError> {
    let mut builder = Client::builder(cli.url.as_str());
    if let Some(tracking_id) = &cli.tracking_id {
        builder = builder.tracking_id(tracking_id.as_str());
    }
    if let Some(version) = &cli.handshake {
        builder = builder.handshake(version.as_str());
    }
    let client = builder
        .on_error(|err| {
            let message = err.to_string();
            async move {
                warn!(%message, "client error");
            }
        })
        .open(WebSocketDialer);
    client.opened().await?;

    let request = build_request(&cli);
    if cli.subscribe {
        let mut events = client.subscribe(request)?;
        while let Some(event) = events.next().await {
            print_response(&event);
        }
        client.close().await;
        return Ok(ExitCode::FAILURE);
    }

    let response = client.call(request).await?;
    print_response(&response);
    client.close().await;
    Ok(if response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    // Applications embedding the library should install their own subscriber.
    tracing_subscriber::fmt::init();

    match run(cli::Cli::parse()).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("muxframe: {err}");
            ExitCode::FAILURE
        }
    }
}
