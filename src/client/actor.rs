//! Connection actor owning the registry, the connection state and the link.
//!
//! All protocol state lives in one task. Callers reach it through the command
//! channel; each transport link runs in its own task and forwards its events
//! tagged with the link generation, so frames, commands and health-check ticks
//! are handled one at a time and events from a superseded link are ignored.

use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::{
    sync::{mpsc, oneshot, watch},
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing::{Instrument, Span, debug, info, trace, warn};

use super::{
    ClientConfig,
    ClientError,
    ConnectionState,
    TracingConfig,
    handshake,
    hooks::{FrameHooks, LifecycleHooks},
    tracing_helpers::{
        close_span,
        emit_timing_event,
        open_span,
        receive_span,
        send_span,
        start_timer,
    },
};
use crate::{
    correlation::RequestId,
    envelope::{Envelope, decode},
    metrics::{self, Direction},
    registry::{Registry, ResponseHandler},
    request::Mode,
    response::Response,
    transport::{Dialer, FrameSink, Link, TransportError},
};

/// An encoded request waiting to be written.
pub(crate) struct Outgoing {
    pub(crate) id: RequestId,
    pub(crate) frame: String,
    pub(crate) mode: Mode,
    pub(crate) handler: Option<ResponseHandler>,
}

pub(crate) enum Command {
    Send(Outgoing),
    Close(oneshot::Sender<()>),
}

enum LinkEvent {
    Opened(FrameSink),
    DialFailed(TransportError),
    Frame(String),
    Error(TransportError),
    Closed,
}

struct Tagged {
    generation: u64,
    event: LinkEvent,
}

/// Settings moved from the builder into the actor.
pub(crate) struct ActorOptions {
    pub(crate) config: ClientConfig,
    pub(crate) lifecycle_hooks: LifecycleHooks,
    pub(crate) frame_hooks: FrameHooks,
    pub(crate) tracing_config: TracingConfig,
}

pub(crate) struct ConnectionActor<D> {
    dialer: Arc<D>,
    connect_url: String,
    config: ClientConfig,
    hooks: LifecycleHooks,
    frame_hooks: FrameHooks,
    tracing_config: TracingConfig,
    registry: Registry,
    state: ConnectionState,
    state_tx: watch::Sender<ConnectionState>,
    commands: mpsc::UnboundedReceiver<Command>,
    events_tx: mpsc::UnboundedSender<Tagged>,
    events: mpsc::UnboundedReceiver<Tagged>,
    sink: Option<FrameSink>,
    generation: u64,
    link_cancel: Option<CancellationToken>,
    shutdown: CancellationToken,
    tracker: TaskTracker,
    awaiting_handshake: bool,
}

impl<D: Dialer> ConnectionActor<D> {
    pub(crate) fn new(
        dialer: D,
        options: ActorOptions,
        commands: mpsc::UnboundedReceiver<Command>,
        state_tx: watch::Sender<ConnectionState>,
    ) -> Self {
        let (events_tx, events) = mpsc::unbounded_channel();
        Self {
            dialer: Arc::new(dialer),
            connect_url: options.config.connect_url(),
            config: options.config,
            hooks: options.lifecycle_hooks,
            frame_hooks: options.frame_hooks,
            tracing_config: options.tracing_config,
            registry: Registry::new(),
            state: ConnectionState::Disconnected,
            state_tx,
            commands,
            events_tx,
            events,
            sink: None,
            generation: 0,
            link_cancel: None,
            shutdown: CancellationToken::new(),
            tracker: TaskTracker::new(),
            awaiting_handshake: false,
        }
    }

    /// Drive the connection until it is closed or every client handle is
    /// dropped.
    pub(crate) async fn run(mut self) {
        self.connect();
        let period = self.config.health_check_interval();
        let mut health = time::interval_at(Instant::now() + period, period);
        health.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                command = self.commands.recv() => match command {
                    Some(Command::Send(outgoing)) => self.send(outgoing).await,
                    Some(Command::Close(ack)) => {
                        self.close(Some(ack)).await;
                        break;
                    }
                    None => {
                        self.close(None).await;
                        break;
                    }
                },
                Some(tagged) = self.events.recv() => self.handle_event(tagged).await,
                _ = health.tick() => self.health_check(),
            }
        }
    }

    fn set_state(&mut self, state: ConnectionState) {
        if self.state != state {
            debug!(from = %self.state, to = %state, "connection state changed");
        }
        self.state = state;
        self.state_tx.send_replace(state);
    }

    /// `Disconnected → Connecting`: spawn a task dialling a fresh link.
    fn connect(&mut self) {
        self.generation += 1;
        let cancel = self.shutdown.child_token();
        self.link_cancel = Some(cancel.clone());
        self.set_state(ConnectionState::Connecting);

        let span = open_span(&self.tracing_config, &self.connect_url, self.generation);
        let task = LinkTask {
            dialer: Arc::clone(&self.dialer),
            url: self.connect_url.clone(),
            generation: self.generation,
            events: self.events_tx.clone(),
            cancel,
            timing: self.tracing_config.open_timing,
        };
        self.tracker.spawn(task.run(span));
    }

    fn health_check(&mut self) {
        if self.state == ConnectionState::Disconnected && self.link_cancel.is_none() {
            info!(url = %self.connect_url, "no transport; reconnecting");
            metrics::inc_reconnects();
            self.connect();
        }
    }

    async fn handle_event(&mut self, Tagged { generation, event }: Tagged) {
        if generation != self.generation {
            trace!(
                generation,
                current = self.generation,
                "ignoring event from superseded link"
            );
            return;
        }
        match event {
            LinkEvent::Opened(sink) => self.link_opened(sink).await,
            LinkEvent::DialFailed(error) => {
                warn!(url = %self.connect_url, %error, "dial failed");
                metrics::inc_errors();
                self.link_cancel = None;
                self.set_state(ConnectionState::Disconnected);
                self.hooks.error(&ClientError::Transport(error)).await;
            }
            LinkEvent::Frame(frame) => self.frame_received(frame).await,
            LinkEvent::Error(error) => {
                warn!(%error, "transport error");
                metrics::inc_errors();
                self.hooks.error(&ClientError::Transport(error)).await;
            }
            LinkEvent::Closed => self.link_closed().await,
        }
    }

    async fn link_opened(&mut self, sink: FrameSink) {
        metrics::inc_connections();
        self.sink = Some(sink);

        let Some(version) = self.config.handshake_version().map(str::to_owned) else {
            self.mark_open().await;
            return;
        };
        let written = match handshake::request_frame(&version) {
            Ok(frame) => self.write(frame).await,
            Err(error) => Err(error),
        };
        match written {
            Ok(()) => {
                debug!(%version, "handshake sent");
                self.awaiting_handshake = true;
            }
            Err(error) => {
                warn!(%error, "failed to send handshake; dropping link");
                self.hooks.error(&error).await;
                self.drop_link().await;
            }
        }
    }

    async fn mark_open(&mut self) {
        self.set_state(ConnectionState::Open);
        info!(url = %self.connect_url, "connection open");
        self.hooks.opened().await;
    }

    async fn frame_received(&mut self, mut frame: String) {
        if self.awaiting_handshake {
            metrics::inc_frames(Direction::Inbound);
            if matches!(decode(&frame), Ok(Envelope::Heartbeat)) {
                trace!("heartbeat before handshake reply");
                return;
            }
            self.awaiting_handshake = false;
            match handshake::parse_response(&frame) {
                Ok(response) => {
                    debug!(
                        version = ?response.version,
                        tracking_id = ?response.tracking_id,
                        "handshake accepted"
                    );
                    self.mark_open().await;
                }
                Err(error) => {
                    warn!(%error, "handshake failed; dropping link");
                    metrics::inc_errors();
                    self.hooks.error(&error).await;
                    self.drop_link().await;
                }
            }
            return;
        }

        self.frame_hooks.incoming(&mut frame);
        metrics::inc_frames(Direction::Inbound);
        self.dispatch(&frame);
    }

    fn dispatch(&mut self, frame: &str) {
        let span = receive_span(&self.tracing_config, frame.len());
        let _entered = span.enter();
        match decode(frame) {
            Ok(Envelope::Heartbeat) => {
                span.record("outcome", "heartbeat");
                trace!("heartbeat");
            }
            Ok(Envelope::Addressed(inbound)) => {
                let outcome = self.registry.dispatch(inbound);
                span.record("outcome", tracing::field::debug(outcome));
            }
            Ok(Envelope::Unaddressed { header, body }) => {
                span.record("outcome", "unaddressed");
                let header = Value::Object(header);
                info!(%header, %body, "unaddressed frame");
            }
            Err(error) => {
                span.record("outcome", "malformed");
                warn!(%error, "dropping malformed frame");
                metrics::inc_errors();
            }
        }
    }

    /// `Open → Disconnected` on transport close: fail every outstanding
    /// handler before the close hook runs.
    async fn link_closed(&mut self) {
        let was_open = self.state.is_open();
        self.link_cancel = None;
        self.awaiting_handshake = false;
        if self.sink.take().is_some() {
            metrics::dec_connections();
        }
        self.set_state(ConnectionState::Disconnected);
        let failed = self.registry.fail_all();
        info!(failed, "connection closed");
        if was_open {
            self.hooks.closed().await;
        }
    }

    /// Abandon the current link without it ever having opened.
    async fn drop_link(&mut self) {
        self.generation += 1;
        self.awaiting_handshake = false;
        if let Some(cancel) = self.link_cancel.take() {
            cancel.cancel();
        }
        if let Some(mut sink) = self.sink.take() {
            if let Err(error) = sink.close().await {
                debug!(%error, "error closing rejected link");
            }
            metrics::dec_connections();
        }
        self.registry.fail_all();
        self.set_state(ConnectionState::Disconnected);
    }

    async fn write(&mut self, frame: String) -> Result<(), ClientError> {
        let Some(sink) = self.sink.as_mut() else {
            return Err(ClientError::Transport(TransportError::Closed));
        };
        sink.send(frame).await?;
        metrics::inc_frames(Direction::Outbound);
        Ok(())
    }

    async fn send(&mut self, outgoing: Outgoing) {
        let Outgoing {
            id,
            mut frame,
            mode,
            handler,
        } = outgoing;

        if let Mode::Unsubscribe(prior) = &mode {
            self.registry.unsubscribe(prior);
        }
        if !self.state.is_open() {
            warn!(%id, state = %self.state, "connection not open; failing request");
            if let Some(mut handler) = handler {
                handler(Response::connection_lost(id));
            }
            return;
        }
        if let Some(handler) = handler {
            self.registry
                .register(id.clone(), handler, matches!(mode, Mode::Subscribe));
        }

        self.frame_hooks.outgoing(&mut frame);
        let span = send_span(&self.tracing_config, id.as_str(), frame.len());
        let timing = self.tracing_config.send_timing;
        let written = async {
            let start = start_timer(timing);
            let written = self.write(frame).await;
            emit_timing_event(start);
            written
        }
        .instrument(span)
        .await;

        if let Err(error) = written {
            warn!(%id, %error, "failed to write request");
            metrics::inc_errors();
            self.hooks.error(&error).await;
        }
    }

    /// Explicit close: stop the health check and the link, fail everything
    /// outstanding and acknowledge every pending close request.
    async fn close(&mut self, ack: Option<oneshot::Sender<()>>) {
        let span = close_span(&self.tracing_config);
        let timing = self.tracing_config.close_timing;
        let mut acks: Vec<_> = ack.into_iter().collect();
        async {
            let start = start_timer(timing);
            let was_open = self.state.is_open();
            self.generation += 1;
            self.shutdown.cancel();
            self.link_cancel = None;
            if let Some(mut sink) = self.sink.take() {
                if let Err(error) = sink.close().await {
                    debug!(%error, "error closing transport");
                }
                metrics::dec_connections();
            }

            self.commands.close();
            while let Ok(command) = self.commands.try_recv() {
                match command {
                    Command::Send(Outgoing {
                        id,
                        handler: Some(mut handler),
                        ..
                    }) => handler(Response::connection_lost(id)),
                    Command::Send(_) => {}
                    Command::Close(ack) => acks.push(ack),
                }
            }

            self.set_state(ConnectionState::Disconnected);
            let failed = self.registry.fail_all();
            info!(failed, "client closed");
            if was_open {
                self.hooks.closed().await;
            }
            self.tracker.close();
            self.tracker.wait().await;
            emit_timing_event(start);
        }
        .instrument(span)
        .await;

        for ack in acks {
            let _ = ack.send(());
        }
    }
}

/// One transport link: dial, then forward every inbound item.
struct LinkTask<D> {
    dialer: Arc<D>,
    url: String,
    generation: u64,
    events: mpsc::UnboundedSender<Tagged>,
    cancel: CancellationToken,
    timing: bool,
}

impl<D: Dialer> LinkTask<D> {
    fn emit(&self, event: LinkEvent) -> bool {
        self.events
            .send(Tagged {
                generation: self.generation,
                event,
            })
            .is_ok()
    }

    async fn run(self, span: Span) {
        let dial = async {
            let start = start_timer(self.timing);
            let result = self.dialer.dial(&self.url).await;
            emit_timing_event(start);
            if let Err(error) = &result {
                debug!(%error, "dial attempt failed");
            }
            result
        }
        .instrument(span);

        let result = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return,
            result = dial => result,
        };
        let Link { sink, mut source } = match result {
            Ok(link) => link,
            Err(error) => {
                self.emit(LinkEvent::DialFailed(error));
                return;
            }
        };
        if !self.emit(LinkEvent::Opened(sink)) {
            return;
        }

        loop {
            let item = tokio::select! {
                biased;
                () = self.cancel.cancelled() => return,
                item = source.next() => item,
            };
            let event = match item {
                Some(Ok(frame)) => LinkEvent::Frame(frame),
                Some(Err(error)) => LinkEvent::Error(error),
                None => {
                    self.emit(LinkEvent::Closed);
                    return;
                }
            };
            if !self.emit(event) {
                return;
            }
        }
    }
}
