//! Streaming client actor.
//!
//! The actor is the single writer for connection state, reconnect bookkeeping, the
//! subscription set and the sample buffer. Transport IO runs in spawned tasks that only
//! forward events into the mailbox, tagged with the epoch of the handle they belong to.

use std::collections::BTreeSet;
use std::time::Duration;

use bytes::Bytes;
use futures_util::StreamExt;
use kameo::error::SendError;
use kameo::prelude::{Actor, ActorRef, Context, Message as KameoMessage, WeakActorRef};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, info, warn};

use super::writer::{WriterClose, WriterWrite, WsWriterActor};
use crate::config::{ClientConfig, ClientRole, default_subscriptions};
use crate::core::{
    ConnectionCommand, ConnectionMachine, ConnectionSnapshot, ConnectionState, Sample,
    SampleBuffer, TimerId, WebSocketError, WebSocketResult, WsFrame,
};
use crate::observer::{ClientEvent, ClientObserver};
use crate::protocol::{InboundMessage, OutboundMessage};
use crate::router::{DispatchOutcome, MessageRouter};
use crate::transport::WsTransport;
use crate::transport::tungstenite::TungsteniteTransport;

/// Close code sent when the client shuts a connection down on purpose.
pub const CLIENT_CLOSE_CODE: u16 = 1000;

/// Arguments passed when constructing a [`StreamClientActor`].
pub struct StreamClientArgs<O, T = TungsteniteTransport>
where
    O: ClientObserver,
    T: WsTransport,
{
    pub config: ClientConfig,
    pub transport: T,
    pub router: MessageRouter<SampleBuffer>,
    pub observer: O,
    pub subscriptions: BTreeSet<String>,
}

impl<O: ClientObserver> StreamClientArgs<O, TungsteniteTransport> {
    pub fn new(config: ClientConfig, observer: O) -> Self {
        Self::with_transport(config, TungsteniteTransport::default(), observer)
    }
}

impl<O, T> StreamClientArgs<O, T>
where
    O: ClientObserver,
    T: WsTransport,
{
    /// Telemetry clients start with the default metric set; chat clients with none.
    pub fn with_transport(config: ClientConfig, transport: T, observer: O) -> Self {
        let router = MessageRouter::with_capacity(config.sample_capacity);
        let subscriptions = match config.role {
            ClientRole::Telemetry => default_subscriptions(),
            ClientRole::Chat => BTreeSet::new(),
        };
        Self {
            config,
            transport,
            router,
            observer,
            subscriptions,
        }
    }

    pub fn router(mut self, router: MessageRouter<SampleBuffer>) -> Self {
        self.router = router;
        self
    }

    pub fn subscriptions<I, S>(mut self, metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subscriptions = metrics.into_iter().map(Into::into).collect();
        self
    }
}

pub struct StreamClientActor<O, T = TungsteniteTransport>
where
    O: ClientObserver,
    T: WsTransport,
{
    config: ClientConfig,
    transport: T,
    machine: ConnectionMachine,
    router: MessageRouter<SampleBuffer>,
    observer: O,
    subscriptions: BTreeSet<String>,
    actor_ref: ActorRef<Self>,
    connect_task: Option<JoinHandle<()>>,
    reader_task: Option<JoinHandle<()>>,
    reconnect_task: Option<(TimerId, JoinHandle<()>)>,
    writer_ref: Option<ActorRef<WsWriterActor<T::Writer>>>,
    shutdown_tx: Option<watch::Sender<bool>>,
}

impl<O, T> Actor for StreamClientActor<O, T>
where
    O: ClientObserver,
    T: WsTransport,
{
    type Args = StreamClientArgs<O, T>;
    type Error = WebSocketError;

    fn name() -> &'static str {
        "StreamClientActor"
    }

    async fn on_start(args: Self::Args, ctx: ActorRef<Self>) -> WebSocketResult<Self> {
        let StreamClientArgs {
            config,
            transport,
            router,
            observer,
            subscriptions,
        } = args;

        Ok(Self {
            machine: ConnectionMachine::new(config.backoff),
            config,
            transport,
            router,
            observer,
            subscriptions,
            actor_ref: ctx,
            connect_task: None,
            reader_task: None,
            reconnect_task: None,
            writer_ref: None,
            shutdown_tx: None,
        })
    }

    async fn on_stop(
        &mut self,
        _ctx: WeakActorRef<Self>,
        _reason: kameo::error::ActorStopReason,
    ) -> WebSocketResult<()> {
        if let Some((_, task)) = self.reconnect_task.take() {
            task.abort();
        }
        let close = (self.machine.state() == ConnectionState::Open)
            .then_some((CLIENT_CLOSE_CODE, "client shutdown"));
        self.teardown_connection(close).await;
        Ok(())
    }

    fn on_panic(
        &mut self,
        _actor_ref: kameo::actor::WeakActorRef<Self>,
        err: kameo::prelude::PanicError,
    ) -> impl std::future::Future<
        Output = Result<std::ops::ControlFlow<kameo::prelude::ActorStopReason>, Self::Error>,
    > + Send {
        async move {
            // A panicking message handler must not take the connection down with it.
            tracing::error!(error = ?err, "StreamClientActor handler panicked");
            Ok(std::ops::ControlFlow::Continue(()))
        }
    }
}

impl<O, T> StreamClientActor<O, T>
where
    O: ClientObserver,
    T: WsTransport,
{
    fn connection_label(&self) -> &'static str {
        self.config.role.as_str()
    }

    async fn execute(&mut self, commands: Vec<ConnectionCommand>) {
        for command in commands {
            match command {
                ConnectionCommand::Connect { epoch } => self.spawn_connect(epoch),
                ConnectionCommand::Disconnect => {
                    let close = Some((CLIENT_CLOSE_CODE, "client stop"));
                    self.teardown_connection(close).await;
                }
                ConnectionCommand::ScheduleReconnect {
                    timer,
                    delay,
                    attempt,
                } => self.schedule_reconnect(timer, delay, attempt),
                ConnectionCommand::CancelReconnect { timer } => self.cancel_reconnect(timer),
                ConnectionCommand::SendHandshake => self.send_handshake().await,
                ConnectionCommand::StateChanged(state) => {
                    info!(
                        connection = self.connection_label(),
                        state = %state,
                        attempt = self.machine.attempt(),
                        epoch = self.machine.epoch(),
                        "connection state changed"
                    );
                    self.observer.notify(ClientEvent::StateChanged {
                        state,
                        attempt: self.machine.attempt(),
                    });
                }
                ConnectionCommand::RecoveryExhausted { attempts } => {
                    warn!(
                        connection = self.connection_label(),
                        attempts,
                        "automatic reconnect exhausted; waiting for explicit start"
                    );
                    self.observer
                        .notify(ClientEvent::RecoveryExhausted { attempts });
                }
            }
        }
    }

    fn spawn_connect(&mut self, epoch: u64) {
        if let Some(task) = self.connect_task.take() {
            task.abort();
        }

        let url = self.config.endpoint_url();
        let buffers = self.config.buffers;
        let transport = self.transport.clone();
        let actor_ref = self.actor_ref.clone();
        debug!(
            connection = self.connection_label(),
            epoch,
            "opening websocket connection"
        );

        self.connect_task = Some(tokio::spawn(async move {
            let result = match url {
                Ok(url) => transport.connect(url, buffers).await,
                Err(err) => Err(err),
            };
            match result {
                Ok((reader, writer)) => {
                    let _ = actor_ref
                        .tell(ConnectionEstablished::<T> {
                            epoch,
                            reader,
                            writer,
                        })
                        .send()
                        .await;
                }
                Err(error) => {
                    let _ = actor_ref.tell(ConnectionFailed { epoch, error }).send().await;
                }
            }
        }));
    }

    fn schedule_reconnect(&mut self, timer: TimerId, delay: Duration, attempt: u32) {
        if let Some((_, task)) = self.reconnect_task.take() {
            task.abort();
        }

        let max_attempts = self.machine.policy().max_attempts;
        warn!(
            connection = self.connection_label(),
            attempt,
            max_attempts,
            delay_ms = delay.as_millis().min(u64::MAX as u128) as u64,
            "websocket reconnect scheduled"
        );
        self.observer.notify(ClientEvent::ReconnectScheduled {
            attempt,
            max_attempts,
            delay,
        });

        let actor_ref = self.actor_ref.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = actor_ref.tell(ReconnectDue { timer }).send().await;
        });
        self.reconnect_task = Some((timer, task));
    }

    fn cancel_reconnect(&mut self, timer: TimerId) {
        match self.reconnect_task.take() {
            Some((pending, task)) if pending == timer => {
                debug!(connection = self.connection_label(), timer, "reconnect cancelled");
                task.abort();
            }
            other => self.reconnect_task = other,
        }
    }

    async fn send_handshake(&mut self) {
        if !self.config.role.sends_handshake() {
            return;
        }
        let message = OutboundMessage::subscribe(self.subscriptions.iter().cloned());
        if let Err(err) = self.send_message(&message).await {
            warn!(
                connection = self.connection_label(),
                error = %err,
                "failed to send subscription handshake"
            );
            self.observer.notify(ClientEvent::TransportError {
                error: err.to_string(),
            });
        }
    }

    async fn send_message(&mut self, message: &OutboundMessage) -> WebSocketResult<()> {
        self.machine.ensure_open()?;
        let payload = message.encode()?;
        self.write_frame(WsFrame::text(payload)).await
    }

    async fn write_frame(&mut self, frame: WsFrame) -> WebSocketResult<()> {
        let Some(writer) = self.writer_ref.clone() else {
            return Err(WebSocketError::NotOpen {
                state: self.machine.state(),
            });
        };
        writer
            .ask(WriterWrite { frame })
            .await
            .map_err(writer_error)
    }

    /// Release every resource of the current handle. `close` is sent first when given.
    async fn teardown_connection(&mut self, close: Option<(u16, &'static str)>) {
        if let Some(task) = self.connect_task.take() {
            task.abort();
        }
        if let Some(writer) = self.writer_ref.take() {
            if let Some((code, reason)) = close {
                let result = writer
                    .ask(WriterClose {
                        code,
                        reason: reason.to_string(),
                    })
                    .await;
                if let Err(err) = result {
                    debug!(
                        connection = self.connection_label(),
                        error = %writer_error(err),
                        "close frame not delivered"
                    );
                }
            }
            let _ = writer.stop_gracefully().await;
        }
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(true);
        }
        if let Some(task) = self.reader_task.take() {
            task.abort();
        }
    }

    fn spawn_reader(&mut self, epoch: u64, mut reader: T::Reader) {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let actor_ref = self.actor_ref.clone();
        let connection = self.connection_label();

        self.shutdown_tx = Some(shutdown_tx);
        self.reader_task = Some(tokio::spawn(async move {
            loop {
                tokio::select! {
                    res = shutdown_rx.changed() => {
                        if res.is_err() || *shutdown_rx.borrow_and_update() { break; }
                    }
                    frame = reader.next() => {
                        let event = match frame {
                            Some(Ok(WsFrame::Text(bytes) | WsFrame::Binary(bytes))) => {
                                TransportEventKind::Inbound(bytes)
                            }
                            Some(Ok(WsFrame::Ping(_) | WsFrame::Pong(_))) => continue,
                            Some(Ok(WsFrame::Close(frame))) => {
                                info!(connection, epoch, close = ?frame, "received websocket close frame");
                                let (code, reason) = frame
                                    .map(|f| (Some(f.code), f.reason_lossy()))
                                    .unwrap_or((None, String::new()));
                                let _ = actor_ref
                                    .tell(TransportEvent { epoch, kind: TransportEventKind::Closed { code, reason } })
                                    .send()
                                    .await;
                                break;
                            }
                            Some(Err(err)) => {
                                let _ = actor_ref
                                    .tell(TransportEvent { epoch, kind: TransportEventKind::Error(err.to_string()) })
                                    .send()
                                    .await;
                                let _ = actor_ref
                                    .tell(TransportEvent {
                                        epoch,
                                        kind: TransportEventKind::Closed { code: None, reason: "read error".to_string() },
                                    })
                                    .send()
                                    .await;
                                break;
                            }
                            None => {
                                let _ = actor_ref
                                    .tell(TransportEvent {
                                        epoch,
                                        kind: TransportEventKind::Closed { code: None, reason: "stream ended".to_string() },
                                    })
                                    .send()
                                    .await;
                                break;
                            }
                        };
                        if actor_ref.tell(TransportEvent { epoch, kind: event }).send().await.is_err() {
                            break;
                        }
                    }
                }
            }
        }));
    }

    fn process_inbound(&mut self, payload: Bytes) {
        match self.router.dispatch(&payload) {
            DispatchOutcome::Delivered { message, series } => {
                if let InboundMessage::System(notice) = &message {
                    if let Some(ack) = notice.subscription_ack() {
                        debug!(
                            connection = self.connection_label(),
                            subscribed = ?ack,
                            "subscription acknowledged"
                        );
                    }
                }
                self.observer.notify(ClientEvent::Message(message));
                if let Some(update) = series {
                    self.observer.notify(ClientEvent::SampleRecorded {
                        series: update.series,
                        snapshot: update.snapshot,
                    });
                }
            }
            DispatchOutcome::Unrecognized { .. } => {}
            DispatchOutcome::Malformed { error } => {
                self.observer.notify(ClientEvent::DecodeError {
                    raw: payload,
                    error: error.to_string(),
                });
            }
        }
    }

    async fn on_transport_closed(&mut self, epoch: u64, code: Option<u16>, reason: String) {
        info!(
            connection = self.connection_label(),
            epoch,
            code,
            reason = %reason,
            "websocket transport closed"
        );
        self.observer
            .notify(ClientEvent::TransportClosed { code, reason });
        self.teardown_connection(None).await;
        let commands = self.machine.on_closed(epoch);
        self.execute(commands).await;
    }

    async fn apply_subscriptions(
        &mut self,
        metrics: BTreeSet<String>,
    ) -> WebSocketResult<SubscriptionSync> {
        if self.config.role != ClientRole::Telemetry {
            return Err(WebSocketError::InvalidState(
                "only telemetry clients manage subscriptions".to_string(),
            ));
        }

        if !self.config.retain_history_on_unsubscribe {
            for removed in self.subscriptions.difference(&metrics) {
                self.router.samples_mut().forget(removed);
            }
        }
        self.subscriptions = metrics;

        if self.machine.state() != ConnectionState::Open {
            debug!(
                connection = self.connection_label(),
                state = %self.machine.state(),
                "subscription change deferred until open"
            );
            return Ok(SubscriptionSync::Deferred);
        }

        let message = OutboundMessage::subscribe(self.subscriptions.iter().cloned());
        self.send_message(&message).await?;
        Ok(SubscriptionSync::Sent)
    }
}

fn writer_error<M>(err: SendError<M, WebSocketError>) -> WebSocketError {
    match err {
        SendError::HandlerError(err) => err,
        other => WebSocketError::ActorError(other.to_string()),
    }
}

// ---- internal events -------------------------------------------------------------------

pub(crate) struct ConnectionEstablished<T: WsTransport> {
    pub(crate) epoch: u64,
    pub(crate) reader: T::Reader,
    pub(crate) writer: T::Writer,
}

pub(crate) struct ConnectionFailed {
    pub(crate) epoch: u64,
    pub(crate) error: WebSocketError,
}

#[derive(Debug)]
pub(crate) enum TransportEventKind {
    Inbound(Bytes),
    Error(String),
    Closed { code: Option<u16>, reason: String },
}

#[derive(Debug)]
pub(crate) struct TransportEvent {
    pub(crate) epoch: u64,
    pub(crate) kind: TransportEventKind,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ReconnectDue {
    pub(crate) timer: TimerId,
}

impl<O, T> KameoMessage<ConnectionEstablished<T>> for StreamClientActor<O, T>
where
    O: ClientObserver,
    T: WsTransport,
{
    type Reply = ();

    async fn handle(
        &mut self,
        msg: ConnectionEstablished<T>,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        let ConnectionEstablished {
            epoch,
            reader,
            writer,
        } = msg;
        if !(self.machine.epoch() == epoch && self.machine.state() == ConnectionState::Connecting)
        {
            debug!(
                connection = self.connection_label(),
                epoch,
                current = self.machine.epoch(),
                "dropping superseded connection"
            );
            return;
        }

        info!(connection = self.connection_label(), epoch, "websocket connection established");
        self.connect_task = None;
        self.spawn_reader(epoch, reader);
        let writer_shutdown = self
            .shutdown_tx
            .as_ref()
            .map(watch::Sender::subscribe)
            .unwrap_or_else(|| watch::channel(false).1);
        self.writer_ref = Some(WsWriterActor::spawn(WsWriterActor::new(
            writer,
            writer_shutdown,
        )));

        let commands = self.machine.on_opened(epoch);
        self.execute(commands).await;
    }
}

impl<O, T> KameoMessage<ConnectionFailed> for StreamClientActor<O, T>
where
    O: ClientObserver,
    T: WsTransport,
{
    type Reply = ();

    async fn handle(
        &mut self,
        msg: ConnectionFailed,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        if !self.machine.is_current(msg.epoch) {
            return;
        }
        self.connect_task = None;
        warn!(
            connection = self.connection_label(),
            epoch = msg.epoch,
            attempt = self.machine.attempt(),
            error = %msg.error,
            "websocket connect failed"
        );
        self.observer.notify(ClientEvent::TransportError {
            error: msg.error.to_string(),
        });
        let commands = self.machine.on_closed(msg.epoch);
        self.execute(commands).await;
    }
}

impl<O, T> KameoMessage<TransportEvent> for StreamClientActor<O, T>
where
    O: ClientObserver,
    T: WsTransport,
{
    type Reply = ();

    async fn handle(
        &mut self,
        msg: TransportEvent,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        if !self.machine.is_current(msg.epoch) {
            debug!(
                connection = self.connection_label(),
                epoch = msg.epoch,
                current = self.machine.epoch(),
                "ignoring event from stale connection"
            );
            return;
        }
        match msg.kind {
            TransportEventKind::Inbound(payload) => self.process_inbound(payload),
            TransportEventKind::Error(error) => {
                warn!(
                    connection = self.connection_label(),
                    epoch = msg.epoch,
                    error = %error,
                    "websocket transport error"
                );
                self.observer.notify(ClientEvent::TransportError { error });
            }
            TransportEventKind::Closed { code, reason } => {
                self.on_transport_closed(msg.epoch, code, reason).await;
            }
        }
    }
}

impl<O, T> KameoMessage<ReconnectDue> for StreamClientActor<O, T>
where
    O: ClientObserver,
    T: WsTransport,
{
    type Reply = ();

    async fn handle(
        &mut self,
        msg: ReconnectDue,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        if matches!(self.reconnect_task, Some((timer, _)) if timer == msg.timer) {
            self.reconnect_task = None;
        }
        let commands = self.machine.on_reconnect_due(msg.timer);
        self.execute(commands).await;
    }
}

// ---- public requests -------------------------------------------------------------------

/// Begin connecting. A no-op while already connecting or open.
#[derive(Debug, Clone, Copy)]
pub struct Start;

/// Close the connection, cancel any pending reconnect and return to idle.
#[derive(Debug, Clone, Copy)]
pub struct Stop;

/// Stop followed by start, with a fresh attempt counter.
#[derive(Debug, Clone, Copy)]
pub struct Restart;

/// Send a frame on the open connection. Rejected, never queued, when not open.
#[derive(Debug, Clone)]
pub struct SendOutbound(pub OutboundMessage);

/// Replace the metric subscription set.
#[derive(Debug, Clone)]
pub struct UpdateSubscriptions(pub BTreeSet<String>);

/// Whether a subscription change reached the server yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionSync {
    Sent,
    /// Not open; the new set goes out with the next handshake.
    Deferred,
}

#[derive(Debug, Clone, Copy)]
pub struct GetConnectionState;

#[derive(Debug, Clone)]
pub struct GetSeriesSnapshot(pub String);

/// Min/max over a series' current window, `None` when empty.
#[derive(Debug, Clone)]
pub struct GetSeriesRange(pub String);

#[derive(Debug, Clone, Copy)]
pub struct GetSubscriptions;

impl<O, T> KameoMessage<Start> for StreamClientActor<O, T>
where
    O: ClientObserver,
    T: WsTransport,
{
    type Reply = WebSocketResult<()>;

    async fn handle(&mut self, _msg: Start, _ctx: &mut Context<Self, Self::Reply>) -> Self::Reply {
        let commands = self.machine.start();
        if commands.is_empty() {
            debug!(
                connection = self.connection_label(),
                state = %self.machine.state(),
                "start ignored; connection already active"
            );
        }
        self.execute(commands).await;
        Ok(())
    }
}

impl<O, T> KameoMessage<Stop> for StreamClientActor<O, T>
where
    O: ClientObserver,
    T: WsTransport,
{
    type Reply = WebSocketResult<()>;

    async fn handle(&mut self, _msg: Stop, _ctx: &mut Context<Self, Self::Reply>) -> Self::Reply {
        let commands = self.machine.stop();
        self.execute(commands).await;
        Ok(())
    }
}

impl<O, T> KameoMessage<Restart> for StreamClientActor<O, T>
where
    O: ClientObserver,
    T: WsTransport,
{
    type Reply = WebSocketResult<()>;

    async fn handle(
        &mut self,
        _msg: Restart,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        let commands = self.machine.stop();
        self.execute(commands).await;
        let commands = self.machine.start();
        self.execute(commands).await;
        Ok(())
    }
}

impl<O, T> KameoMessage<SendOutbound> for StreamClientActor<O, T>
where
    O: ClientObserver,
    T: WsTransport,
{
    type Reply = WebSocketResult<()>;

    async fn handle(
        &mut self,
        msg: SendOutbound,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        if let Err(err) = self.machine.ensure_open() {
            debug!(
                connection = self.connection_label(),
                state = %self.machine.state(),
                "outbound message rejected"
            );
            return Err(err);
        }
        self.send_message(&msg.0).await
    }
}

impl<O, T> KameoMessage<UpdateSubscriptions> for StreamClientActor<O, T>
where
    O: ClientObserver,
    T: WsTransport,
{
    type Reply = WebSocketResult<SubscriptionSync>;

    async fn handle(
        &mut self,
        msg: UpdateSubscriptions,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        self.apply_subscriptions(msg.0).await
    }
}

impl<O, T> KameoMessage<GetConnectionState> for StreamClientActor<O, T>
where
    O: ClientObserver,
    T: WsTransport,
{
    type Reply = WebSocketResult<ConnectionSnapshot>;

    async fn handle(
        &mut self,
        _msg: GetConnectionState,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        Ok(self.machine.snapshot())
    }
}

impl<O, T> KameoMessage<GetSeriesSnapshot> for StreamClientActor<O, T>
where
    O: ClientObserver,
    T: WsTransport,
{
    type Reply = WebSocketResult<Vec<Sample>>;

    async fn handle(
        &mut self,
        msg: GetSeriesSnapshot,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        Ok(self.router.samples().snapshot(&msg.0))
    }
}

impl<O, T> KameoMessage<GetSeriesRange> for StreamClientActor<O, T>
where
    O: ClientObserver,
    T: WsTransport,
{
    type Reply = WebSocketResult<Option<(f64, f64)>>;

    async fn handle(
        &mut self,
        msg: GetSeriesRange,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        Ok(self.router.samples().min_max(&msg.0))
    }
}

impl<O, T> KameoMessage<GetSubscriptions> for StreamClientActor<O, T>
where
    O: ClientObserver,
    T: WsTransport,
{
    type Reply = WebSocketResult<BTreeSet<String>>;

    async fn handle(
        &mut self,
        _msg: GetSubscriptions,
        _ctx: &mut Context<Self, Self::Reply>,
    ) -> Self::Reply {
        Ok(self.subscriptions.clone())
    }
}
