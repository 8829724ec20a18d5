//! Inbound message dispatch.
//!
//! The router decodes each data frame, feeds metric pushes into the sample sink and then
//! invokes the handler registered for the decoded variant. Handler failures are logged
//! and counted; they never poison later dispatches.

use tracing::{debug, warn};

use crate::core::{Sample, SampleBuffer, SampleSink, WebSocketError};
use crate::protocol::{
    ChatMessage, InboundMessage, MetricUpdate, ServerError, SystemNotice, decode_inbound,
};

/// Error type handlers may return.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;
pub type HandlerResult = Result<(), HandlerError>;

type Handler<T> = Box<dyn FnMut(&T) -> HandlerResult + Send>;

/// Series touched by a metric push, with its contents after recording.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesUpdate {
    pub series: String,
    pub snapshot: Vec<Sample>,
}

/// Result of dispatching one inbound payload.
#[derive(Debug)]
pub enum DispatchOutcome {
    Delivered {
        message: InboundMessage,
        series: Option<SeriesUpdate>,
    },
    /// Decoded fine but carries a tag this client does not handle.
    Unrecognized { kind: String },
    /// Payload could not be decoded; the connection stays up.
    Malformed { error: WebSocketError },
}

pub struct MessageRouter<S: SampleSink = SampleBuffer> {
    samples: S,
    on_chat: Option<Handler<ChatMessage>>,
    on_system: Option<Handler<SystemNotice>>,
    on_error: Option<Handler<ServerError>>,
    on_metric: Option<Handler<MetricUpdate>>,
    handler_failures: u64,
}

impl MessageRouter<SampleBuffer> {
    /// Router backed by a [`SampleBuffer`] of the given per-series capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::new(SampleBuffer::new(capacity))
    }
}

impl Default for MessageRouter<SampleBuffer> {
    fn default() -> Self {
        Self::new(SampleBuffer::default())
    }
}

impl<S: SampleSink> MessageRouter<S> {
    pub fn new(samples: S) -> Self {
        Self {
            samples,
            on_chat: None,
            on_system: None,
            on_error: None,
            on_metric: None,
            handler_failures: 0,
        }
    }

    pub fn on_chat(mut self, handler: impl FnMut(&ChatMessage) -> HandlerResult + Send + 'static) -> Self {
        self.on_chat = Some(Box::new(handler));
        self
    }

    pub fn on_system(mut self, handler: impl FnMut(&SystemNotice) -> HandlerResult + Send + 'static) -> Self {
        self.on_system = Some(Box::new(handler));
        self
    }

    pub fn on_error(mut self, handler: impl FnMut(&ServerError) -> HandlerResult + Send + 'static) -> Self {
        self.on_error = Some(Box::new(handler));
        self
    }

    pub fn on_metric(mut self, handler: impl FnMut(&MetricUpdate) -> HandlerResult + Send + 'static) -> Self {
        self.on_metric = Some(Box::new(handler));
        self
    }

    pub fn samples(&self) -> &S {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut S {
        &mut self.samples
    }

    /// Number of handler invocations that returned an error.
    pub fn handler_failures(&self) -> u64 {
        self.handler_failures
    }

    pub fn dispatch(&mut self, payload: &[u8]) -> DispatchOutcome {
        let message = match decode_inbound(payload) {
            Ok(message) => message,
            Err(error) => {
                warn!(
                    error = %error,
                    payload_len = payload.len(),
                    "failed to decode inbound message"
                );
                return DispatchOutcome::Malformed { error };
            }
        };

        let mut series = None;
        let result = match &message {
            InboundMessage::Chat(chat) => invoke(&mut self.on_chat, chat),
            InboundMessage::System(notice) => invoke(&mut self.on_system, notice),
            InboundMessage::Error(error) => invoke(&mut self.on_error, error),
            InboundMessage::Metric(update) => {
                self.samples.record(&update.metric, update.value, update.ts);
                series = Some(SeriesUpdate {
                    series: update.metric.clone(),
                    snapshot: self.samples.snapshot(&update.metric),
                });
                invoke(&mut self.on_metric, update)
            }
            InboundMessage::Unrecognized { kind } => {
                debug!(kind = %kind, "ignoring unrecognized message type");
                return DispatchOutcome::Unrecognized { kind: kind.clone() };
            }
        };

        if let Err(err) = result {
            self.handler_failures = self.handler_failures.saturating_add(1);
            warn!(
                kind = ?message.kind(),
                error = %err,
                failures = self.handler_failures,
                "message handler failed"
            );
        }

        DispatchOutcome::Delivered { message, series }
    }
}

fn invoke<T>(handler: &mut Option<Handler<T>>, value: &T) -> HandlerResult {
    match handler.as_mut() {
        Some(handler) => handler(value),
        None => Ok(()),
    }
}
