//! Notifications emitted to the presentation layer.

use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::core::{ConnectionState, Sample};
use crate::protocol::InboundMessage;

/// Everything the client reports to its collaborator.
///
/// Failures travel through here (or through reply values); the client never panics across
/// this boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    StateChanged {
        state: ConnectionState,
        attempt: u32,
    },
    Message(InboundMessage),
    /// An inbound payload could not be decoded. The connection stays up.
    DecodeError {
        raw: Bytes,
        error: String,
    },
    SampleRecorded {
        series: String,
        snapshot: Vec<Sample>,
    },
    /// A reconnect was scheduled; `attempt` counts from 1.
    ReconnectScheduled {
        attempt: u32,
        max_attempts: u32,
        delay: Duration,
    },
    /// Automatic recovery stopped. Only an explicit start resumes it.
    RecoveryExhausted {
        attempts: u32,
    },
    TransportError {
        error: String,
    },
    TransportClosed {
        code: Option<u16>,
        reason: String,
    },
}

/// Receiver of [`ClientEvent`]s.
///
/// Called from inside the client actor, so implementations must not block.
pub trait ClientObserver: Send + 'static {
    fn notify(&mut self, event: ClientEvent);
}

impl ClientObserver for mpsc::UnboundedSender<ClientEvent> {
    fn notify(&mut self, event: ClientEvent) {
        // A dropped receiver just means nobody is listening any more.
        let _ = self.send(event);
    }
}

/// Adapter turning a closure into a [`ClientObserver`].
pub struct FnObserver<F>(pub F);

impl<F> ClientObserver for FnObserver<F>
where
    F: FnMut(ClientEvent) + Send + 'static,
{
    fn notify(&mut self, event: ClientEvent) {
        (self.0)(event)
    }
}
