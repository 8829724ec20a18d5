//! Resilient streaming websocket client for the realtime chat and telemetry endpoints.
//!
//! [`StreamClientActor`] owns the connection lifecycle and reconnects with bounded
//! exponential backoff. Inbound frames go through the [`MessageRouter`]; metric pushes
//! land in a rolling [`SampleBuffer`]. Presentation code observes everything through
//! [`ClientObserver`].

pub mod client;
pub mod config;
pub mod core;
pub mod observer;
pub mod protocol;
pub mod router;
pub mod testing;
pub mod tls;
pub mod transport;
pub mod ws;

pub use crate::config::{ClientConfig, ClientRole};
pub use crate::core::{
    BackoffPolicy, ConnectionSnapshot, ConnectionState, Sample, SampleBuffer, WebSocketError,
    WebSocketResult,
};
pub use crate::observer::{ClientEvent, ClientObserver};
pub use crate::protocol::{InboundMessage, OutboundMessage};
pub use crate::router::MessageRouter;
pub use crate::ws::{
    GetConnectionState, GetSeriesRange, GetSeriesSnapshot, GetSubscriptions, Restart,
    SendOutbound, Start, Stop, StreamClientActor, StreamClientArgs, SubscriptionSync,
    UpdateSubscriptions,
};
