//! In-memory transport for exercising the client without sockets.
//!
//! Every `connect` made through [`MockTransport`] surfaces on the paired [`MockServer`] as
//! a [`PendingConnect`] that the test accepts or refuses. Accepted connections are driven
//! through [`MockConnection`]: read what the client wrote, push frames or read errors,
//! close or drop.

use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use futures_util::Sink;
use tokio::sync::{mpsc, oneshot};

use crate::core::{WebSocketBufferConfig, WebSocketError, WsFrame, frame_bytes, into_ws_frame};
use crate::transport::{WsTransport, WsTransportConnectFuture};

type ConnectResult = Result<(MockReader, MockWriter), WebSocketError>;

#[derive(Clone)]
pub struct MockTransport {
    connects: mpsc::UnboundedSender<PendingConnect>,
}

impl MockTransport {
    /// Build a transport + server control pair.
    pub fn channel_pair() -> (Self, MockServer) {
        let (connects, connects_rx) = mpsc::unbounded_channel();
        (
            Self { connects },
            MockServer {
                connects: connects_rx,
            },
        )
    }
}

impl WsTransport for MockTransport {
    type Reader = MockReader;
    type Writer = MockWriter;

    fn connect(
        &self,
        url: String,
        _buffers: WebSocketBufferConfig,
    ) -> WsTransportConnectFuture<Self::Reader, Self::Writer> {
        let connects = self.connects.clone();
        Box::pin(async move {
            let (reply, outcome) = oneshot::channel();
            connects
                .send(PendingConnect { url, reply })
                .map_err(|_| WebSocketError::ConnectionFailed("mock server gone".to_string()))?;
            outcome.await.map_err(|_| {
                WebSocketError::ConnectionFailed("mock connect abandoned".to_string())
            })?
        })
    }
}

/// Server-side test handle paired with [`MockTransport`].
pub struct MockServer {
    connects: mpsc::UnboundedReceiver<PendingConnect>,
}

impl MockServer {
    /// Wait for the client's next connect attempt.
    pub async fn next_connect(&mut self) -> Option<PendingConnect> {
        self.connects.recv().await
    }

    pub async fn next_connect_timeout(&mut self, timeout: Duration) -> Option<PendingConnect> {
        tokio::time::timeout(timeout, self.connects.recv())
            .await
            .unwrap_or_default()
    }

    /// Accept the next connect attempt.
    pub async fn accept_next(&mut self, timeout: Duration) -> Option<MockConnection> {
        self.next_connect_timeout(timeout)
            .await
            .map(PendingConnect::accept)
    }

    /// Refuse the next connect attempt.
    pub async fn refuse_next(&mut self, timeout: Duration) -> bool {
        match self.next_connect_timeout(timeout).await {
            Some(pending) => {
                pending.refuse("connection refused");
                true
            }
            None => false,
        }
    }
}

/// A connect attempt waiting for the test's verdict.
pub struct PendingConnect {
    url: String,
    reply: oneshot::Sender<ConnectResult>,
}

impl PendingConnect {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn accept(self) -> MockConnection {
        let (sent_tx, sent_rx) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        // The client may have given up on this attempt already; the connection is then inert.
        let _ = self.reply.send(Ok((
            MockReader { rx: inbound_rx },
            MockWriter { sent_tx },
        )));
        MockConnection {
            outbound_rx: sent_rx,
            inbound_tx: Some(inbound_tx),
        }
    }

    pub fn refuse(self, reason: impl Into<String>) {
        let _ = self
            .reply
            .send(Err(WebSocketError::ConnectionFailed(reason.into())));
    }
}

/// Error surface for operations on [`MockConnection`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum MockServerError {
    /// The inbound socket side was intentionally dropped.
    SocketDropped,
    /// The client side is no longer reading.
    ChannelClosed,
}

impl std::fmt::Display for MockServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MockServerError::SocketDropped => f.write_str("mock socket already dropped"),
            MockServerError::ChannelClosed => f.write_str("mock client channel is closed"),
        }
    }
}

impl std::error::Error for MockServerError {}

/// Server side of one accepted connection.
pub struct MockConnection {
    outbound_rx: mpsc::UnboundedReceiver<WsFrame>,
    inbound_tx: Option<mpsc::UnboundedSender<Result<WsFrame, WebSocketError>>>,
}

impl MockConnection {
    /// Receive a frame written by the client.
    pub async fn recv_outbound(&mut self) -> Option<WsFrame> {
        self.outbound_rx.recv().await
    }

    pub async fn recv_outbound_timeout(&mut self, timeout: Duration) -> Option<WsFrame> {
        tokio::time::timeout(timeout, self.outbound_rx.recv())
            .await
            .unwrap_or_default()
    }

    /// Next client frame as UTF-8 text, if one arrives in time.
    pub async fn recv_text_timeout(&mut self, timeout: Duration) -> Option<String> {
        let frame = self.recv_outbound_timeout(timeout).await?;
        frame_bytes(&frame).map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    fn push(&self, item: Result<WsFrame, WebSocketError>) -> Result<(), MockServerError> {
        let Some(tx) = self.inbound_tx.as_ref() else {
            return Err(MockServerError::SocketDropped);
        };
        tx.send(item).map_err(|_| MockServerError::ChannelClosed)
    }

    pub fn send_frame(&self, frame: WsFrame) -> Result<(), MockServerError> {
        self.push(Ok(frame))
    }

    /// Push a raw payload; valid UTF-8 goes out as a text frame, anything else as binary.
    pub fn send_payload(&self, payload: impl Into<Bytes>) -> Result<(), MockServerError> {
        self.send_frame(into_ws_frame(payload))
    }

    pub fn send_text(&self, text: impl Into<String>) -> Result<(), MockServerError> {
        self.send_payload(text.into())
    }

    /// Make the client's next read fail, as a reset socket would.
    pub fn inject_error(&self, error: impl Into<String>) -> Result<(), MockServerError> {
        self.push(Err(WebSocketError::TransportError {
            context: "mock_transport_read",
            error: error.into(),
        }))
    }

    /// Send a close frame and hang up.
    pub fn close(&mut self, code: u16, reason: &str) -> Result<(), MockServerError> {
        let result = self.send_frame(WsFrame::close(code, reason.to_string()));
        self.inbound_tx = None;
        result
    }

    /// Simulate an abrupt socket drop: the client's stream just ends.
    pub fn drop_socket(&mut self) {
        self.inbound_tx = None;
    }
}

/// Reader side for [`MockTransport`].
pub struct MockReader {
    rx: mpsc::UnboundedReceiver<Result<WsFrame, WebSocketError>>,
}

impl futures_util::Stream for MockReader {
    type Item = Result<WsFrame, WebSocketError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

/// Writer side for [`MockTransport`].
pub struct MockWriter {
    sent_tx: mpsc::UnboundedSender<WsFrame>,
}

impl Sink<WsFrame> for MockWriter {
    type Error = WebSocketError;

    fn poll_ready(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn start_send(self: Pin<&mut Self>, item: WsFrame) -> Result<(), Self::Error> {
        self.get_mut()
            .sent_tx
            .send(item)
            .map_err(|_| WebSocketError::TransportError {
                context: "mock_transport_write",
                error: "mock outbound channel closed".to_string(),
            })
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }
}
