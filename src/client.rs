//! Bare websocket stream wrapper.
//!
//! Used to stand up the peer side of a connection (loopback servers in tests and demos)
//! without exposing tungstenite types.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, accept_async_with_config as tungstenite_accept,
    connect_async_with_config as tungstenite_connect,
};

use crate::core::{WebSocketBufferConfig, WebSocketError, WsFrame};
use crate::tls::ensure_crypto_provider;
use crate::transport::tungstenite::{frame_to_msg, map_ws_error, msg_to_frame, websocket_config};

pub struct WsClient {
    inner: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsClient {
    pub async fn send(&mut self, msg: WsFrame) -> Result<(), WebSocketError> {
        self.inner
            .send(frame_to_msg(msg))
            .await
            .map_err(|e| map_ws_error("write", e))
    }

    pub async fn send_text(&mut self, text: impl Into<String>) -> Result<(), WebSocketError> {
        self.send(WsFrame::text(text)).await
    }

    pub async fn next(&mut self) -> Option<Result<WsFrame, WebSocketError>> {
        StreamExt::next(self).await
    }

    /// Next text payload, skipping control frames. `None` once the peer is gone.
    pub async fn next_text(&mut self) -> Option<String> {
        while let Some(Ok(frame)) = self.next().await {
            match frame {
                WsFrame::Text(bytes) => {
                    return Some(String::from_utf8_lossy(bytes.as_ref()).into_owned());
                }
                WsFrame::Close(_) => return None,
                _ => {}
            }
        }
        None
    }

    pub async fn close(&mut self, code: u16, reason: &str) -> Result<(), WebSocketError> {
        self.send(WsFrame::close(code, reason.to_string())).await
    }
}

impl Stream for WsClient {
    type Item = Result<WsFrame, WebSocketError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match Pin::new(&mut self.get_mut().inner).poll_next(cx) {
            Poll::Ready(Some(Ok(msg))) => Poll::Ready(Some(Ok(msg_to_frame(msg)))),
            Poll::Ready(Some(Err(err))) => Poll::Ready(Some(Err(map_ws_error("read", err)))),
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Sink<WsFrame> for WsClient {
    type Error = WebSocketError;

    fn poll_ready(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Pin::new(&mut self.get_mut().inner)
            .poll_ready(cx)
            .map_err(|e| map_ws_error("write", e))
    }

    fn start_send(self: Pin<&mut Self>, item: WsFrame) -> Result<(), Self::Error> {
        Pin::new(&mut self.get_mut().inner)
            .start_send(frame_to_msg(item))
            .map_err(|e| map_ws_error("write", e))
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Pin::new(&mut self.get_mut().inner)
            .poll_flush(cx)
            .map_err(|e| map_ws_error("write", e))
    }

    fn poll_close(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Pin::new(&mut self.get_mut().inner)
            .poll_close(cx)
            .map_err(|e| map_ws_error("write", e))
    }
}

/// Connect to a websocket URL with default buffer sizing.
pub async fn connect_async(url: impl AsRef<str>) -> Result<WsClient, WebSocketError> {
    ensure_crypto_provider();
    let config = websocket_config(WebSocketBufferConfig::default());
    let (stream, _) = tungstenite_connect(url.as_ref(), Some(config), false)
        .await
        .map_err(|err| WebSocketError::ConnectionFailed(err.to_string()))?;
    Ok(WsClient { inner: stream })
}

/// Accept an incoming websocket connection.
pub async fn accept_async(stream: TcpStream) -> Result<WsClient, WebSocketError> {
    let config = websocket_config(WebSocketBufferConfig::default());
    let ws = tungstenite_accept(MaybeTlsStream::Plain(stream), Some(config))
        .await
        .map_err(|err| WebSocketError::ConnectionFailed(err.to_string()))?;
    Ok(WsClient { inner: ws })
}
