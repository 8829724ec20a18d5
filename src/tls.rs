//! Scheme handling for endpoint URLs: plain `ws://` skips TLS setup entirely, `wss://` goes
//! through rustls with the ring provider.

use std::sync::OnceLock;

use tokio_tungstenite::Connector;

use crate::core::{WebSocketError, WebSocketResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointScheme {
    Plain,
    Secure,
}

impl EndpointScheme {
    pub fn parse(url: &str) -> WebSocketResult<Self> {
        if url.starts_with("ws://") {
            Ok(Self::Plain)
        } else if url.starts_with("wss://") {
            Ok(Self::Secure)
        } else {
            Err(WebSocketError::ConnectionFailed(format!(
                "unsupported url scheme: {url}"
            )))
        }
    }

    /// Connector to hand to tungstenite. `None` lets it build a webpki-rooted rustls config.
    pub fn connector(self) -> Option<Connector> {
        match self {
            Self::Plain => Some(Connector::Plain),
            Self::Secure => {
                ensure_crypto_provider();
                None
            }
        }
    }
}

/// rustls 0.23 panics on first use when more than one provider is compiled in and none was
/// installed, so pick ring once per process.
pub fn ensure_crypto_provider() {
    static INSTALLED: OnceLock<()> = OnceLock::new();
    INSTALLED.get_or_init(|| {
        // Err means another component already chose a provider.
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}
