use std::collections::BTreeSet;

use crate::core::{BackoffPolicy, DEFAULT_SERIES_CAPACITY, WebSocketBufferConfig, WebSocketResult};
use crate::tls::EndpointScheme;

/// Environment variable overriding the server base URL.
pub const SERVER_URL_ENV: &str = "REALTIME_WS_URL";
pub const DEFAULT_SERVER_URL: &str = "ws://localhost:8765";

/// Series a telemetry client subscribes to unless told otherwise.
pub const DEFAULT_METRICS: [&str; 3] = ["temperature", "stock", "cpu"];

/// Which endpoint a client talks to, and what it sends once connected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientRole {
    /// Chat room. No handshake.
    Chat,
    /// Metric dashboard. Declares its subscriptions on every open.
    Telemetry,
}

impl ClientRole {
    pub fn path(self) -> &'static str {
        match self {
            ClientRole::Chat => "/ws/chat",
            ClientRole::Telemetry => "/ws/dashboard",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ClientRole::Chat => "chat",
            ClientRole::Telemetry => "telemetry",
        }
    }

    pub fn sends_handshake(self) -> bool {
        matches!(self, ClientRole::Telemetry)
    }
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Scheme, host and port, e.g. `ws://localhost:8765`.
    pub server_url: String,
    pub role: ClientRole,
    pub backoff: BackoffPolicy,
    /// Per-series capacity of the rolling sample buffer.
    pub sample_capacity: usize,
    /// Keep a series' history after it leaves the subscription set.
    pub retain_history_on_unsubscribe: bool,
    pub buffers: WebSocketBufferConfig,
}

impl ClientConfig {
    pub fn new(server_url: impl Into<String>, role: ClientRole) -> Self {
        Self {
            server_url: server_url.into(),
            role,
            backoff: BackoffPolicy::default(),
            sample_capacity: DEFAULT_SERIES_CAPACITY,
            retain_history_on_unsubscribe: true,
            buffers: WebSocketBufferConfig::default(),
        }
    }

    pub fn chat(server_url: impl Into<String>) -> Self {
        Self::new(server_url, ClientRole::Chat)
    }

    pub fn telemetry(server_url: impl Into<String>) -> Self {
        Self::new(server_url, ClientRole::Telemetry)
    }

    /// Build a config for `role`, taking the server URL from `REALTIME_WS_URL` when set.
    pub fn from_env(role: ClientRole) -> Self {
        let server_url = std::env::var(SERVER_URL_ENV)
            .ok()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
        Self::new(server_url, role)
    }

    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_sample_capacity(mut self, capacity: usize) -> Self {
        self.sample_capacity = capacity;
        self
    }

    pub fn with_retain_history_on_unsubscribe(mut self, retain: bool) -> Self {
        self.retain_history_on_unsubscribe = retain;
        self
    }

    /// Full websocket URL for the configured role.
    pub fn endpoint_url(&self) -> WebSocketResult<String> {
        let base = self.server_url.trim_end_matches('/');
        EndpointScheme::parse(base)?;
        Ok(format!("{base}{}", self.role.path()))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::chat(DEFAULT_SERVER_URL)
    }
}

pub fn default_subscriptions() -> BTreeSet<String> {
    DEFAULT_METRICS.iter().map(|m| m.to_string()).collect()
}
