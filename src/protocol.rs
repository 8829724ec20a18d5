//! JSON wire protocol spoken with the chat and dashboard endpoints.
//!
//! Every frame is a JSON object with a `"type"` discriminant:
//!
//! ## Server -> client ([`InboundMessage`])
//!
//! - `chat`: `name`, `text`, `ts`
//! - `system`: `text`, optional `online_count`, `ts`, `subscribed`
//! - `error`: `text`, optional `ts`
//! - `metric`: `metric`, `value`, `ts`
//!
//! Any other tag decodes to [`InboundMessage::Unrecognized`] so newer servers can add
//! message types without breaking older clients.
//!
//! ## Client -> server ([`OutboundMessage`])
//!
//! - `chat`: `name`, `text`, `ts`
//! - `subscribe`: `metrics`

use std::collections::BTreeSet;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::core::{WebSocketError, WebSocketResult};

/// A chat line, identical in both directions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub name: String,
    pub text: String,
    /// Unix epoch milliseconds.
    pub ts: i64,
}

/// Server notice (joins, welcomes, subscription confirmations).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SystemNotice {
    pub text: String,
    #[serde(default)]
    pub online_count: Option<u64>,
    #[serde(default)]
    pub ts: Option<i64>,
    #[serde(default)]
    pub subscribed: Option<Vec<String>>,
}

impl SystemNotice {
    /// Series the server confirmed, when this notice acknowledges a subscription.
    pub fn subscription_ack(&self) -> Option<&[String]> {
        self.subscribed.as_deref()
    }
}

/// Error reported by the server for a previous client frame.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerError {
    pub text: String,
    #[serde(default)]
    pub ts: Option<i64>,
}

/// One pushed value of a metric series.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MetricUpdate {
    pub metric: String,
    pub value: f64,
    pub ts: i64,
}

/// Decoded server frame.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    Chat(ChatMessage),
    System(SystemNotice),
    Error(ServerError),
    Metric(MetricUpdate),
    /// Well-formed frame with a tag this client does not know.
    Unrecognized { kind: String },
}

/// Discriminant of an [`InboundMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InboundKind {
    Chat,
    System,
    Error,
    Metric,
    Unrecognized,
}

impl InboundMessage {
    pub fn kind(&self) -> InboundKind {
        match self {
            InboundMessage::Chat(_) => InboundKind::Chat,
            InboundMessage::System(_) => InboundKind::System,
            InboundMessage::Error(_) => InboundKind::Error,
            InboundMessage::Metric(_) => InboundKind::Metric,
            InboundMessage::Unrecognized { .. } => InboundKind::Unrecognized,
        }
    }
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
}

/// Decode a server frame.
///
/// Payloads that are not JSON objects, lack a string `type`, or lack the fields required
/// by a known type fail with [`WebSocketError::ParseFailed`].
pub fn decode_inbound(payload: &[u8]) -> WebSocketResult<InboundMessage> {
    // serde would happily read a struct out of a JSON array; frames must be objects.
    if payload.iter().find(|b| !b.is_ascii_whitespace()) != Some(&b'{') {
        return Err(WebSocketError::ParseFailed(
            "expected a JSON object".to_string(),
        ));
    }
    let envelope: Envelope = sonic_rs::from_slice(payload).map_err(parse_error)?;
    let message = match envelope.kind.as_str() {
        "chat" => InboundMessage::Chat(sonic_rs::from_slice(payload).map_err(parse_error)?),
        "system" => InboundMessage::System(sonic_rs::from_slice(payload).map_err(parse_error)?),
        "error" => InboundMessage::Error(sonic_rs::from_slice(payload).map_err(parse_error)?),
        "metric" => InboundMessage::Metric(sonic_rs::from_slice(payload).map_err(parse_error)?),
        _ => InboundMessage::Unrecognized {
            kind: envelope.kind,
        },
    };
    Ok(message)
}

fn parse_error(err: sonic_rs::Error) -> WebSocketError {
    WebSocketError::ParseFailed(err.to_string())
}

/// Client frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundMessage {
    Chat(ChatMessage),
    Subscribe { metrics: BTreeSet<String> },
}

impl OutboundMessage {
    /// Compose a chat line stamped with the current time.
    ///
    /// Both fields are trimmed; an empty name or text is rejected.
    pub fn chat(name: &str, text: &str) -> WebSocketResult<Self> {
        let name = name.trim();
        let text = text.trim();
        if name.is_empty() {
            return Err(WebSocketError::InvalidMessage(
                "chat name must not be empty".to_string(),
            ));
        }
        if text.is_empty() {
            return Err(WebSocketError::InvalidMessage(
                "chat text must not be empty".to_string(),
            ));
        }
        Ok(OutboundMessage::Chat(ChatMessage {
            name: name.to_string(),
            text: text.to_string(),
            ts: now_epoch_ms(),
        }))
    }

    pub fn subscribe<I, S>(metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        OutboundMessage::Subscribe {
            metrics: metrics.into_iter().map(Into::into).collect(),
        }
    }

    pub fn encode(&self) -> WebSocketResult<String> {
        sonic_rs::to_string(self).map_err(|err| WebSocketError::EncodeFailed(err.to_string()))
    }
}

/// Best-effort current time as Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis().min(i64::MAX as u128) as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_chat() {
        let msg = decode_inbound(br#"{"type":"chat","name":"An","text":"hi","ts":1700000000000}"#)
            .unwrap();
        assert_eq!(
            msg,
            InboundMessage::Chat(ChatMessage {
                name: "An".to_string(),
                text: "hi".to_string(),
                ts: 1_700_000_000_000,
            })
        );
    }

    #[test]
    fn decodes_system_with_optional_fields() {
        let msg = decode_inbound(br#"{"type":"system","text":"welcome","online_count":3}"#)
            .unwrap();
        let InboundMessage::System(notice) = msg else {
            panic!("expected system notice");
        };
        assert_eq!(notice.online_count, Some(3));
        assert_eq!(notice.subscription_ack(), None);

        let msg = decode_inbound(
            br#"{"type":"system","text":"ok","ts":5,"subscribed":["cpu","stock"]}"#,
        )
        .unwrap();
        let InboundMessage::System(notice) = msg else {
            panic!("expected system notice");
        };
        assert_eq!(
            notice.subscription_ack(),
            Some(&["cpu".to_string(), "stock".to_string()][..])
        );
        assert_eq!(notice.online_count, None);
    }

    #[test]
    fn decodes_metric_with_integer_value() {
        let msg = decode_inbound(br#"{"type":"metric","metric":"cpu","value":42,"ts":1000}"#)
            .unwrap();
        assert_eq!(
            msg,
            InboundMessage::Metric(MetricUpdate {
                metric: "cpu".to_string(),
                value: 42.0,
                ts: 1000,
            })
        );
    }

    #[test]
    fn unknown_type_is_unrecognized_not_an_error() {
        let msg = decode_inbound(br#"{"type":"ping","nonce":7}"#).unwrap();
        assert_eq!(
            msg,
            InboundMessage::Unrecognized {
                kind: "ping".to_string()
            }
        );
        assert_eq!(msg.kind(), InboundKind::Unrecognized);
    }

    #[test]
    fn malformed_payloads_fail() {
        let payloads: &[&[u8]] = &[
            b"not json",
            br#"["chat"]"#,
            br#"["ping"]"#,
            br#"{"type":5}"#,
            br#"{"text":"no type"}"#,
            br#"{"type":"metric","metric":"cpu","ts":1}"#,
            br#"{"type":"error"}"#,
        ];
        for payload in payloads {
            assert!(
                matches!(decode_inbound(payload), Err(WebSocketError::ParseFailed(_))),
                "payload should fail: {}",
                String::from_utf8_lossy(payload)
            );
        }
    }

    #[test]
    fn encodes_subscribe_sorted() {
        let msg = OutboundMessage::subscribe(["stock", "cpu", "stock"]);
        assert_eq!(
            msg.encode().unwrap(),
            r#"{"type":"subscribe","metrics":["cpu","stock"]}"#
        );
    }

    #[test]
    fn encodes_chat_flat() {
        let msg = OutboundMessage::Chat(ChatMessage {
            name: "An".to_string(),
            text: "hello".to_string(),
            ts: 12,
        });
        assert_eq!(
            msg.encode().unwrap(),
            r#"{"type":"chat","name":"An","text":"hello","ts":12}"#
        );
    }

    #[test]
    fn chat_trims_and_validates() {
        let OutboundMessage::Chat(chat) = OutboundMessage::chat("  An ", " hi  ").unwrap() else {
            panic!("expected chat");
        };
        assert_eq!(chat.name, "An");
        assert_eq!(chat.text, "hi");
        assert!(chat.ts > 0);

        assert!(matches!(
            OutboundMessage::chat("   ", "hi"),
            Err(WebSocketError::InvalidMessage(_))
        ));
        assert!(matches!(
            OutboundMessage::chat("An", ""),
            Err(WebSocketError::InvalidMessage(_))
        ));
    }
}
