//! Relay wire-message types and parser.
//!
//! The relay sends JSON frames of the shape
//! `{"event": "<name>", "channel": "...", "data": ...}`. Protocol
//! events carry a `pusher:`/`pusher_internal:` prefix; everything else
//! is an application event published on a channel. The `data` field is
//! often double-encoded (a JSON string containing JSON); the parser
//! unwraps that one protocol layer and passes the payload through
//! otherwise untouched.

use serde::Deserialize;

/// Connection handshake confirmation from the relay.
pub const EVENT_CONNECTION_ESTABLISHED: &str = "pusher:connection_established";
/// Per-channel subscription confirmation.
pub const EVENT_SUBSCRIPTION_SUCCEEDED: &str = "pusher_internal:subscription_succeeded";
/// Keepalive probe; must be answered with a pong frame.
pub const EVENT_PING: &str = "pusher:ping";
/// Keepalive reply.
pub const EVENT_PONG: &str = "pusher:pong";
/// Protocol-level error report.
pub const EVENT_ERROR: &str = "pusher:error";

/// All relay messages the client handles.
#[derive(Debug, Clone)]
pub enum RelayMessage {
    /// The WebSocket handshake completed and the relay assigned a
    /// socket id.
    ConnectionEstablished {
        socket_id: String,
        /// Seconds of allowed inactivity before the relay pings.
        activity_timeout_secs: Option<u64>,
    },

    /// A subscribe frame was accepted for a channel.
    SubscriptionSucceeded { channel: String },

    /// Keepalive probe from the relay.
    Ping,

    /// Keepalive reply from the relay.
    Pong,

    /// Protocol-level error from the relay.
    ProtocolError {
        code: Option<i64>,
        message: String,
    },

    /// An application event published on a channel. The payload is
    /// whatever the backend published — not inspected or validated.
    ChannelEvent {
        channel: String,
        event: String,
        data: serde_json::Value,
    },
}

/// Errors from parsing a relay frame.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Malformed frame: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Frame is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Unknown protocol event: {0}")]
    UnknownEvent(String),
}

#[derive(Debug, Deserialize)]
struct RawFrame {
    event: String,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ConnectionEstablishedData {
    socket_id: String,
    #[serde(default)]
    activity_timeout: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ProtocolErrorData {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
}

/// Unwrap one layer of double-encoding: a `data` field holding a JSON
/// string that itself contains JSON. Non-string and non-JSON-string
/// values pass through unchanged.
fn decode_data(data: Option<serde_json::Value>) -> serde_json::Value {
    match data {
        Some(serde_json::Value::String(text)) => {
            serde_json::from_str(&text).unwrap_or(serde_json::Value::String(text))
        }
        Some(value) => value,
        None => serde_json::Value::Null,
    }
}

/// Parse a relay WebSocket text frame into a typed message.
///
/// Returns `Err` for malformed JSON, unknown protocol events, and
/// application events without a channel. Callers should log and
/// continue.
pub fn parse_message(text: &str) -> Result<RelayMessage, ParseError> {
    let frame: RawFrame = serde_json::from_str(text)?;

    match frame.event.as_str() {
        EVENT_CONNECTION_ESTABLISHED => {
            let data: ConnectionEstablishedData =
                serde_json::from_value(decode_data(frame.data))?;
            Ok(RelayMessage::ConnectionEstablished {
                socket_id: data.socket_id,
                activity_timeout_secs: data.activity_timeout,
            })
        }
        EVENT_SUBSCRIPTION_SUCCEEDED => {
            let channel = frame.channel.ok_or(ParseError::MissingField("channel"))?;
            Ok(RelayMessage::SubscriptionSucceeded { channel })
        }
        EVENT_PING => Ok(RelayMessage::Ping),
        EVENT_PONG => Ok(RelayMessage::Pong),
        EVENT_ERROR => {
            let data: ProtocolErrorData = serde_json::from_value(decode_data(frame.data))?;
            Ok(RelayMessage::ProtocolError {
                code: data.code,
                message: data.message.unwrap_or_else(|| "<no message>".to_string()),
            })
        }
        other if other.starts_with("pusher:") || other.starts_with("pusher_internal:") => {
            Err(ParseError::UnknownEvent(other.to_string()))
        }
        _ => {
            let channel = frame.channel.ok_or(ParseError::MissingField("channel"))?;
            Ok(RelayMessage::ChannelEvent {
                channel,
                event: frame.event,
                data: decode_data(frame.data),
            })
        }
    }
}

/// Client→relay frame requesting a channel subscription.
pub fn subscribe_frame(channel: &str) -> String {
    serde_json::json!({
        "event": "pusher:subscribe",
        "data": { "channel": channel },
    })
    .to_string()
}

/// Client→relay frame dropping a channel subscription.
pub fn unsubscribe_frame(channel: &str) -> String {
    serde_json::json!({
        "event": "pusher:unsubscribe",
        "data": { "channel": channel },
    })
    .to_string()
}

/// Keepalive reply to a [`RelayMessage::Ping`].
pub fn pong_frame() -> String {
    serde_json::json!({ "event": "pusher:pong", "data": {} }).to_string()
}
