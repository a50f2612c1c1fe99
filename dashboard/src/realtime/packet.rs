//! Socket.IO v4 text frames (Engine.IO v4 transport).
//!
//! Only what a listening client needs: handshake, heartbeat, events on the
//! default namespace. Binary attachments are not supported.

use serde::Deserialize;
use serde_json::Value;

use crate::errors::DashboardError;

/// Engine.IO handshake data
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenInfo {
    pub sid: String,
    #[serde(default)]
    pub ping_interval: u64,
    #[serde(default)]
    pub ping_timeout: u64,
}

/// A decoded frame
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Open(OpenInfo),
    Close,
    Ping,
    Pong,
    Noop,
    /// Namespace connection acknowledged
    Connected,
    /// Server closed the namespace
    Disconnected,
    ConnectError(String),
    Event { name: String, payload: Value },
    /// Frames a listener does not act on (acks, binary, upgrades)
    Ignored,
}

/// Client frame answering a server ping
pub const PONG: &str = "3";

/// Client frame joining the default namespace
pub const CONNECT: &str = "40";

/// Client frame leaving the default namespace
pub const DISCONNECT: &str = "41";

/// Decode one Engine.IO text frame
pub fn decode(frame: &str) -> Result<Packet, DashboardError> {
    let mut chars = frame.chars();
    let kind = chars
        .next()
        .ok_or_else(|| DashboardError::RealtimeError("Empty frame".to_string()))?;
    let rest = chars.as_str();

    match kind {
        '0' => {
            let info = serde_json::from_str(rest)
                .map_err(|e| DashboardError::RealtimeError(format!("Bad open packet: {}", e)))?;
            Ok(Packet::Open(info))
        }
        '1' => Ok(Packet::Close),
        '2' => Ok(Packet::Ping),
        '3' => Ok(Packet::Pong),
        '4' => decode_message(rest),
        '5' => Ok(Packet::Ignored),
        '6' => Ok(Packet::Noop),
        other => Err(DashboardError::RealtimeError(format!(
            "Unknown frame type '{}'",
            other
        ))),
    }
}

fn decode_message(message: &str) -> Result<Packet, DashboardError> {
    let mut chars = message.chars();
    let kind = chars
        .next()
        .ok_or_else(|| DashboardError::RealtimeError("Empty message".to_string()))?;
    let body = match default_namespace(chars.as_str()) {
        Some(body) => body,
        None => return Ok(Packet::Ignored),
    };

    match kind {
        '0' => Ok(Packet::Connected),
        '1' => Ok(Packet::Disconnected),
        '2' => decode_event(body),
        '4' => {
            let reason = serde_json::from_str::<Value>(body)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| body.to_string());
            Ok(Packet::ConnectError(reason))
        }
        _ => Ok(Packet::Ignored),
    }
}

/// Body of a default namespace message; `None` for `/admin,` style prefixes
fn default_namespace(body: &str) -> Option<&str> {
    if !body.starts_with('/') {
        return Some(body);
    }
    let (namespace, rest) = match body.find(',') {
        Some(idx) => (&body[..idx], &body[idx + 1..]),
        None => (body, ""),
    };
    (namespace == "/").then_some(rest)
}

fn decode_event(body: &str) -> Result<Packet, DashboardError> {
    // Optional ack id before the argument array
    let args = body.trim_start_matches(|c: char| c.is_ascii_digit());
    let mut values: Vec<Value> = serde_json::from_str(args)
        .map_err(|e| DashboardError::RealtimeError(format!("Bad event packet: {}", e)))?;

    if values.is_empty() {
        return Err(DashboardError::RealtimeError(
            "Event packet without a name".to_string(),
        ));
    }
    let name = match values.remove(0) {
        Value::String(name) => name,
        other => {
            return Err(DashboardError::RealtimeError(format!(
                "Event name is not a string: {}",
                other
            )))
        }
    };
    let payload = if values.is_empty() {
        Value::Null
    } else {
        values.remove(0)
    };

    Ok(Packet::Event { name, payload })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_handshake() {
        let packet = decode(r#"0{"sid":"abc","upgrades":[],"pingInterval":25000,"pingTimeout":20000}"#)
            .unwrap();
        assert_eq!(
            packet,
            Packet::Open(OpenInfo {
                sid: "abc".to_string(),
                ping_interval: 25000,
                ping_timeout: 20000,
            })
        );
        assert_eq!(decode(r#"40{"sid":"xyz"}"#).unwrap(), Packet::Connected);
        assert_eq!(decode("2").unwrap(), Packet::Ping);
        assert_eq!(decode("41").unwrap(), Packet::Disconnected);
    }

    #[test]
    fn test_decode_event() {
        let packet = decode(r#"42["logs:7",{"timestamp":"2024-01-01T00:00:00Z","message":"Cloning repo"}]"#)
            .unwrap();
        assert_eq!(
            packet,
            Packet::Event {
                name: "logs:7".to_string(),
                payload: json!({"timestamp":"2024-01-01T00:00:00Z","message":"Cloning repo"}),
            }
        );
    }

    #[test]
    fn test_decode_event_with_ack() {
        let packet = decode(r#"4212["status:1",{"status":"failed"}]"#).unwrap();
        assert_eq!(
            packet,
            Packet::Event {
                name: "status:1".to_string(),
                payload: json!({"status":"failed"}),
            }
        );

        let packet = decode(r#"42["ping-only"]"#).unwrap();
        assert_eq!(
            packet,
            Packet::Event {
                name: "ping-only".to_string(),
                payload: Value::Null,
            }
        );
    }

    #[test]
    fn test_other_namespaces_are_ignored() {
        assert_eq!(
            decode(r#"42/admin,["logs:1",{"message":"hidden"}]"#).unwrap(),
            Packet::Ignored
        );
        assert_eq!(decode("41/admin,").unwrap(), Packet::Ignored);
        assert_eq!(decode("40/admin,").unwrap(), Packet::Ignored);

        // An explicit `/` prefix is still the default namespace
        assert_eq!(
            decode(r#"42/,["logs:1",{"message":"shown"}]"#).unwrap(),
            Packet::Event {
                name: "logs:1".to_string(),
                payload: json!({"message": "shown"}),
            }
        );
    }

    #[test]
    fn test_decode_errors() {
        assert!(decode("").is_err());
        assert!(decode("42not-json").is_err());
        assert!(decode("42[]").is_err());
        assert!(decode("9").is_err());
        assert_eq!(
            decode(r#"44{"message":"Not authorized"}"#).unwrap(),
            Packet::ConnectError("Not authorized".to_string())
        );
    }
}
