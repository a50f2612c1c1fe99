//! Events received on the realtime channels

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One log line of a live session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    /// Source timestamp; not guaranteed to be monotonic
    #[serde(default, deserialize_with = "openapi_client::lenient::opt_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,

    #[serde(default)]
    pub message: String,
}

impl LogEvent {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            timestamp: Some(Utc::now()),
            message: message.into(),
        }
    }

    /// Decode a channel payload; bare strings are taken as the message
    pub fn from_payload(payload: Value) -> Self {
        match payload {
            Value::String(message) => Self {
                timestamp: None,
                message,
            },
            other => serde_json::from_value(other.clone()).unwrap_or_else(|_| Self {
                timestamp: None,
                message: other.to_string(),
            }),
        }
    }
}

/// Terminal outcome of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Success,
    Failed,
    /// No terminal status arrived in time
    TimedOut,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failed => "failed",
            Outcome::TimedOut => "timed_out",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a `status:<id>` event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    #[serde(default)]
    pub status: String,
}

impl StatusEvent {
    /// Only `success` and `failed` are terminal; other statuses are ignored
    pub fn outcome(&self) -> Option<Outcome> {
        match self.status.trim().to_lowercase().as_str() {
            "success" => Some(Outcome::Success),
            "failed" => Some(Outcome::Failed),
            _ => None,
        }
    }

    pub fn outcome_from_payload(payload: Value) -> Option<Outcome> {
        serde_json::from_value::<StatusEvent>(payload)
            .ok()
            .and_then(|event| event.outcome())
    }
}
