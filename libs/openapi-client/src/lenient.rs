//! Tolerant field deserializers

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};

use crate::models::DeploymentStatus;

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Signed(i64),
    Float(f64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(s) => s,
            RawId::Signed(n) => n.to_string(),
            RawId::Float(n) => n.to_string(),
        }
    }
}

/// Accept ids sent either as JSON strings or numbers
pub fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(RawId::into_string)
}

/// Optional variant of [`id_string`]
pub fn opt_id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.map(RawId::into_string))
}

/// Map `"success"` / `"failed"` to a status; anything else (including
/// `"none"` and null) means no recorded outcome.
pub fn deployment_status<'de, D>(deserializer: D) -> Result<Option<DeploymentStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| s.parse().ok()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Text(String),
    Millis(i64),
}

/// Accept RFC 3339 strings or epoch milliseconds; unparseable values become `None`
pub fn opt_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<RawTimestamp> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|raw| match raw {
        RawTimestamp::Text(s) => DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        RawTimestamp::Millis(ms) => Utc.timestamp_millis_opt(ms).single(),
    }))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPort {
    Number(u16),
    Text(String),
}

/// Ports typed into a form sometimes arrive as strings
pub fn opt_port<'de, D>(deserializer: D) -> Result<Option<u16>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<RawPort> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|raw| match raw {
        RawPort::Number(n) => Some(n),
        RawPort::Text(s) => s.trim().parse().ok(),
    }))
}
