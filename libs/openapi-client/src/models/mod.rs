//! API models

mod project;
mod reference;

pub use project::{AppType, DeploymentStatus, HistoryEntry, Project, ProjectConfig, SetupType};
pub use reference::ReferenceRecord;

use serde::{Deserialize, Serialize};

use crate::lenient;

/// SSH connection test request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestConnectionRequest {
    pub host: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

/// Generic acknowledgement body returned by mutating endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiMessage {
    /// A body without an explicit `success: false` or an `error` counts as success
    pub fn is_success(&self) -> bool {
        self.success.unwrap_or(true) && self.error.is_none()
    }
}

/// Response carrying the id the backend assigned to a new record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdResponse {
    #[serde(deserialize_with = "lenient::id_string")]
    pub id: String,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub fn reason(&self) -> Option<&str> {
        self.error.as_deref().or(self.message.as_deref())
    }
}
