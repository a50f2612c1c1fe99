//! Settings file management

use serde::{Deserialize, Serialize};

use crate::errors::DashboardError;
use crate::filesys::file::File;
use crate::logs::LogLevel;

/// Environment variable overriding the backend base URL
pub const API_URL_ENV: &str = "SHIPDECK_API_URL";

/// Dashboard settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,

    /// Emit logs as JSON
    #[serde(default)]
    pub json_logs: bool,

    /// Write logs under the storage directory instead of stderr
    #[serde(default)]
    pub log_to_file: bool,

    /// Backend configuration
    #[serde(default)]
    pub api: ApiSettings,

    /// Realtime channel configuration
    #[serde(default)]
    pub realtime: RealtimeSettings,

    /// Live session limits
    #[serde(default)]
    pub sessions: SessionSettings,
}

impl Settings {
    /// Load settings from `file`, falling back to defaults when it does not exist
    pub async fn load(file: &File) -> Result<Self, DashboardError> {
        Ok(file.read_json_opt::<Settings>().await?.unwrap_or_default())
    }

    /// Apply the environment override for the backend URL
    pub fn apply_env(self) -> Self {
        self.with_api_url_override(std::env::var(API_URL_ENV).ok())
    }

    pub fn with_api_url_override(mut self, url: Option<String>) -> Self {
        if let Some(url) = url.filter(|u| !u.trim().is_empty()) {
            self.api.base_url = url.trim().to_string();
        }
        self
    }
}

/// Backend API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Host serving both the REST API (under `/api`) and the realtime socket
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Opaque bearer token forwarded with every request
    #[serde(default)]
    pub token: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:3001".to_string()
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
        }
    }
}

/// Realtime channel settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeSettings {
    /// Reconnect after the socket drops
    #[serde(default = "default_true")]
    pub reconnect: bool,

    /// Delay between reconnect attempts in seconds
    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_secs: u64,
}

fn default_true() -> bool {
    true
}

fn default_reconnect_delay() -> u64 {
    3
}

impl Default for RealtimeSettings {
    fn default() -> Self {
        Self {
            reconnect: true,
            reconnect_delay_secs: default_reconnect_delay(),
        }
    }
}

/// Live session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSettings {
    /// Wait this many seconds for the realtime socket before starting a session
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Give up on a deployment without a terminal status after this many seconds
    #[serde(default = "default_deployment_timeout")]
    pub deployment_timeout_secs: u64,

    /// Give up on a connection test after this many seconds
    #[serde(default = "default_connection_test_timeout")]
    pub connection_test_timeout_secs: u64,
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_deployment_timeout() -> u64 {
    600
}

fn default_connection_test_timeout() -> u64 {
    60
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            deployment_timeout_secs: default_deployment_timeout(),
            connection_test_timeout_secs: default_connection_test_timeout(),
        }
    }
}
