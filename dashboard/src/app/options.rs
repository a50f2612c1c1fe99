//! Application configuration options

use std::time::Duration;

use crate::session::driver::SessionOptions;
use crate::storage::layout::StorageLayout;
use crate::storage::settings::Settings;
use crate::workers::realtime;

/// Main application options
#[derive(Debug, Clone)]
pub struct AppOptions {
    /// Backend base URL (REST under `/api`, realtime socket at the root)
    pub api_base_url: String,

    /// Opaque bearer token forwarded to the backend
    pub api_token: Option<String>,

    /// Local storage
    pub storage: StorageLayout,

    /// Start the realtime worker
    pub enable_realtime_worker: bool,

    /// Realtime worker options
    pub realtime_worker: realtime::Options,

    /// Live session limits
    pub sessions: SessionOptions,

    /// Maximum delay for graceful shutdown
    pub max_shutdown_delay: Duration,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:3001".to_string(),
            api_token: None,
            storage: StorageLayout::default(),
            enable_realtime_worker: true,
            realtime_worker: realtime::Options::default(),
            sessions: SessionOptions::default(),
            max_shutdown_delay: Duration::from_secs(5),
        }
    }
}

impl AppOptions {
    pub fn from_settings(settings: &Settings, storage: StorageLayout) -> Self {
        Self {
            api_base_url: settings.api.base_url.clone(),
            api_token: settings.api.token.clone(),
            storage,
            realtime_worker: realtime::Options {
                reconnect: settings.realtime.reconnect,
                reconnect_delay: Duration::from_secs(settings.realtime.reconnect_delay_secs),
            },
            sessions: SessionOptions {
                connect_timeout: Duration::from_secs(settings.sessions.connect_timeout_secs),
                deployment_timeout: Duration::from_secs(settings.sessions.deployment_timeout_secs),
                connection_test_timeout: Duration::from_secs(
                    settings.sessions.connection_test_timeout_secs,
                ),
            },
            ..Default::default()
        }
    }
}
