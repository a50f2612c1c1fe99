//! Application state shared by the commands

use std::sync::Arc;

use secrecy::SecretString;
use tracing::info;

use crate::app::options::AppOptions;
use crate::errors::DashboardError;
use crate::http::HttpClient;
use crate::realtime::RealtimeClient;
use crate::session::driver::SessionOptions;
use crate::session::LogStream;
use crate::storage::drafts::DraftStore;
use crate::utils::InFlight;
use crate::views::header::HeaderContext;
use crate::views::notify::{Notification, Notifier, TerminalNotifier};

/// Everything a command needs; owned by the single view task
pub struct AppState {
    pub http: Arc<HttpClient>,
    pub realtime: RealtimeClient,
    pub header: HeaderContext,
    pub notifier: Arc<dyn Notifier>,
    pub drafts: DraftStore,
    pub in_flight: InFlight,
    pub sessions: SessionOptions,
}

impl AppState {
    pub fn init(options: &AppOptions, realtime: RealtimeClient) -> Result<Self, DashboardError> {
        let token = options
            .api_token
            .clone()
            .map(|token| SecretString::new(token.into_boxed_str()));
        let http = HttpClient::new(&options.api_base_url, token)?;
        info!("Using backend API at {}", http.api_url());

        Ok(Self {
            http: Arc::new(http),
            realtime,
            header: HeaderContext::new(),
            notifier: Arc::new(TerminalNotifier),
            drafts: DraftStore::new(options.storage.drafts_dir()),
            in_flight: InFlight::new(),
            sessions: options.sessions.clone(),
        })
    }

    pub fn notify(&self, notification: Notification) {
        self.notifier.notify(notification);
    }

    /// A fresh view model on the shared realtime client
    pub fn log_stream(&self) -> LogStream {
        LogStream::new(self.realtime.clone())
    }
}
