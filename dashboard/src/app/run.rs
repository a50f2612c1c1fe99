//! Main application run loop

use std::future::Future;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::app::args::Command;
use crate::app::commands::execute;
use crate::app::options::AppOptions;
use crate::app::state::AppState;
use crate::errors::{DashboardError, ErrorKind};
use crate::realtime::transport::{build_socket_url, WsConnector};
use crate::realtime::RealtimeClient;
use crate::views::notify::Notification;
use crate::views::pages;
use crate::workers::realtime;

/// Run one dashboard command
pub async fn run(
    command: Command,
    options: AppOptions,
    shutdown_signal: impl Future<Output = ()> + Send + 'static,
) -> Result<(), DashboardError> {
    // Create shutdown channel
    let (shutdown_tx, _shutdown_rx): (broadcast::Sender<()>, _) = broadcast::channel(1);
    let mut shutdown_manager = ShutdownManager::new(shutdown_tx.clone(), options.max_shutdown_delay);

    let needs_realtime = options.enable_realtime_worker && command.needs_realtime();
    let mut state = match init(&options, needs_realtime, &shutdown_tx, &mut shutdown_manager) {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to start dashboard: {}", e);
            shutdown_manager.shutdown().await?;
            return Err(e);
        }
    };

    let mut stdout = std::io::stdout();
    let result = tokio::select! {
        _ = shutdown_signal => {
            info!("Shutdown signal received, shutting down...");
            Ok(())
        }
        result = execute(&mut state, command, &mut stdout) => result,
    };
    let _ = stdout.flush();

    if let Err(e) = &result {
        present_error(&state, e, &mut stdout);
    }

    drop(shutdown_tx);
    shutdown_manager.shutdown().await?;
    result
}

/// Route an error to the view its kind calls for
pub fn present_error(state: &AppState, err: &DashboardError, out: &mut dyn Write) {
    let written = match err.kind() {
        ErrorKind::NotFound => writeln!(out, "{}", pages::not_found(&not_found_subject(err))),
        ErrorKind::Unexpected => writeln!(out, "{}", pages::error_page(None, &err.to_string())),
        ErrorKind::Network => {
            state.notify(Notification::from_error("Request failed", err));
            Ok(())
        }
        ErrorKind::Validation => {
            state.notify(Notification::from_error("Please fix the form", err));
            Ok(())
        }
        ErrorKind::Failed => {
            state.notify(Notification::error(err.to_string()));
            Ok(())
        }
        ErrorKind::Disconnected => {
            state.notify(Notification::error(format!("Realtime channel: {}", err)));
            Ok(())
        }
    };
    if let Err(e) = written {
        warn!("Failed to render error page: {}", e);
    }
}

fn not_found_subject(err: &DashboardError) -> String {
    match err {
        DashboardError::NotFound(what) => what.clone(),
        other => other.to_string(),
    }
}

// =============================== INITIALIZATION ================================== //

fn init(
    options: &AppOptions,
    needs_realtime: bool,
    shutdown_tx: &broadcast::Sender<()>,
    shutdown_manager: &mut ShutdownManager,
) -> Result<AppState, DashboardError> {
    let realtime_client = RealtimeClient::new();
    let state = AppState::init(options, realtime_client.clone())?;

    if needs_realtime {
        init_realtime_worker(
            options,
            realtime_client,
            shutdown_manager,
            shutdown_tx.subscribe(),
        )?;
    }

    Ok(state)
}

fn init_realtime_worker(
    options: &AppOptions,
    client: RealtimeClient,
    shutdown_manager: &mut ShutdownManager,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DashboardError> {
    info!("Initializing realtime worker...");

    let socket_url = build_socket_url(&options.api_base_url)?;
    let token = options
        .api_token
        .clone()
        .map(|token| SecretString::new(token.into_boxed_str()));
    let connector = Arc::new(WsConnector::new(token));
    let worker_options = options.realtime_worker.clone();

    let realtime_handle = tokio::spawn(async move {
        realtime::run(
            &worker_options,
            client,
            connector,
            socket_url,
            tokio::time::sleep,
            Box::pin(async move {
                let _ = shutdown_rx.recv().await;
            }),
        )
        .await;
    });

    shutdown_manager.with_realtime_worker_handle(realtime_handle)
}

// ================================= SHUTDOWN ===================================== //

struct ShutdownManager {
    shutdown_tx: broadcast::Sender<()>,
    max_shutdown_delay: Duration,
    realtime_worker_handle: Option<JoinHandle<()>>,
}

impl ShutdownManager {
    pub fn new(shutdown_tx: broadcast::Sender<()>, max_shutdown_delay: Duration) -> Self {
        Self {
            shutdown_tx,
            max_shutdown_delay,
            realtime_worker_handle: None,
        }
    }

    pub fn with_realtime_worker_handle(&mut self, handle: JoinHandle<()>) -> Result<(), DashboardError> {
        if self.realtime_worker_handle.is_some() {
            return Err(DashboardError::ShutdownError(
                "realtime_handle already set".to_string(),
            ));
        }
        self.realtime_worker_handle = Some(handle);
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<(), DashboardError> {
        let _ = self.shutdown_tx.send(());

        match tokio::time::timeout(self.max_shutdown_delay, self.shutdown_impl()).await {
            Ok(result) => result,
            Err(_) => {
                error!(
                    "Shutdown timed out after {:?}, aborting workers...",
                    self.max_shutdown_delay
                );
                if let Some(handle) = self.realtime_worker_handle.take() {
                    handle.abort();
                }
                Err(DashboardError::ShutdownError("shutdown timed out".to_string()))
            }
        }
    }

    async fn shutdown_impl(&mut self) -> Result<(), DashboardError> {
        if let Some(handle) = self.realtime_worker_handle.as_mut() {
            handle
                .await
                .map_err(|e| DashboardError::ShutdownError(e.to_string()))?;
            self.realtime_worker_handle = None;
        }
        info!("Shutdown complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_shutdown_waits_for_worker() {
        let (tx, _) = broadcast::channel(1);
        let mut rx = tx.subscribe();
        let mut manager = ShutdownManager::new(tx, Duration::from_secs(1));

        let handle = tokio::spawn(async move {
            let _ = rx.recv().await;
        });
        manager.with_realtime_worker_handle(handle).unwrap();
        assert!(manager
            .with_realtime_worker_handle(tokio::spawn(async {}))
            .is_err());

        manager.shutdown().await.unwrap();
        assert!(manager.realtime_worker_handle.is_none());
    }
}
