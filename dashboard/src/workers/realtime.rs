//! Realtime worker: keeps the Socket.IO connection alive and feeds the
//! listener registry of the [`RealtimeClient`].

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};
use url::Url;

use crate::errors::DashboardError;
use crate::realtime::packet::{self, Packet};
use crate::realtime::transport::{Connector, Transport};
use crate::realtime::{ConnectionState, RealtimeClient};

/// Realtime worker options
#[derive(Debug, Clone)]
pub struct Options {
    /// Reconnect after the connection drops
    pub reconnect: bool,

    /// Reconnect delay on failure
    pub reconnect_delay: Duration,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            reconnect: true,
            reconnect_delay: Duration::from_secs(3),
        }
    }
}

enum ConnectionEnd {
    Closed,
    Shutdown,
}

/// Run the realtime worker
pub async fn run<S, F>(
    options: &Options,
    client: RealtimeClient,
    connector: Arc<dyn Connector>,
    socket_url: Url,
    sleep_fn: S,
    mut shutdown_signal: Pin<Box<dyn Future<Output = ()> + Send>>,
) where
    S: Fn(Duration) -> F,
    F: Future<Output = ()>,
{
    info!("Realtime worker starting...");

    loop {
        client.set_state(ConnectionState::Connecting);
        info!("Connecting to realtime channel: {}", socket_url);

        let connection = tokio::select! {
            biased;
            _ = &mut shutdown_signal => {
                info!("Realtime worker shutting down...");
                client.set_state(ConnectionState::Disconnected);
                return;
            }
            connection = connector.connect(&socket_url) => connection,
        };

        match connection {
            Ok(mut transport) => {
                let ended = serve(transport.as_mut(), &client, &mut shutdown_signal).await;
                client.set_state(ConnectionState::Disconnected);
                match ended {
                    Ok(ConnectionEnd::Shutdown) => {
                        info!("Realtime worker shutting down connection...");
                        return;
                    }
                    Ok(ConnectionEnd::Closed) => warn!("Realtime channel closed"),
                    Err(e) => error!("Realtime channel error: {}", e),
                }
            }
            Err(e) => {
                client.set_state(ConnectionState::Disconnected);
                error!("Failed to connect to realtime channel: {}", e);
            }
        }

        if !options.reconnect {
            info!("Reconnect disabled, realtime worker stopping");
            return;
        }

        tokio::select! {
            biased;
            _ = &mut shutdown_signal => {
                info!("Realtime worker shutting down...");
                return;
            }
            _ = sleep_fn(options.reconnect_delay) => {
                debug!("Retrying realtime connection after {:?}", options.reconnect_delay);
            }
        }
    }
}

async fn serve(
    transport: &mut dyn Transport,
    client: &RealtimeClient,
    shutdown_signal: &mut Pin<Box<dyn Future<Output = ()> + Send>>,
) -> Result<ConnectionEnd, DashboardError> {
    // Known once the server sent its handshake
    let mut heartbeat_window: Option<Duration> = None;

    loop {
        let frame = tokio::select! {
            biased;
            _ = &mut *shutdown_signal => {
                let _ = transport.send(packet::DISCONNECT.to_string()).await;
                transport.close().await;
                return Ok(ConnectionEnd::Shutdown);
            }
            frame = next_frame(transport, heartbeat_window) => frame?,
        };

        let Some(frame) = frame else {
            return Ok(ConnectionEnd::Closed);
        };

        let packet = match packet::decode(&frame) {
            Ok(packet) => packet,
            Err(e) => {
                warn!("Skipping frame: {}", e);
                continue;
            }
        };

        match packet {
            Packet::Open(info) => {
                debug!("Socket session {} opened", info.sid);
                if info.ping_interval > 0 {
                    heartbeat_window = Some(Duration::from_millis(
                        info.ping_interval + info.ping_timeout,
                    ));
                }
                transport.send(packet::CONNECT.to_string()).await?;
            }
            Packet::Connected => {
                info!("Connected to realtime channel");
                client.set_state(ConnectionState::Connected);
            }
            Packet::Ping => transport.send(packet::PONG.to_string()).await?,
            Packet::Event { name, payload } => {
                let delivered = client.dispatch(&name, payload);
                debug!("Event on {} delivered to {} listener(s)", name, delivered);
            }
            Packet::ConnectError(reason) => {
                return Err(DashboardError::RealtimeError(format!(
                    "Connection refused: {}",
                    reason
                )));
            }
            Packet::Close | Packet::Disconnected => {
                transport.close().await;
                return Ok(ConnectionEnd::Closed);
            }
            Packet::Pong | Packet::Noop | Packet::Ignored => {}
        }
    }
}

async fn next_frame(
    transport: &mut dyn Transport,
    heartbeat_window: Option<Duration>,
) -> Result<Option<String>, DashboardError> {
    let frame = match heartbeat_window {
        Some(window) => tokio::time::timeout(window, transport.recv())
            .await
            .map_err(|_| DashboardError::RealtimeError("Heartbeat timed out".to_string()))?,
        None => transport.recv().await,
    };
    frame.transpose()
}
