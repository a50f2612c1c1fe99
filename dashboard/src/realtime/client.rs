//! Realtime client: local listener registry fed by the realtime worker.
//!
//! One client exists per process. It is constructed explicitly and handed to
//! whoever needs it; cloning shares the same registry. Views take
//! [`Subscription`] handles and never own the socket itself.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{mpsc, watch};
use tracing::{debug, trace, warn};

use crate::errors::DashboardError;

/// State of the underlying socket
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Connected,
    Disconnected,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Connecting => f.write_str("connecting"),
            ConnectionState::Connected => f.write_str("connected"),
            ConnectionState::Disconnected => f.write_str("disconnected"),
        }
    }
}

struct Listener {
    id: u64,
    tx: mpsc::UnboundedSender<Value>,
}

#[derive(Default)]
struct Registry {
    listeners: Mutex<HashMap<String, Vec<Listener>>>,
    next_id: AtomicU64,
}

impl Registry {
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Vec<Listener>>> {
        // A panicking listener must not take the whole channel down with it
        self.listeners.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn remove(&self, channel: &str, id: u64) {
        let mut listeners = self.lock();
        if let Some(entries) = listeners.get_mut(channel) {
            entries.retain(|l| l.id != id);
            if entries.is_empty() {
                listeners.remove(channel);
            }
        }
    }
}

/// Shared handle on the realtime channel
#[derive(Clone)]
pub struct RealtimeClient {
    registry: Arc<Registry>,
    state: Arc<watch::Sender<ConnectionState>>,
}

impl Default for RealtimeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RealtimeClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RealtimeClient")
            .field("state", &self.state())
            .field("channels", &self.registry.lock().len())
            .finish()
    }
}

impl RealtimeClient {
    pub fn new() -> Self {
        let (state, _) = watch::channel(ConnectionState::Connecting);
        Self {
            registry: Arc::new(Registry::default()),
            state: Arc::new(state),
        }
    }

    /// Register a listener on `channel`. Events are queued in receipt order
    /// until the handle is released.
    pub fn subscribe(&self, channel: &str) -> Subscription {
        let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();

        self.registry
            .lock()
            .entry(channel.to_string())
            .or_default()
            .push(Listener { id, tx });
        debug!("Subscribed listener {} to {}", id, channel);

        Subscription {
            channel: channel.to_string(),
            id,
            registry: Arc::downgrade(&self.registry),
            rx,
            released: false,
        }
    }

    /// Deliver `payload` to every listener on `channel`; returns how many
    /// listeners received it.
    pub fn dispatch(&self, channel: &str, payload: Value) -> usize {
        let mut listeners = self.registry.lock();
        let Some(entries) = listeners.get_mut(channel) else {
            trace!("No listener for {}", channel);
            return 0;
        };

        entries.retain(|l| l.tx.send(payload.clone()).is_ok());
        let delivered = entries.len();
        if entries.is_empty() {
            listeners.remove(channel);
        }
        delivered
    }

    pub fn listener_count(&self, channel: &str) -> usize {
        self.registry.lock().get(channel).map_or(0, Vec::len)
    }

    pub fn set_state(&self, state: ConnectionState) {
        self.state.send_if_modified(|current| {
            if *current == state {
                false
            } else {
                debug!("Realtime connection {}", state);
                *current = state;
                true
            }
        });
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Wait until the socket has joined the default namespace.
    ///
    /// The backend only broadcasts to sockets that are already connected, so
    /// anything that triggers events must wait for this first.
    pub async fn wait_connected(&self, limit: Duration) -> Result<(), DashboardError> {
        let mut state = self.watch_state();
        let connected = state.wait_for(|s| *s == ConnectionState::Connected);

        let result = match tokio::time::timeout(limit, connected).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(_)) => Err(DashboardError::RealtimeError(
                "Realtime client closed".to_string(),
            )),
            Err(_) => {
                warn!("Realtime channel not connected after {:?}", limit);
                Err(DashboardError::RealtimeError(format!(
                    "Not connected after {}s",
                    limit.as_secs()
                )))
            }
        };
        result
    }
}

/// A listener on one channel; released on [`Subscription::release`] or drop
pub struct Subscription {
    channel: String,
    id: u64,
    registry: Weak<Registry>,
    rx: mpsc::UnboundedReceiver<Value>,
    released: bool,
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("channel", &self.channel)
            .field("id", &self.id)
            .field("released", &self.released)
            .finish()
    }
}

impl Subscription {
    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Next queued payload without waiting
    pub fn try_next(&mut self) -> Option<Value> {
        if self.released {
            return None;
        }
        self.rx.try_recv().ok()
    }

    /// Wait for the next payload; `None` once released
    pub async fn next(&mut self) -> Option<Value> {
        if self.released {
            return None;
        }
        self.rx.recv().await
    }

    /// Detach from the registry and drop anything still queued
    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(&self.channel, self.id);
        }
        self.rx.close();
        while self.rx.try_recv().is_ok() {}
        debug!("Released listener {} on {}", self.id, self.channel);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}
