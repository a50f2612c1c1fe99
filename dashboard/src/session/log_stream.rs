//! Log stream view model for one live session

use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::models::events::{LogEvent, Outcome, StatusEvent};
use crate::realtime::{Channels, ConnectionState, RealtimeClient, SessionKind, Subscription};

/// Identifies the session currently shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionKey {
    pub kind: SessionKind,
    pub target_id: String,
}

/// What [`LogStream::next_event`] applied to the model
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A line was appended
    Log(LogEvent),
    /// The session reached its terminal outcome
    Status(Outcome),
    Connection(ConnectionState),
    /// Duplicate or unrecognised terminal status
    Ignored,
}

enum Incoming {
    Log(Value),
    Status(Value),
    State(ConnectionState),
}

/// Ordered log lines of one session plus its activity and connection status.
///
/// Lines are kept in receipt order and never rewritten. Starting a new session
/// discards them; stopping keeps them on screen.
pub struct LogStream {
    realtime: RealtimeClient,
    session: Option<SessionKey>,
    lines: Vec<LogEvent>,
    active: bool,
    outcome: Option<Outcome>,
    logs: Option<Subscription>,
    status: Option<Subscription>,
    state_rx: watch::Receiver<ConnectionState>,
}

impl LogStream {
    pub fn new(realtime: RealtimeClient) -> Self {
        let state_rx = realtime.watch_state();
        Self {
            realtime,
            session: None,
            lines: Vec::new(),
            active: false,
            outcome: None,
            logs: None,
            status: None,
            state_rx,
        }
    }

    /// Begin a session. Subscriptions of the previous session are released
    /// before the new ones are taken.
    pub fn start(&mut self, kind: SessionKind, target_id: &str) {
        self.stop();

        let channels = Channels::for_session(kind, target_id);
        self.lines.clear();
        self.outcome = None;
        self.logs = Some(self.realtime.subscribe(&channels.logs));
        self.status = channels
            .status
            .as_deref()
            .map(|channel| self.realtime.subscribe(channel));
        self.session = Some(SessionKey {
            kind,
            target_id: target_id.to_string(),
        });
        self.active = true;
        self.state_rx.borrow_and_update();

        info!("Started {} session on {}", kind, channels.logs);
    }

    /// Append one received line. Ignored once the session has been stopped.
    pub fn append(&mut self, event: LogEvent) -> bool {
        if self.logs.is_none() {
            debug!("Dropping line outside of a session: {}", event.message);
            return false;
        }
        self.lines.push(event);
        true
    }

    /// Record the terminal outcome; later terminal events are ignored
    pub fn complete(&mut self, outcome: Outcome) -> bool {
        if self.session.is_none() || self.outcome.is_some() {
            debug!("Ignoring terminal status {}", outcome);
            return false;
        }
        self.outcome = Some(outcome);
        self.active = false;
        info!("Session finished: {}", outcome);
        true
    }

    /// Release every subscription of the session
    pub fn stop(&mut self) {
        let had_subscriptions = self.logs.is_some() || self.status.is_some();
        if let Some(mut sub) = self.logs.take() {
            sub.release();
        }
        if let Some(mut sub) = self.status.take() {
            sub.release();
        }
        self.active = false;
        if had_subscriptions {
            debug!("Session subscriptions released");
        }
    }

    /// Apply everything already queued without waiting
    pub fn pump(&mut self) -> Vec<SessionEvent> {
        let mut incoming = Vec::new();
        if let Some(sub) = self.logs.as_mut() {
            while let Some(payload) = sub.try_next() {
                incoming.push(Incoming::Log(payload));
            }
        }
        if let Some(sub) = self.status.as_mut() {
            while let Some(payload) = sub.try_next() {
                incoming.push(Incoming::Status(payload));
            }
        }
        if self.state_rx.has_changed().unwrap_or(false) {
            incoming.push(Incoming::State(*self.state_rx.borrow_and_update()));
        }

        incoming.into_iter().map(|i| self.apply(i)).collect()
    }

    /// Wait for the next event of the session and apply it. Returns `None`
    /// when no session is listening.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        if self.logs.is_none() {
            return None;
        }

        // Queued lines before the status that ends the session
        let incoming = tokio::select! {
            biased;
            Some(payload) = recv(self.logs.as_mut()) => Incoming::Log(payload),
            Some(payload) = recv(self.status.as_mut()) => Incoming::Status(payload),
            Ok(()) = self.state_rx.changed() => Incoming::State(*self.state_rx.borrow_and_update()),
            else => return None,
        };

        Some(self.apply(incoming))
    }

    fn apply(&mut self, incoming: Incoming) -> SessionEvent {
        match incoming {
            Incoming::Log(payload) => {
                let event = LogEvent::from_payload(payload);
                self.append(event.clone());
                SessionEvent::Log(event)
            }
            Incoming::Status(payload) => match StatusEvent::outcome_from_payload(payload) {
                Some(outcome) if self.complete(outcome) => SessionEvent::Status(outcome),
                _ => SessionEvent::Ignored,
            },
            Incoming::State(state) => {
                if state == ConnectionState::Disconnected && self.active {
                    warn!("Realtime channel disconnected during session");
                }
                SessionEvent::Connection(state)
            }
        }
    }

    pub fn session(&self) -> Option<&SessionKey> {
        self.session.as_ref()
    }

    pub fn lines(&self) -> &[LogEvent] {
        &self.lines
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    pub fn is_listening(&self) -> bool {
        self.logs.is_some()
    }

    /// Connection status of the shared channel
    pub fn realtime(&self) -> &RealtimeClient {
        &self.realtime
    }

    pub fn connection(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }
}

impl Drop for LogStream {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn recv(sub: Option<&mut Subscription>) -> Option<Value> {
    match sub {
        Some(sub) => sub.next().await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_start_subscribes_by_kind() {
        let realtime = RealtimeClient::new();
        let mut stream = LogStream::new(realtime.clone());

        stream.start(SessionKind::Deployment, "42");
        assert_eq!(realtime.listener_count("logs:42"), 1);
        assert_eq!(realtime.listener_count("status:42"), 1);
        assert!(stream.is_active());

        stream.start(SessionKind::ConnectionTest, "");
        assert_eq!(realtime.listener_count("logs:42"), 0);
        assert_eq!(realtime.listener_count("status:42"), 0);
        assert_eq!(realtime.listener_count("log:test"), 1);
    }

    #[test]
    fn test_append_preserves_order() {
        let realtime = RealtimeClient::new();
        let mut stream = LogStream::new(realtime);
        stream.start(SessionKind::Deployment, "1");

        for message in ["a", "b", "c"] {
            assert!(stream.append(LogEvent::new(message)));
        }
        let messages: Vec<_> = stream.lines().iter().map(|l| l.message.as_str()).collect();
        assert_eq!(messages, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_complete_is_idempotent() {
        let realtime = RealtimeClient::new();
        let mut stream = LogStream::new(realtime);

        assert!(!stream.complete(Outcome::Success));

        stream.start(SessionKind::Deployment, "1");
        assert!(stream.complete(Outcome::Failed));
        assert!(!stream.complete(Outcome::Success));
        assert_eq!(stream.outcome(), Some(Outcome::Failed));
        assert!(!stream.is_active());
    }

    #[test]
    fn test_stop_keeps_lines_and_ignores_late_events() {
        let realtime = RealtimeClient::new();
        let mut stream = LogStream::new(realtime.clone());
        stream.start(SessionKind::Deployment, "5");

        realtime.dispatch("logs:5", json!({"message": "one"}));
        stream.pump();
        stream.stop();
        stream.stop();

        assert_eq!(realtime.dispatch("logs:5", json!({"message": "late"})), 0);
        assert!(!stream.append(LogEvent::new("late")));
        assert_eq!(stream.lines().len(), 1);
        assert!(stream.pump().is_empty());
    }

    #[test]
    fn test_drop_releases_subscriptions() {
        let realtime = RealtimeClient::new();
        {
            let mut stream = LogStream::new(realtime.clone());
            stream.start(SessionKind::Deployment, "9");
        }
        assert_eq!(realtime.listener_count("logs:9"), 0);
        assert_eq!(realtime.listener_count("status:9"), 0);
    }

    #[test]
    fn test_disconnect_keeps_lines() {
        let realtime = RealtimeClient::new();
        realtime.set_state(ConnectionState::Connected);
        let mut stream = LogStream::new(realtime.clone());
        stream.start(SessionKind::Deployment, "3");

        realtime.dispatch("logs:3", json!("line"));
        realtime.set_state(ConnectionState::Disconnected);

        let events = stream.pump();
        assert!(events.contains(&SessionEvent::Connection(ConnectionState::Disconnected)));
        assert_eq!(stream.connection(), ConnectionState::Disconnected);
        assert_eq!(stream.lines().len(), 1);
        assert!(stream.is_listening());
    }

    #[tokio::test]
    async fn test_next_event_applies_status() {
        let realtime = RealtimeClient::new();
        let mut stream = LogStream::new(realtime.clone());
        stream.start(SessionKind::Deployment, "8");

        realtime.dispatch("status:8", json!({"status": "success"}));
        assert_eq!(
            stream.next_event().await,
            Some(SessionEvent::Status(Outcome::Success))
        );

        realtime.dispatch("status:8", json!({"status": "failed"}));
        assert_eq!(stream.next_event().await, Some(SessionEvent::Ignored));
        assert_eq!(stream.outcome(), Some(Outcome::Success));
    }

    #[tokio::test]
    async fn test_next_event_without_session() {
        let realtime = RealtimeClient::new();
        let mut stream = LogStream::new(realtime);
        assert_eq!(stream.next_event().await, None);
    }
}
