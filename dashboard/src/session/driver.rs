//! Drives a [`LogStream`] until the session ends or its time limit expires

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::warn;

use crate::errors::DashboardError;
use crate::models::events::Outcome;
use crate::realtime::SessionKind;
use crate::session::log_stream::{LogStream, SessionEvent};

/// Session time limits
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// How long to wait for the realtime socket before triggering a session
    pub connect_timeout: Duration,
    pub deployment_timeout: Duration,
    pub connection_test_timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            deployment_timeout: Duration::from_secs(600),
            connection_test_timeout: Duration::from_secs(60),
        }
    }
}

/// Start a session and wait until the realtime socket is connected.
///
/// Call before triggering the deployment or test: events broadcast while the
/// socket is still connecting never reach it. On failure the session's
/// subscriptions are released.
pub async fn open(
    stream: &mut LogStream,
    kind: SessionKind,
    target_id: &str,
    connect_timeout: Duration,
) -> Result<(), DashboardError> {
    stream.start(kind, target_id);
    if let Err(e) = stream.realtime().wait_connected(connect_timeout).await {
        stream.stop();
        return Err(e);
    }
    Ok(())
}

/// Follow the stream until a terminal status arrives. On expiry the session
/// is completed as [`Outcome::TimedOut`] and stopped.
///
/// Returns `None` if the session was stopped without a terminal status.
pub async fn follow<F>(stream: &mut LogStream, limit: Duration, mut on_event: F) -> Option<Outcome>
where
    F: FnMut(&LogStream, &SessionEvent),
{
    let deadline = Instant::now() + limit;

    loop {
        if let Some(outcome) = stream.outcome() {
            return Some(outcome);
        }

        match tokio::time::timeout_at(deadline, stream.next_event()).await {
            Ok(Some(event)) => on_event(stream, &event),
            Ok(None) => return stream.outcome(),
            Err(_) => {
                warn!("No terminal status after {:?}", limit);
                stream.complete(Outcome::TimedOut);
                stream.stop();
                return Some(Outcome::TimedOut);
            }
        }
    }
}

/// Follow the stream while `request` is outstanding; the response decides
/// the outcome. Lines already queued when the response arrives are applied
/// before returning.
pub async fn follow_request<T, Fut, F>(
    stream: &mut LogStream,
    limit: Duration,
    request: Fut,
    mut on_event: F,
) -> Result<T, DashboardError>
where
    Fut: Future<Output = Result<T, DashboardError>>,
    F: FnMut(&LogStream, &SessionEvent),
{
    let deadline = tokio::time::sleep(limit);
    tokio::pin!(deadline);
    tokio::pin!(request);

    // Once the stream has nothing left to listen to only the request matters
    let mut listening = true;

    loop {
        tokio::select! {
            response = &mut request => {
                for event in stream.pump() {
                    on_event(stream, &event);
                }
                return response;
            }
            event = stream.next_event(), if listening => match event {
                Some(event) => on_event(stream, &event),
                None => listening = false,
            },
            _ = &mut deadline => {
                warn!("Request still outstanding after {:?}", limit);
                stream.complete(Outcome::TimedOut);
                stream.stop();
                return Err(DashboardError::Timeout(format!(
                    "No response after {}s",
                    limit.as_secs()
                )));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::{ConnectionState, RealtimeClient};
    use serde_json::json;

    #[tokio::test]
    async fn test_follow_until_status() {
        let realtime = RealtimeClient::new();
        let mut stream = LogStream::new(realtime.clone());
        stream.start(SessionKind::Deployment, "1");

        realtime.dispatch("logs:1", json!({"message": "Cloning repo"}));
        realtime.dispatch("status:1", json!({"status": "failed"}));

        let mut seen = 0;
        let outcome = follow(&mut stream, Duration::from_secs(5), |_, _| seen += 1).await;

        assert_eq!(outcome, Some(Outcome::Failed));
        assert!(seen >= 1);
    }

    #[tokio::test]
    async fn test_open_waits_for_connection() {
        let realtime = RealtimeClient::new();
        let mut stream = LogStream::new(realtime.clone());

        let err = open(&mut stream, SessionKind::Deployment, "3", Duration::from_millis(20))
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::RealtimeError(_)));
        assert!(!stream.is_listening());
        assert_eq!(realtime.listener_count("logs:3"), 0);

        realtime.set_state(ConnectionState::Connected);
        open(&mut stream, SessionKind::Deployment, "3", Duration::from_millis(20))
            .await
            .unwrap();
        assert!(stream.is_listening());
        assert_eq!(realtime.listener_count("status:3"), 1);
    }

    #[tokio::test]
    async fn test_follow_times_out() {
        let realtime = RealtimeClient::new();
        let mut stream = LogStream::new(realtime.clone());
        stream.start(SessionKind::Deployment, "2");

        let outcome = follow(&mut stream, Duration::from_millis(20), |_, _| {}).await;

        assert_eq!(outcome, Some(Outcome::TimedOut));
        assert!(!stream.is_listening());
        assert_eq!(realtime.listener_count("logs:2"), 0);
    }

    #[tokio::test]
    async fn test_follow_request_collects_lines() {
        let realtime = RealtimeClient::new();
        let mut stream = LogStream::new(realtime.clone());
        stream.start(SessionKind::ConnectionTest, "");

        let sender = realtime.clone();
        let request = async move {
            sender.dispatch("log:test", json!({"message": "Connecting to 10.0.0.1"}));
            sender.dispatch("log:test", json!({"message": "Connected"}));
            Ok::<_, DashboardError>(true)
        };

        let result = follow_request(&mut stream, Duration::from_secs(5), request, |_, _| {}).await;

        assert!(result.unwrap());
        let messages: Vec<_> = stream.lines().iter().map(|l| l.message.as_str()).collect();
        assert_eq!(messages, vec!["Connecting to 10.0.0.1", "Connected"]);
    }

    #[tokio::test]
    async fn test_follow_request_times_out() {
        let realtime = RealtimeClient::new();
        let mut stream = LogStream::new(realtime);
        stream.start(SessionKind::ConnectionTest, "");

        let request = std::future::pending::<Result<(), DashboardError>>();
        let result = follow_request(&mut stream, Duration::from_millis(20), request, |_, _| {}).await;

        assert!(matches!(result, Err(DashboardError::Timeout(_))));
        assert_eq!(stream.outcome(), Some(Outcome::TimedOut));
    }
}
