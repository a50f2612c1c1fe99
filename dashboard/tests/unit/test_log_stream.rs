//! Log stream view model tests

use std::time::Duration;

use serde_json::json;
use shipdeck::models::events::{LogEvent, Outcome};
use shipdeck::realtime::{RealtimeClient, SessionKind};
use shipdeck::session::{follow, LogStream, SessionEvent};

#[test]
fn test_append_keeps_count_and_order() {
    let mut stream = LogStream::new(RealtimeClient::new());
    stream.start(SessionKind::Deployment, "1");

    let messages: Vec<String> = (0..25).map(|i| format!("line {}", i)).collect();
    for message in &messages {
        stream.append(LogEvent::new(message.clone()));
    }

    assert_eq!(stream.lines().len(), messages.len());
    for (line, expected) in stream.lines().iter().zip(&messages) {
        assert_eq!(&line.message, expected);
    }
}

#[test]
fn test_timestamps_are_not_reordered() {
    let mut stream = LogStream::new(RealtimeClient::new());
    stream.start(SessionKind::Deployment, "1");

    stream.append(LogEvent::from_payload(
        json!({"timestamp": "2024-01-01T10:00:05Z", "message": "second by time"}),
    ));
    stream.append(LogEvent::from_payload(
        json!({"timestamp": "2024-01-01T10:00:01Z", "message": "first by time"}),
    ));

    assert_eq!(stream.lines()[0].message, "second by time");
    assert_eq!(stream.lines()[1].message, "first by time");
}

#[test]
fn test_complete_twice_keeps_first_outcome() {
    let mut stream = LogStream::new(RealtimeClient::new());
    stream.start(SessionKind::Deployment, "1");

    assert!(stream.complete(Outcome::Success));
    assert!(!stream.complete(Outcome::Failed));
    assert_eq!(stream.outcome(), Some(Outcome::Success));
}

#[test]
fn test_restart_clears_previous_session() {
    let realtime = RealtimeClient::new();
    let mut stream = LogStream::new(realtime.clone());

    stream.start(SessionKind::Deployment, "1");
    stream.append(LogEvent::new("old"));
    stream.complete(Outcome::Failed);

    stream.start(SessionKind::Deployment, "2");
    assert!(stream.lines().is_empty());
    assert_eq!(stream.outcome(), None);
    assert!(stream.is_active());
    assert_eq!(realtime.listener_count("logs:1"), 0);
    assert_eq!(realtime.listener_count("logs:2"), 1);
}

#[tokio::test]
async fn test_deployment_scenario_with_duplicate_status() {
    let realtime = RealtimeClient::new();
    let mut stream = LogStream::new(realtime.clone());
    stream.start(SessionKind::Deployment, "42");

    for message in ["Cloning repo", "Installing deps", "Build complete"] {
        realtime.dispatch("logs:42", json!({ "message": message }));
    }
    realtime.dispatch("status:42", json!({"status": "success"}));

    let mut events = Vec::new();
    let outcome = follow(&mut stream, Duration::from_secs(5), |_, event| {
        events.push(event.clone())
    })
    .await;
    assert_eq!(outcome, Some(Outcome::Success));

    // A second terminal event for the same session changes nothing
    realtime.dispatch("status:42", json!({"status": "success"}));
    assert_eq!(stream.pump(), vec![SessionEvent::Ignored]);

    let lines: Vec<_> = stream.lines().iter().map(|l| l.message.as_str()).collect();
    assert_eq!(lines, vec!["Cloning repo", "Installing deps", "Build complete"]);
    assert_eq!(stream.outcome(), Some(Outcome::Success));
    assert!(!stream.is_active());
}

#[tokio::test]
async fn test_stop_is_safe_after_teardown() {
    let realtime = RealtimeClient::new();
    let mut stream = LogStream::new(realtime.clone());
    stream.start(SessionKind::ConnectionTest, "");
    stream.stop();
    stream.stop();
    drop(stream);

    assert_eq!(realtime.listener_count("log:test"), 0);
    assert_eq!(realtime.dispatch("log:test", json!("late")), 0);
}
