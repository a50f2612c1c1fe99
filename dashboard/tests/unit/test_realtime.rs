//! Realtime worker feeding a log stream through an in-memory transport

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use shipdeck::errors::DashboardError;
use shipdeck::models::events::Outcome;
use shipdeck::realtime::transport::{Connector, Transport};
use shipdeck::realtime::{ConnectionState, RealtimeClient, SessionKind};
use shipdeck::session::{follow, open, LogStream};
use shipdeck::workers::realtime::{run, Options};
use tokio::sync::mpsc;
use url::Url;

/// Frames pushed by the test, answered frames recorded
struct ChannelTransport {
    rx: mpsc::UnboundedReceiver<String>,
    sent: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn send(&mut self, frame: String) -> Result<(), DashboardError> {
        self.sent.lock().unwrap().push(frame);
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<String, DashboardError>> {
        self.rx.recv().await.map(Ok)
    }

    async fn close(&mut self) {}
}

struct OnceConnector {
    transport: Mutex<Option<ChannelTransport>>,
}

#[async_trait]
impl Connector for OnceConnector {
    async fn connect(&self, _url: &Url) -> Result<Box<dyn Transport>, DashboardError> {
        match self.transport.lock().unwrap().take() {
            Some(transport) => Ok(Box::new(transport)),
            None => Err(DashboardError::RealtimeError("already used".to_string())),
        }
    }
}

/// Connects only after `delay`, like a socket still handshaking
struct SlowConnector {
    delay: Duration,
    inner: OnceConnector,
}

#[async_trait]
impl Connector for SlowConnector {
    async fn connect(&self, url: &Url) -> Result<Box<dyn Transport>, DashboardError> {
        tokio::time::sleep(self.delay).await;
        self.inner.connect(url).await
    }
}

fn spawn_worker(
    realtime: &RealtimeClient,
    connector: Arc<dyn Connector>,
) -> tokio::task::JoinHandle<()> {
    let realtime = realtime.clone();
    tokio::spawn(async move {
        run(
            &Options {
                reconnect: false,
                reconnect_delay: Duration::from_millis(1),
            },
            realtime,
            connector,
            Url::parse("ws://localhost:3001/socket.io/?EIO=4&transport=websocket").unwrap(),
            tokio::time::sleep,
            Box::pin(std::future::pending::<()>()),
        )
        .await
    })
}

#[tokio::test]
async fn test_session_waits_for_slow_socket() {
    let (frames, rx) = mpsc::unbounded_channel();
    let connector = Arc::new(SlowConnector {
        delay: Duration::from_millis(50),
        inner: OnceConnector {
            transport: Mutex::new(Some(ChannelTransport {
                rx,
                sent: Arc::new(Mutex::new(Vec::new())),
            })),
        },
    });

    let realtime = RealtimeClient::new();
    let _worker = spawn_worker(&realtime, connector);

    // The server handshake is delivered once the socket is up
    frames
        .send(r#"0{"sid":"abc","upgrades":[],"pingInterval":25000,"pingTimeout":20000}"#.to_string())
        .unwrap();
    frames.send("40".to_string()).unwrap();

    let mut stream = LogStream::new(realtime.clone());
    open(&mut stream, SessionKind::Deployment, "1", Duration::from_secs(5))
        .await
        .unwrap();
    assert_eq!(realtime.state(), ConnectionState::Connected);

    // Only now is the deployment triggered and the backend starts emitting
    frames
        .send(r#"42["logs:1",{"message":"Cloning repo"}]"#.to_string())
        .unwrap();
    frames
        .send(r#"42["status:1",{"status":"success"}]"#.to_string())
        .unwrap();

    let outcome = follow(&mut stream, Duration::from_secs(5), |_, _| {}).await;
    assert_eq!(outcome, Some(Outcome::Success));
    assert_eq!(stream.lines().len(), 1);
    assert_eq!(stream.lines()[0].message, "Cloning repo");
}

#[tokio::test]
async fn test_session_refused_when_socket_never_connects() {
    let (_frames, rx) = mpsc::unbounded_channel();
    let connector = Arc::new(SlowConnector {
        delay: Duration::from_secs(30),
        inner: OnceConnector {
            transport: Mutex::new(Some(ChannelTransport {
                rx,
                sent: Arc::new(Mutex::new(Vec::new())),
            })),
        },
    });

    let realtime = RealtimeClient::new();
    let worker = spawn_worker(&realtime, connector);

    let mut stream = LogStream::new(realtime.clone());
    let err = open(&mut stream, SessionKind::Deployment, "1", Duration::from_millis(50))
        .await
        .unwrap_err();
    assert!(matches!(err, DashboardError::RealtimeError(_)));
    assert_eq!(realtime.listener_count("logs:1"), 0);
    worker.abort();
}

#[tokio::test]
async fn test_worker_feeds_log_stream() {
    let (frames, rx) = mpsc::unbounded_channel();
    let sent = Arc::new(Mutex::new(Vec::new()));
    let connector = Arc::new(OnceConnector {
        transport: Mutex::new(Some(ChannelTransport {
            rx,
            sent: sent.clone(),
        })),
    });

    let realtime = RealtimeClient::new();
    let mut stream = LogStream::new(realtime.clone());
    stream.start(SessionKind::Deployment, "7");

    let worker = spawn_worker(&realtime, connector);

    let script = VecDeque::from(vec![
        r#"0{"sid":"abc","upgrades":[],"pingInterval":25000,"pingTimeout":20000}"#,
        "40",
        r#"42["logs:7",{"timestamp":"2024-05-01T08:00:00Z","message":"> git pull"}]"#,
        "2",
        r#"42["logs:8",{"message":"other project"}]"#,
        r#"42["logs:7",{"message":"Build completed"}]"#,
        r#"42["status:7",{"status":"success"}]"#,
    ]);
    for frame in script {
        frames.send(frame.to_string()).unwrap();
    }

    let outcome = follow(&mut stream, Duration::from_secs(5), |_, _| {}).await;
    assert_eq!(outcome, Some(Outcome::Success));

    let lines: Vec<_> = stream.lines().iter().map(|l| l.message.as_str()).collect();
    assert_eq!(lines, vec!["> git pull", "Build completed"]);

    // Closing the socket ends the worker and flips the status, lines stay
    drop(frames);
    worker.await.unwrap();
    assert_eq!(realtime.state(), ConnectionState::Disconnected);
    assert_eq!(stream.connection(), ConnectionState::Disconnected);
    assert_eq!(stream.lines().len(), 2);

    let sent = sent.lock().unwrap().clone();
    assert_eq!(sent, vec!["40".to_string(), "3".to_string()]);
}
