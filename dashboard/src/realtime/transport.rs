//! Socket transport seam

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use http::HeaderValue;
use secrecy::{ExposeSecret, SecretString};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, trace};
use url::Url;

use crate::errors::DashboardError;

/// Text frame transport carrying Engine.IO packets
#[async_trait]
pub trait Transport: Send {
    async fn send(&mut self, frame: String) -> Result<(), DashboardError>;

    /// Next text frame; `None` once the peer closed the connection
    async fn recv(&mut self) -> Option<Result<String, DashboardError>>;

    async fn close(&mut self);
}

/// Opens transports; one call per (re)connection attempt
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, url: &Url) -> Result<Box<dyn Transport>, DashboardError>;
}

/// Derive the Socket.IO endpoint from the backend base URL
pub fn build_socket_url(base_url: &str) -> Result<Url, DashboardError> {
    let mut url = Url::parse(base_url)?;

    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        _ => {
            return Err(DashboardError::ConfigError(
                "Invalid backend URL scheme".to_string(),
            ))
        }
    };
    url.set_scheme(scheme)
        .map_err(|_| DashboardError::ConfigError("Failed to set scheme".to_string()))?;

    // The socket lives on the host root even when the REST base ends in /api
    let path = url.path().trim_end_matches('/');
    let path = path.strip_suffix("/api").unwrap_or(path).to_string();
    url.set_path(&format!("{}/socket.io/", path));
    url.set_query(Some("EIO=4&transport=websocket"));

    Ok(url)
}

/// WebSocket connector backed by tokio-tungstenite
#[derive(Default)]
pub struct WsConnector {
    token: Option<SecretString>,
}

impl WsConnector {
    pub fn new(token: Option<SecretString>) -> Self {
        Self { token }
    }
}

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &Url) -> Result<Box<dyn Transport>, DashboardError> {
        let mut request = url.as_str().into_client_request()?;
        request
            .headers_mut()
            .insert("User-Agent", HeaderValue::from_static("Shipdeck"));
        if let Some(token) = &self.token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| DashboardError::ConfigError(format!("Invalid API token: {}", e)))?;
            request.headers_mut().insert("Authorization", value);
        }

        let (stream, response) = connect_async(request).await?;
        debug!("Socket handshake completed with status {}", response.status());

        Ok(Box::new(WsTransport { stream }))
    }
}

struct WsTransport {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Transport for WsTransport {
    async fn send(&mut self, frame: String) -> Result<(), DashboardError> {
        trace!("Sending frame: {}", frame);
        self.stream.send(Message::Text(frame.into())).await?;
        Ok(())
    }

    async fn recv(&mut self) -> Option<Result<String, DashboardError>> {
        loop {
            match self.stream.next().await? {
                Ok(Message::Text(text)) => return Some(Ok(text.as_str().to_string())),
                Ok(Message::Close(frame)) => {
                    debug!("Socket closed by peer: {:?}", frame);
                    return None;
                }
                // Control frames are answered by tungstenite
                Ok(_) => continue,
                Err(e) => return Some(Err(e.into())),
            }
        }
    }

    async fn close(&mut self) {
        let _ = self.stream.close(None).await;
    }
}
