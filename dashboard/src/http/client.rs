//! HTTP client implementation

use reqwest::{header, Client, Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error};

use openapi_client::models::ErrorResponse;

use crate::errors::DashboardError;

/// HTTP client for backend communication
pub struct HttpClient {
    client: Client,
    api_url: String,
    token: Option<SecretString>,
}

impl HttpClient {
    /// Create a client for the backend at `base_url`; requests go to `{base_url}/api`
    pub fn new(base_url: &str, token: Option<SecretString>) -> Result<Self, DashboardError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            api_url: api_url(base_url),
            token,
        })
    }

    /// Get the API root URL
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, DashboardError> {
        self.send(self.request(Method::GET, path)).await
    }

    /// Make a POST request
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, DashboardError> {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    /// Make a POST request without a body
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, DashboardError> {
        self.send(self.request(Method::POST, path)).await
    }

    /// Make a PUT request
    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, DashboardError> {
        self.send(self.request(Method::PUT, path).json(body)).await
    }

    /// Make a DELETE request
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, DashboardError> {
        self.send(self.request(Method::DELETE, path)).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!("{} {}", method, url);

        let mut request = self.client.request(method, &url);
        if let Some(token) = &self.token {
            request = request.header(
                header::AUTHORIZATION,
                format!("Bearer {}", token.expose_secret()),
            );
        }
        request
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, DashboardError> {
        let response = request.send().await?;
        let status = response.status();
        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();

        if !status.is_success() {
            error!("HTTP request to {} failed: {} - {}", url, status, body);
            return Err(status_error(status, &body));
        }

        decode_body(&body)
    }
}

/// `http://host:3001/` -> `http://host:3001/api`
pub fn api_url(base_url: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    if base.ends_with("/api") {
        base.to_string()
    } else {
        format!("{}/api", base)
    }
}

/// Empty bodies decode as JSON `null`, so `()` and `Option<T>` accept them
pub fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, DashboardError> {
    if body.trim().is_empty() {
        Ok(serde_json::from_value(serde_json::Value::Null)?)
    } else {
        Ok(serde_json::from_str(body)?)
    }
}

/// Map a non-success response to an error, preferring the backend's own message
pub fn status_error(status: StatusCode, body: &str) -> DashboardError {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .ok()
        .and_then(|e| e.reason().map(str::to_string))
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                status.canonical_reason().unwrap_or("unknown error").to_string()
            } else {
                trimmed.to_string()
            }
        });

    if status == StatusCode::NOT_FOUND {
        DashboardError::NotFound(message)
    } else {
        DashboardError::ApiError {
            status: status.as_u16(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_url() {
        assert_eq!(api_url("http://localhost:3001"), "http://localhost:3001/api");
        assert_eq!(api_url("http://localhost:3001/"), "http://localhost:3001/api");
        assert_eq!(api_url("https://x.io/api/"), "https://x.io/api");
    }

    #[test]
    fn test_decode_empty_body() {
        assert!(decode_body::<()>("").is_ok());
        let value: serde_json::Value = decode_body("  ").unwrap();
        assert!(value.is_null());
        assert!(decode_body::<Vec<String>>("").is_err());
    }

    #[test]
    fn test_status_error_prefers_backend_reason() {
        let err = status_error(StatusCode::BAD_REQUEST, r#"{"error":"host unreachable"}"#);
        assert_eq!(err.to_string(), "Request failed (400): host unreachable");

        let err = status_error(StatusCode::NOT_FOUND, "");
        assert!(matches!(err, DashboardError::NotFound(ref m) if m == "Not Found"));

        let err = status_error(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(matches!(err, DashboardError::ApiError { status: 502, .. }));
    }

    #[test]
    fn test_url_join() {
        let client = HttpClient::new("http://localhost:3001", None).unwrap();
        assert_eq!(client.url("/projects/7"), "http://localhost:3001/api/projects/7");
    }
}
