//! Error types for the dashboard

use thiserror::Error;

/// Main error type for the dashboard
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Request failed ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Realtime error: {0}")]
    RealtimeError(String),

    #[error("{0}")]
    SessionFailed(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Busy: {0}")]
    Busy(String),

    #[error("Shutdown error: {0}")]
    ShutdownError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// How an error is presented to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Request rejected or unreachable backend; shown as a transient notification
    Network,
    /// Required input missing; blocked before submission
    Validation,
    /// Realtime transport dropped; status indicator only
    Disconnected,
    /// A deployment or connection test ran and reported failure
    Failed,
    /// Referenced record does not exist; dedicated view
    NotFound,
    /// Anything else; generic error view
    Unexpected,
}

impl DashboardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DashboardError::HttpError(_)
            | DashboardError::ApiError { .. }
            | DashboardError::Timeout(_)
            | DashboardError::Busy(_) => ErrorKind::Network,
            DashboardError::ValidationError(_) => ErrorKind::Validation,
            DashboardError::RealtimeError(_) => ErrorKind::Disconnected,
            DashboardError::SessionFailed(_) => ErrorKind::Failed,
            DashboardError::NotFound(_) => ErrorKind::NotFound,
            DashboardError::IoError(_)
            | DashboardError::JsonError(_)
            | DashboardError::ConfigError(_)
            | DashboardError::ShutdownError(_)
            | DashboardError::Internal(_) => ErrorKind::Unexpected,
        }
    }
}

impl From<url::ParseError> for DashboardError {
    fn from(err: url::ParseError) -> Self {
        DashboardError::ConfigError(format!("Invalid URL: {}", err))
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for DashboardError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        DashboardError::RealtimeError(err.to_string())
    }
}
