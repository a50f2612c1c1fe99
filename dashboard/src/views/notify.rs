//! Transient notifications (toasts)

use std::fmt;

use colored::Colorize;
use tracing::{error, info};

use crate::errors::{DashboardError, ErrorKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: Level::Info,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            message: message.into(),
        }
    }

    /// Toast for a failed request: `action` names what was attempted
    pub fn from_error(action: &str, err: &DashboardError) -> Self {
        match err.kind() {
            ErrorKind::Validation => Self::error(err.to_string()),
            _ => Self::error(format!("{}: {}", action, err)),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes toasts to stderr so they never mix with rendered views
#[derive(Debug, Default)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            Level::Error => {
                error!("{}", notification.message);
                eprintln!("{} {}", "✗".red().bold(), notification.message);
            }
            Level::Success => {
                info!("{}", notification.message);
                eprintln!("{} {}", "✓".green().bold(), notification.message);
            }
            Level::Info => {
                info!("{}", notification.message);
                eprintln!("{} {}", "•".cyan(), notification.message);
            }
        }
    }
}
