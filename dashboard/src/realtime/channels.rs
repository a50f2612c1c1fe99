//! Channel naming

use std::fmt;

/// Kind of live session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionKind {
    /// A deployment attempt for one project
    Deployment,
    /// An SSH connection test
    ConnectionTest,
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionKind::Deployment => f.write_str("deployment"),
            SessionKind::ConnectionTest => f.write_str("connection test"),
        }
    }
}

/// Channels a session listens on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionChannels {
    pub logs: String,
    /// Connection tests report their outcome in the HTTP response instead
    pub status: Option<String>,
}

/// Channel name patterns
pub struct Channels;

impl Channels {
    /// Log lines of a connection test
    pub const TEST_LOGS: &'static str = "log:test";

    /// Log lines of a project deployment
    pub fn logs(project_id: &str) -> String {
        format!("logs:{}", project_id)
    }

    /// Terminal status of a project deployment
    pub fn status(project_id: &str) -> String {
        format!("status:{}", project_id)
    }

    pub fn for_session(kind: SessionKind, target_id: &str) -> SessionChannels {
        match kind {
            SessionKind::Deployment => SessionChannels {
                logs: Self::logs(target_id),
                status: Some(Self::status(target_id)),
            },
            SessionKind::ConnectionTest => SessionChannels {
                logs: Self::TEST_LOGS.to_string(),
                status: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_generation() {
        assert_eq!(Channels::logs("7"), "logs:7");
        assert_eq!(Channels::status("7"), "status:7");

        let channels = Channels::for_session(SessionKind::ConnectionTest, "ignored");
        assert_eq!(channels.logs, "log:test");
        assert!(channels.status.is_none());
    }
}
