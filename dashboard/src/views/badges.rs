//! Status badges and timestamps shared by several views

use chrono::{DateTime, Local, TimeZone, Utc};
use colored::{ColoredString, Colorize};
use openapi_client::models::DeploymentStatus;

/// Where a badge is shown; the list calls a successful project "Healthy"
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeStyle {
    List,
    Header,
}

pub fn status_text(status: Option<DeploymentStatus>, style: BadgeStyle) -> &'static str {
    match (status, style) {
        (Some(DeploymentStatus::Success), BadgeStyle::List) => "Healthy",
        (Some(DeploymentStatus::Success), BadgeStyle::Header) => "Success",
        (Some(DeploymentStatus::Failed), _) => "Failed",
        (None, _) => "Ready",
    }
}

pub fn status_badge(status: Option<DeploymentStatus>, style: BadgeStyle) -> ColoredString {
    let text = format!("[{}]", status_text(status, style));
    match status {
        Some(DeploymentStatus::Success) => text.green(),
        Some(DeploymentStatus::Failed) => text.red(),
        None => text.dimmed(),
    }
}

/// 24 hour wall clock time
pub fn clock<Tz: TimeZone>(timestamp: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    timestamp.format("%H:%M:%S").to_string()
}

/// Local time of the last deployment or "Never"
pub fn last_deployed(timestamp: Option<&DateTime<Utc>>) -> String {
    match timestamp {
        Some(ts) => clock(&ts.with_timezone(&Local)),
        None => "Never".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_text() {
        assert_eq!(status_text(Some(DeploymentStatus::Success), BadgeStyle::List), "Healthy");
        assert_eq!(status_text(Some(DeploymentStatus::Success), BadgeStyle::Header), "Success");
        assert_eq!(status_text(Some(DeploymentStatus::Failed), BadgeStyle::List), "Failed");
        assert_eq!(status_text(None, BadgeStyle::Header), "Ready");
    }

    #[test]
    fn test_clock() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 17, 4, 9).unwrap();
        assert_eq!(clock(&ts), "17:04:09");
        assert_eq!(last_deployed(None), "Never");
    }
}
