//! Terminal-style log viewer

use std::fmt;

use chrono::Local;
use colored::{ColoredString, Colorize};

use crate::models::events::LogEvent;
use crate::realtime::ConnectionState;
use crate::session::LogStream;
use crate::views::badges::clock;

/// Severity guessed from the text of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Info,
    Error,
    Warn,
    Success,
    Cmd,
}

impl LineKind {
    /// First matching rule wins
    pub fn classify(message: &str) -> Self {
        let contains_any = |needles: &[&str]| needles.iter().any(|n| message.contains(n));

        if contains_any(&["Error", "failed", "❌"]) {
            LineKind::Error
        } else if contains_any(&["WARN", "warning"]) {
            LineKind::Warn
        } else if contains_any(&["Success", "completed", "Connected", "FINISH"]) {
            LineKind::Success
        } else if message.starts_with('>') {
            LineKind::Cmd
        } else {
            LineKind::Info
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LineKind::Info => "INFO",
            LineKind::Error => "ERROR",
            LineKind::Warn => "WARN",
            LineKind::Success => "SUCCESS",
            LineKind::Cmd => "CMD",
        }
    }

    fn paint(&self, text: &str) -> ColoredString {
        match self {
            LineKind::Info => text.blue(),
            LineKind::Error => text.red(),
            LineKind::Warn => text.yellow(),
            LineKind::Success => text.green(),
            LineKind::Cmd => text.magenta(),
        }
    }
}

impl fmt::Display for LineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// `Live Tail` while the session streams, `Disconnected` otherwise
pub fn status_label(active: bool, connection: ConnectionState) -> &'static str {
    if active && connection != ConnectionState::Disconnected {
        "Live Tail"
    } else {
        "Disconnected"
    }
}

pub fn render_line(event: &LogEvent) -> String {
    let kind = LineKind::classify(&event.message);
    let time = event
        .timestamp
        .map(|ts| clock(&ts.with_timezone(&Local)))
        .unwrap_or_else(|| "--:--:--".to_string());

    format!(
        "{} {} {}",
        format!("[{}]", time).dimmed(),
        kind.paint(&format!("{:<7}", kind.label())).bold(),
        event.message
    )
}

pub fn render_status(stream: &LogStream) -> String {
    let label = status_label(stream.is_active(), stream.connection());
    let dot = if label == "Live Tail" {
        "●".green()
    } else {
        "●".dimmed()
    };
    match stream.session() {
        Some(session) if session.target_id.is_empty() => {
            format!("{} {}  {}", dot, label, session.kind.to_string().dimmed())
        }
        Some(session) => format!(
            "{} {}  {}",
            dot,
            label,
            format!("{} {}", session.kind, session.target_id).dimmed()
        ),
        None => format!("{} {}", dot, label),
    }
}

/// The whole viewer: status, every line, and the outcome once known
pub fn render(stream: &LogStream) -> String {
    let mut out = vec![render_status(stream)];

    if stream.lines().is_empty() && !stream.is_active() {
        out.push("Ready to deploy. Run with --deploy=<id> to start.".italic().to_string());
    }
    out.extend(stream.lines().iter().map(render_line));

    if let Some(outcome) = stream.outcome() {
        let text = format!("Session finished: {}", outcome);
        out.push(if outcome.is_success() {
            text.green().to_string()
        } else {
            text.red().to_string()
        });
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::realtime::{RealtimeClient, SessionKind};

    #[test]
    fn test_classify() {
        assert_eq!(LineKind::classify("Build failed"), LineKind::Error);
        assert_eq!(LineKind::classify("❌ permission denied"), LineKind::Error);
        assert_eq!(LineKind::classify("npm WARN deprecated"), LineKind::Warn);
        assert_eq!(LineKind::classify("Build completed"), LineKind::Success);
        assert_eq!(LineKind::classify("> npm install"), LineKind::Cmd);
        assert_eq!(LineKind::classify("Cloning repo"), LineKind::Info);
        // Error wins over success
        assert_eq!(LineKind::classify("Error: Success flag missing"), LineKind::Error);
    }

    #[test]
    fn test_status_label() {
        assert_eq!(status_label(true, ConnectionState::Connected), "Live Tail");
        assert_eq!(status_label(true, ConnectionState::Disconnected), "Disconnected");
        assert_eq!(status_label(false, ConnectionState::Connected), "Disconnected");
    }

    #[test]
    fn test_render_stream() {
        let mut stream = LogStream::new(RealtimeClient::new());
        assert!(render(&stream).contains("Ready to deploy"));

        stream.start(SessionKind::Deployment, "1");
        stream.append(LogEvent::new("> git pull"));
        let out = render(&stream);
        assert!(out.contains("Live Tail"));
        assert!(out.contains("CMD"));
        assert!(out.contains("> git pull"));
        assert!(out.contains("deployment 1"));

        stream.start(SessionKind::ConnectionTest, "");
        assert!(render_status(&stream).contains("connection test"));
    }
}
