//! Deployment history sidebar

use colored::Colorize;
use openapi_client::models::{DeploymentStatus, HistoryEntry};

pub fn render(entries: &[HistoryEntry]) -> String {
    let mut out = vec!["HISTORY".bold().to_string()];

    if entries.is_empty() {
        out.push("No deployments yet.".italic().dimmed().to_string());
        return out.join("\n");
    }

    for entry in entries {
        let success = entry.status == Some(DeploymentStatus::Success);
        let dot = if success { "●".green() } else { "●".red() };
        let label = if success { "Success".green() } else { "Failed".red() };

        out.push(format!(
            "{} #{}  {}",
            dot,
            entry.hash.as_deref().unwrap_or(&entry.id),
            entry.time.as_deref().unwrap_or("").dimmed()
        ));
        if let Some(message) = entry.message.as_deref().filter(|m| !m.is_empty()) {
            out.push(format!("   {}", message));
        }
        out.push(format!(
            "   {} {}",
            label,
            entry.duration.as_deref().unwrap_or("").dimmed()
        ));
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_history() {
        let entries = vec![HistoryEntry {
            id: "1".to_string(),
            hash: Some("a1b2c3d".to_string()),
            message: Some("Fix login".to_string()),
            time: Some("2m ago".to_string()),
            status: Some(DeploymentStatus::Failed),
            duration: Some("45s".to_string()),
        }];
        let out = render(&entries);
        assert!(out.contains("#a1b2c3d"));
        assert!(out.contains("Fix login"));
        assert!(out.contains("Failed"));

        assert!(render(&[]).contains("No deployments yet."));
    }
}
