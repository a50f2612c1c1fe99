//! Not-found and generic error pages

use colored::Colorize;

pub fn not_found(what: &str) -> String {
    [
        "404".red().bold().to_string(),
        format!("{} not found.", what),
        "It might have been removed, had its name changed, or is temporarily unavailable."
            .dimmed()
            .to_string(),
        format!("  Back to Dashboard: {}", "shipdeck --list".cyan()),
        "ERROR_CODE: PAGE_NOT_FOUND".dimmed().to_string(),
    ]
    .join("\n")
}

/// Page shown for failures nothing else handles
pub fn error_page(title: Option<&str>, message: &str) -> String {
    [
        title.unwrap_or("Something went wrong").red().bold().to_string(),
        message.to_string(),
        "  Reload: run the same command again".to_string(),
        format!("  Back to Dashboard: {}", "shipdeck --list".cyan()),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages() {
        assert!(not_found("Project 7").contains("Project 7 not found."));
        let page = error_page(None, "boom");
        assert!(page.contains("Something went wrong"));
        assert!(page.contains("Reload"));
        assert!(page.contains("Back to Dashboard"));
    }
}
