//! Wizard progress and draft summary

use colored::Colorize;

use crate::wizard::steps::missing_fields;
use crate::wizard::{ProjectForm, StepStatus};

pub fn render_progress(steps: &[StepStatus]) -> String {
    steps
        .iter()
        .enumerate()
        .map(|(idx, status)| {
            let text = format!("{} {}", idx + 1, status.label());
            if status.valid {
                format!("[✓] {}", text).green().to_string()
            } else if status.active {
                format!("[ ] {}", text).cyan().bold().to_string()
            } else {
                format!("[ ] {}", text).dimmed().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("  ─  ")
}

/// Progress bar plus what each incomplete step still needs
pub fn render_form(form: &ProjectForm) -> String {
    let steps = form.step_validity();
    let mut out = vec![render_progress(&steps)];

    for status in steps.iter().filter(|s| !s.valid) {
        out.push(format!(
            "{}: missing {}",
            status.label(),
            missing_fields(status.step, form).join(", ")
        ));
    }
    if steps.iter().all(|s| s.valid) {
        out.push(format!("Ready to submit {} ({})", form.name.bold(), form.app_type.label()));
    }
    if form.app_type.is_laravel() {
        out.push(format!(
            "Framework: composer install {}, optimize {}, migrations {}",
            on_off(form.composer_install),
            on_off(form.laravel_optimize),
            on_off(form.run_migrations)
        ));
    }
    if form.app_type.is_node() {
        out.push(format!("Build: {}  Start: {}", form.build_cmd, form.start_cmd));
    }
    if !form.tools.is_empty() {
        let tools: Vec<_> = form.tools.iter().map(String::as_str).collect();
        out.push(format!("Server tools: {}", tools.join(", ")));
    }
    out.join("\n")
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "on"
    } else {
        "off"
    }
}
