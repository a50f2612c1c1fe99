//! Step validity, derived from a form snapshot

use std::fmt;

use crate::wizard::form::ProjectForm;

/// Wizard steps in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardStep {
    Credentials,
    Configuration,
    Repository,
}

impl WizardStep {
    pub const ALL: [WizardStep; 3] = [
        WizardStep::Credentials,
        WizardStep::Configuration,
        WizardStep::Repository,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            WizardStep::Credentials => "CREDENTIALS",
            WizardStep::Configuration => "CONFIGURATION",
            WizardStep::Repository => "REPOSITORY",
        }
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Validity of one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepStatus {
    pub step: WizardStep,
    pub valid: bool,
    /// No invalid step precedes this one
    pub active: bool,
}

impl StepStatus {
    pub fn label(&self) -> &'static str {
        self.step.label()
    }
}

/// Ordered validity of every step
pub fn step_validity(form: &ProjectForm) -> Vec<StepStatus> {
    let mut blocked = false;
    WizardStep::ALL
        .iter()
        .map(|&step| {
            let valid = missing_fields(step, form).is_empty();
            let status = StepStatus {
                step,
                valid,
                active: !blocked,
            };
            blocked |= !valid;
            status
        })
        .collect()
}

/// Required fields of `step` that are still empty
pub fn missing_fields(step: WizardStep, form: &ProjectForm) -> Vec<&'static str> {
    let mut missing = Vec::new();
    match step {
        WizardStep::Credentials => {
            if is_blank(&form.host) {
                missing.push("host");
            }
            if is_blank(&form.username) {
                missing.push("username");
            }
            if is_blank(&form.password) && is_blank(&form.private_key) {
                missing.push("password or privateKey");
            }
        }
        WizardStep::Configuration => {
            if is_blank(&form.deploy_path) {
                missing.push("deployPath");
            }
        }
        WizardStep::Repository => {
            if is_blank(&form.repo_url) {
                missing.push("repoUrl");
            }
            if is_blank(&form.branch) {
                missing.push("branch");
            }
            if is_blank(&form.name) {
                missing.push("name");
            }
        }
    }
    missing
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
