//! The project form record shared by all wizard steps

use std::collections::BTreeSet;

use openapi_client::models::{AppType, ProjectConfig, SetupType, TestConnectionRequest};
use serde::{Deserialize, Serialize};

use crate::errors::DashboardError;
use crate::wizard::steps::{self, StepStatus, WizardStep};

/// Value passed to [`ProjectForm::set_field`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
    Number(u64),
    /// Toggle one entry of a multi-select list
    Toggle(String),
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Flag(value)
    }
}

/// Union of the credential, configuration and repository step fields.
///
/// Switching `app_type` leaves the framework specific fields untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectForm {
    pub name: String,
    #[serde(rename = "type")]
    pub app_type: AppType,
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub private_key: String,
    pub deploy_path: String,
    pub repo_url: String,
    pub branch: String,
    pub git_token: String,
    pub build_cmd: String,
    pub start_cmd: String,
    pub frontend_build_cmd: String,
    pub composer_install: bool,
    pub laravel_optimize: bool,
    pub run_migrations: bool,
    pub setup_type: SetupType,
    pub tools: BTreeSet<String>,
    pub domain: String,
}

impl Default for ProjectForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            app_type: AppType::NodeJs,
            host: String::new(),
            port: 22,
            username: String::new(),
            password: String::new(),
            private_key: String::new(),
            deploy_path: "/var/www/".to_string(),
            repo_url: String::new(),
            branch: "main".to_string(),
            git_token: String::new(),
            build_cmd: "npm install && npm run build".to_string(),
            start_cmd: "npm start".to_string(),
            frontend_build_cmd: "npm run build".to_string(),
            composer_install: true,
            laravel_optimize: true,
            run_migrations: false,
            setup_type: SetupType::App,
            tools: BTreeSet::new(),
            domain: String::new(),
        }
    }
}

impl ProjectForm {
    /// Form pre-filled from a fetched record, for edit mode
    pub fn from_record(record: &ProjectConfig) -> Self {
        merge(&Self::default(), record)
    }

    /// Set one field by its wire name
    pub fn set_field(
        &mut self,
        name: &str,
        value: impl Into<FieldValue>,
    ) -> Result<(), DashboardError> {
        let value = value.into();
        match (name, value) {
            ("name", FieldValue::Text(v)) => self.name = v,
            ("host", FieldValue::Text(v)) => self.host = v,
            ("username", FieldValue::Text(v)) => self.username = v,
            ("password", FieldValue::Text(v)) => self.password = v,
            ("privateKey", FieldValue::Text(v)) => self.private_key = v,
            ("deployPath", FieldValue::Text(v)) => self.deploy_path = v,
            ("repoUrl", FieldValue::Text(v)) => self.repo_url = v,
            ("branch", FieldValue::Text(v)) => self.branch = v,
            ("gitToken", FieldValue::Text(v)) => self.git_token = v,
            ("buildCmd", FieldValue::Text(v)) => self.build_cmd = v,
            ("startCmd", FieldValue::Text(v)) => self.start_cmd = v,
            ("frontendBuildCmd", FieldValue::Text(v)) => self.frontend_build_cmd = v,
            ("domain", FieldValue::Text(v)) => self.domain = v,
            ("type", FieldValue::Text(v)) => {
                self.app_type = v.parse::<AppType>().map_err(DashboardError::ValidationError)?
            }
            ("setupType", FieldValue::Text(v)) => {
                self.setup_type = v.parse::<SetupType>().map_err(DashboardError::ValidationError)?
            }
            ("port", FieldValue::Number(n)) => self.port = parse_port(&n.to_string())?,
            ("port", FieldValue::Text(v)) => self.port = parse_port(&v)?,
            ("composerInstall", FieldValue::Flag(b)) => self.composer_install = b,
            ("laravelOptimize", FieldValue::Flag(b)) => self.laravel_optimize = b,
            ("runMigrations", FieldValue::Flag(b)) => self.run_migrations = b,
            ("tools", FieldValue::Toggle(tool)) => {
                self.toggle_tool(&tool);
            }
            (name, value) if Self::is_field(name) => {
                return Err(DashboardError::ValidationError(format!(
                    "Field '{}' does not accept {:?}",
                    name, value
                )));
            }
            (name, _) => {
                return Err(DashboardError::ValidationError(format!(
                    "Unknown field '{}'",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Add `tool` when absent, remove it when present.
    ///
    /// Returns whether the tool is selected afterwards.
    pub fn toggle_tool(&mut self, tool: &str) -> bool {
        if self.tools.remove(tool) {
            false
        } else {
            self.tools.insert(tool.to_string());
            true
        }
    }

    pub fn step_validity(&self) -> Vec<StepStatus> {
        steps::step_validity(self)
    }

    /// Reject submission while any step is incomplete
    pub fn validate(&self) -> Result<(), DashboardError> {
        let missing: Vec<String> = WizardStep::ALL
            .iter()
            .flat_map(|step| steps::missing_fields(*step, self))
            .map(str::to_string)
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(DashboardError::ValidationError(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )))
        }
    }

    /// The full record, unchanged, for create/update requests
    pub fn to_payload(&self) -> ProjectConfig {
        ProjectConfig {
            name: Some(self.name.clone()),
            app_type: Some(self.app_type),
            host: Some(self.host.clone()),
            port: Some(self.port),
            username: Some(self.username.clone()),
            password: Some(self.password.clone()),
            private_key: Some(self.private_key.clone()),
            deploy_path: Some(self.deploy_path.clone()),
            repo_url: Some(self.repo_url.clone()),
            branch: Some(self.branch.clone()),
            git_token: Some(self.git_token.clone()),
            build_cmd: Some(self.build_cmd.clone()),
            start_cmd: Some(self.start_cmd.clone()),
            frontend_build_cmd: Some(self.frontend_build_cmd.clone()),
            composer_install: Some(self.composer_install),
            laravel_optimize: Some(self.laravel_optimize),
            run_migrations: Some(self.run_migrations),
            setup_type: Some(self.setup_type),
            tools: Some(self.tools.iter().cloned().collect()),
            domain: Some(self.domain.clone()),
        }
    }

    /// Merge a fetched record into this form (edit mode)
    pub fn load(&mut self, record: &ProjectConfig) {
        *self = merge(self, record);
    }

    /// Credentials for the connection test
    pub fn connection_request(&self) -> TestConnectionRequest {
        TestConnectionRequest {
            host: self.host.clone(),
            port: Some(self.port),
            username: self.username.clone(),
            password: non_empty(&self.password),
            private_key: non_empty(&self.private_key),
        }
    }

    fn is_field(name: &str) -> bool {
        const FIELDS: [&str; 20] = [
            "name",
            "type",
            "host",
            "port",
            "username",
            "password",
            "privateKey",
            "deployPath",
            "repoUrl",
            "branch",
            "gitToken",
            "buildCmd",
            "startCmd",
            "frontendBuildCmd",
            "composerInstall",
            "laravelOptimize",
            "runMigrations",
            "setupType",
            "tools",
            "domain",
        ];
        FIELDS.contains(&name)
    }
}

/// Overlay every field present in `record` onto `form`.
///
/// Fields the record does not carry keep their current value.
pub fn merge(form: &ProjectForm, record: &ProjectConfig) -> ProjectForm {
    let pick = |value: &Option<String>, current: &String| {
        value.clone().unwrap_or_else(|| current.clone())
    };

    ProjectForm {
        name: pick(&record.name, &form.name),
        app_type: record.app_type.unwrap_or(form.app_type),
        host: pick(&record.host, &form.host),
        port: record.port.unwrap_or(form.port),
        username: pick(&record.username, &form.username),
        password: pick(&record.password, &form.password),
        private_key: pick(&record.private_key, &form.private_key),
        deploy_path: pick(&record.deploy_path, &form.deploy_path),
        repo_url: pick(&record.repo_url, &form.repo_url),
        branch: pick(&record.branch, &form.branch),
        git_token: pick(&record.git_token, &form.git_token),
        build_cmd: pick(&record.build_cmd, &form.build_cmd),
        start_cmd: pick(&record.start_cmd, &form.start_cmd),
        frontend_build_cmd: pick(&record.frontend_build_cmd, &form.frontend_build_cmd),
        composer_install: record.composer_install.unwrap_or(form.composer_install),
        laravel_optimize: record.laravel_optimize.unwrap_or(form.laravel_optimize),
        run_migrations: record.run_migrations.unwrap_or(form.run_migrations),
        setup_type: record.setup_type.unwrap_or(form.setup_type),
        tools: record
            .tools
            .as_ref()
            .map(|tools| tools.iter().cloned().collect())
            .unwrap_or_else(|| form.tools.clone()),
        domain: pick(&record.domain, &form.domain),
    }
}

fn parse_port(raw: &str) -> Result<u16, DashboardError> {
    match raw.trim().parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(DashboardError::ValidationError(format!(
            "Invalid SSH port: {}",
            raw
        ))),
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
