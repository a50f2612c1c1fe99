use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lenient;

/// Application type of a deployed project
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppType {
    #[default]
    #[serde(rename = "nodejs")]
    NodeJs,
    #[serde(rename = "php")]
    Php,
    #[serde(rename = "laravel-react")]
    LaravelReact,
    #[serde(rename = "static")]
    Static,
    #[serde(rename = "python")]
    Python,
}

impl AppType {
    pub const ALL: [AppType; 5] = [
        AppType::NodeJs,
        AppType::Php,
        AppType::LaravelReact,
        AppType::Static,
        AppType::Python,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppType::NodeJs => "nodejs",
            AppType::Php => "php",
            AppType::LaravelReact => "laravel-react",
            AppType::Static => "static",
            AppType::Python => "python",
        }
    }

    /// Human readable label
    pub fn label(&self) -> &'static str {
        match self {
            AppType::NodeJs => "Node.js",
            AppType::Php => "PHP / Laravel",
            AppType::LaravelReact => "Laravel + React",
            AppType::Static => "Static Site",
            AppType::Python => "Python",
        }
    }

    pub fn is_laravel(&self) -> bool {
        matches!(self, AppType::Php | AppType::LaravelReact)
    }

    pub fn is_node(&self) -> bool {
        matches!(self, AppType::NodeJs)
    }
}

impl fmt::Display for AppType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AppType::ALL
            .into_iter()
            .find(|t| t.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| format!("Invalid application type: {}", s))
    }
}

/// Outcome of the last deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentStatus {
    Success,
    Failed,
}

impl DeploymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeploymentStatus::Success => "success",
            DeploymentStatus::Failed => "failed",
        }
    }
}

impl FromStr for DeploymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "success" => Ok(DeploymentStatus::Success),
            "failed" => Ok(DeploymentStatus::Failed),
            _ => Err(format!("Invalid deployment status: {}", s)),
        }
    }
}

/// Whether the backend provisions the whole server or only the application
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetupType {
    Full,
    #[default]
    App,
}

impl FromStr for SetupType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(SetupType::Full),
            "app" => Ok(SetupType::App),
            _ => Err(format!("Invalid setup type: {}", s)),
        }
    }
}

/// Project configuration as sent on create/update and received on fetch.
///
/// Every field is optional: a fetched record only overrides what it carries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub app_type: Option<AppType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient::opt_port",
        skip_serializing_if = "Option::is_none"
    )]
    pub port: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deploy_path: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_cmd: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_cmd: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frontend_build_cmd: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composer_install: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub laravel_optimize: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_migrations: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup_type: Option<SetupType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}

/// A project as returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(deserialize_with = "lenient::id_string")]
    pub id: String,

    #[serde(flatten)]
    pub config: ProjectConfig,

    #[serde(
        default,
        deserialize_with = "lenient::deployment_status",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_deployment_status: Option<DeploymentStatus>,

    #[serde(
        default,
        deserialize_with = "lenient::opt_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_deployed_at: Option<DateTime<Utc>>,

    /// Transient backend status such as `deploying`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl Project {
    pub fn name(&self) -> &str {
        self.config.name.as_deref().unwrap_or("")
    }

    pub fn host(&self) -> &str {
        self.config.host.as_deref().unwrap_or("")
    }

    pub fn branch(&self) -> &str {
        self.config.branch.as_deref().unwrap_or("")
    }

    pub fn app_type(&self) -> AppType {
        self.config.app_type.unwrap_or_default()
    }

    pub fn is_deploying(&self) -> bool {
        self.status.as_deref() == Some("deploying")
    }
}

/// One past deployment attempt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(deserialize_with = "lenient::id_string")]
    pub id: String,

    #[serde(default)]
    pub hash: Option<String>,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub time: Option<String>,

    #[serde(default, deserialize_with = "lenient::deployment_status")]
    pub status: Option<DeploymentStatus>,

    #[serde(default)]
    pub duration: Option<String>,
}
