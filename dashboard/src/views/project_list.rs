//! Project catalog with search and status filter

use std::fmt;
use std::str::FromStr;

use colored::Colorize;
use openapi_client::models::{DeploymentStatus, Project};

use crate::views::badges::{last_deployed, status_badge, BadgeStyle};

/// Filter on the last deployment status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    /// Last deployment succeeded
    Active,
    Failed,
}

impl StatusFilter {
    pub fn matches(&self, project: &Project) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => {
                project.last_deployment_status == Some(DeploymentStatus::Success)
            }
            StatusFilter::Failed => project.last_deployment_status == Some(DeploymentStatus::Failed),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str("all"),
            StatusFilter::Active => f.write_str("active"),
            StatusFilter::Failed => f.write_str("failed"),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" | "" => Ok(StatusFilter::All),
            "active" => Ok(StatusFilter::Active),
            "failed" => Ok(StatusFilter::Failed),
            _ => Err(format!("Invalid status filter: {}", s)),
        }
    }
}

/// Case-insensitive match on name or host, then the status filter
pub fn filter<'a>(projects: &'a [Project], query: &str, status: StatusFilter) -> Vec<&'a Project> {
    let query = query.trim().to_lowercase();
    projects
        .iter()
        .filter(|p| {
            query.is_empty()
                || p.name().to_lowercase().contains(&query)
                || p.host().to_lowercase().contains(&query)
        })
        .filter(|p| status.matches(p))
        .collect()
}

/// Counters shown above the catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectStats {
    pub total: usize,
    pub failed: usize,
    pub deploying: usize,
}

impl ProjectStats {
    pub fn from_projects(projects: &[Project]) -> Self {
        Self {
            total: projects.len(),
            failed: projects
                .iter()
                .filter(|p| p.last_deployment_status == Some(DeploymentStatus::Failed))
                .count(),
            deploying: projects.iter().filter(|p| p.is_deploying()).count(),
        }
    }
}

/// Search box and filter toggle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListState {
    pub query: String,
    pub status: StatusFilter,
}

impl ListState {
    pub fn visible<'a>(&self, projects: &'a [Project]) -> Vec<&'a Project> {
        filter(projects, &self.query, self.status)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

pub fn render(projects: &[Project], state: &ListState) -> String {
    let stats = ProjectStats::from_projects(projects);
    let mut out = vec![format!(
        "{} repositories   {} deploying now   {} need attention",
        stats.total.to_string().bold(),
        stats.deploying.to_string().cyan(),
        stats.failed.to_string().red(),
    )];

    out.push(format!("{} PROJECT CATALOG", "//".cyan()));
    if !state.query.is_empty() || state.status != StatusFilter::All {
        out.push(format!("search: '{}'  filter: {}", state.query, state.status).dimmed().to_string());
    }

    let visible = state.visible(projects);
    if visible.is_empty() {
        out.push("No projects found.".to_string());
        out.push(format!(
            "Create your first project: {}",
            "shipdeck --create --file=<project.json>".cyan()
        ));
        return out.join("\n");
    }

    for project in visible {
        out.push(render_row(project));
    }
    out.join("\n")
}

fn render_row(project: &Project) -> String {
    let stripe = if project.is_deploying() {
        "▶".cyan().to_string()
    } else {
        " ".to_string()
    };
    format!(
        "{} {:<8} {:<24} {:<14} {:<12} {:<20} {} {}",
        stripe,
        project.id,
        project.name().bold(),
        project.app_type().label(),
        project.branch(),
        project.host(),
        status_badge(project.last_deployment_status, BadgeStyle::List),
        last_deployed(project.last_deployed_at.as_ref()).dimmed(),
    )
}
