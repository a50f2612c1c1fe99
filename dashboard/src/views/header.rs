//! Shared layout shell and the header slot detail pages fill in

use colored::Colorize;
use openapi_client::models::{AppType, DeploymentStatus, Project};

use crate::views::badges::{status_badge, BadgeStyle};

/// Header of a project detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectHeader {
    pub name: String,
    pub app_type: AppType,
    pub host: String,
    pub branch: String,
    pub status: Option<DeploymentStatus>,
    /// A deploy request or session is outstanding
    pub deploying: bool,
}

impl ProjectHeader {
    pub fn from_project(project: &Project, deploying: bool) -> Self {
        Self {
            name: project.name().to_string(),
            app_type: project.app_type(),
            host: project.host().to_string(),
            branch: project.branch().to_string(),
            status: project.last_deployment_status,
            deploying,
        }
    }

    pub fn action_label(&self) -> &'static str {
        if self.deploying {
            "Deploying..."
        } else {
            "Redeploy"
        }
    }

    pub fn render(&self) -> String {
        let action = if self.deploying {
            self.action_label().dimmed()
        } else {
            self.action_label().cyan().bold()
        };
        [
            format!("Projects > {} > {}", self.name, "Console".cyan()).dimmed().to_string(),
            format!(
                "{} ({}) {}    [{}]",
                self.name.bold(),
                self.app_type.label(),
                status_badge(self.status, BadgeStyle::Header),
                action
            ),
            format!("Host: {}  ·  Branch: {}", self.host, self.branch),
        ]
        .join("\n")
    }
}

/// Header slot owned by the layout; cleared whenever the route changes
#[derive(Debug, Clone, Default)]
pub struct HeaderContext {
    route: String,
    header: Option<ProjectHeader>,
}

impl HeaderContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(&self) -> &str {
        &self.route
    }

    pub fn header(&self) -> Option<&ProjectHeader> {
        self.header.as_ref()
    }

    pub fn set_header(&mut self, header: ProjectHeader) {
        self.header = Some(header);
    }

    pub fn clear(&mut self) {
        self.header = None;
    }

    /// Switch route; a different route drops the previous page's header
    pub fn navigate(&mut self, route: impl Into<String>) {
        let route = route.into();
        if route != self.route {
            self.clear();
            self.route = route;
        }
    }

    /// Update the deploy action state of the current header, if any
    pub fn set_deploying(&mut self, deploying: bool) {
        if let Some(header) = self.header.as_mut() {
            header.deploying = deploying;
        }
    }

    pub fn render(&self) -> String {
        match &self.header {
            Some(header) => header.render(),
            None => default_header(&self.route),
        }
    }
}

fn default_header(route: &str) -> String {
    let title = match route.trim_matches('/') {
        "" | "projects" => "Projects",
        "projects/new" => "New Project",
        other if other.ends_with("/edit") => "Edit Project",
        _ => "Dashboard",
    };
    format!("{} {}", "Shipdeck".cyan().bold(), format!("// {}", title).dimmed())
}

/// Layout shell: header, separator, page body
pub fn render_layout(header: &HeaderContext, body: &str) -> String {
    format!("{}\n{}\n{}", header.render(), "─".repeat(60).dimmed(), body)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> ProjectHeader {
        ProjectHeader {
            name: "shop".to_string(),
            app_type: AppType::NodeJs,
            host: "10.0.0.5".to_string(),
            branch: "main".to_string(),
            status: None,
            deploying: false,
        }
    }

    #[test]
    fn test_route_change_resets_header() {
        let mut ctx = HeaderContext::new();
        ctx.navigate("/projects/1");
        ctx.set_header(header());

        ctx.navigate("/projects/1");
        assert!(ctx.header().is_some());

        ctx.navigate("/projects");
        assert!(ctx.header().is_none());
        assert!(ctx.render().contains("Projects"));
    }

    #[test]
    fn test_deploy_action_state() {
        let mut ctx = HeaderContext::new();
        ctx.set_header(header());
        assert!(ctx.render().contains("Redeploy"));

        ctx.set_deploying(true);
        assert_eq!(ctx.header().map(|h| h.action_label()), Some("Deploying..."));
        assert!(ctx.render().contains("Ready"));
    }
}
