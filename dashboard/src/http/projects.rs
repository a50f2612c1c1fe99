//! Project API client

use openapi_client::models::{
    ApiMessage, HistoryEntry, IdResponse, Project, ProjectConfig, TestConnectionRequest,
};
use tracing::info;

use crate::errors::DashboardError;
use crate::http::client::HttpClient;

impl HttpClient {
    /// List all projects
    pub async fn list_projects(&self) -> Result<Vec<Project>, DashboardError> {
        self.get("/projects").await
    }

    /// Fetch one project
    pub async fn get_project(&self, id: &str) -> Result<Project, DashboardError> {
        self.get(&project_path(id)?).await
    }

    /// Create a project and return the id the backend assigned
    pub async fn create_project(&self, config: &ProjectConfig) -> Result<String, DashboardError> {
        let created: IdResponse = self.post("/projects", config).await?;
        info!("Created project {}", created.id);
        Ok(created.id)
    }

    /// Replace a project's configuration
    pub async fn update_project(
        &self,
        id: &str,
        config: &ProjectConfig,
    ) -> Result<(), DashboardError> {
        let _: serde_json::Value = self.put(&project_path(id)?, config).await?;
        Ok(())
    }

    /// Delete a project
    pub async fn delete_project(&self, id: &str) -> Result<(), DashboardError> {
        let _: serde_json::Value = self.delete(&project_path(id)?).await?;
        Ok(())
    }

    /// Start a deployment; progress arrives on the realtime channels
    pub async fn deploy_project(&self, id: &str) -> Result<(), DashboardError> {
        let _: serde_json::Value = self
            .post_empty(&format!("{}/deploy", project_path(id)?))
            .await?;
        info!("Deployment of project {} requested", id);
        Ok(())
    }

    /// Past deployments of a project
    pub async fn project_history(&self, id: &str) -> Result<Vec<HistoryEntry>, DashboardError> {
        self.get(&format!("{}/history", project_path(id)?)).await
    }

    /// Validate SSH credentials without deploying
    pub async fn test_connection(
        &self,
        request: &TestConnectionRequest,
    ) -> Result<ApiMessage, DashboardError> {
        let message: Option<ApiMessage> = self.post("/test-connection", request).await?;
        Ok(message.unwrap_or_default())
    }
}

fn project_path(id: &str) -> Result<String, DashboardError> {
    Ok(format!("/projects/{}", encode_segment(id)?))
}

/// Percent-encode a single path segment
pub(crate) fn encode_segment(segment: &str) -> Result<String, DashboardError> {
    if segment.trim().is_empty() {
        return Err(DashboardError::ValidationError("Empty id".to_string()));
    }
    let mut url = url::Url::parse("http://segment.invalid/")?;
    url.path_segments_mut()
        .map_err(|_| DashboardError::Internal("URL cannot be a base".to_string()))?
        .push(segment);
    Ok(url.path().trim_start_matches('/').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_path_encodes_id() {
        assert_eq!(project_path("42").unwrap(), "/projects/42");
        assert_eq!(project_path("a/b c").unwrap(), "/projects/a%2Fb%20c");
        assert!(project_path(" ").is_err());
    }
}
