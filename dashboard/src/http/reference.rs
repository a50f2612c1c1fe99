//! Reference data API client (tools, project types, organizations)

use std::fmt;
use std::str::FromStr;

use openapi_client::models::ReferenceRecord;

use crate::errors::DashboardError;
use crate::http::client::HttpClient;
use crate::http::projects::encode_segment;

/// Reference data collections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Tools,
    ProjectTypes,
    Organizations,
}

impl ReferenceKind {
    pub fn path(&self) -> &'static str {
        match self {
            ReferenceKind::Tools => "/tools",
            ReferenceKind::ProjectTypes => "/project-types",
            ReferenceKind::Organizations => "/organizations",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReferenceKind::Tools => "Tools",
            ReferenceKind::ProjectTypes => "Project types",
            ReferenceKind::Organizations => "Organizations",
        }
    }

    fn item_path(&self, id: &str) -> Result<String, DashboardError> {
        Ok(format!("{}/{}", self.path(), encode_segment(id)?))
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path().trim_start_matches('/'))
    }
}

impl FromStr for ReferenceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tools" => Ok(ReferenceKind::Tools),
            "project-types" => Ok(ReferenceKind::ProjectTypes),
            "organizations" => Ok(ReferenceKind::Organizations),
            _ => Err(format!("Unknown reference collection: {}", s)),
        }
    }
}

impl HttpClient {
    pub async fn list_reference(
        &self,
        kind: ReferenceKind,
    ) -> Result<Vec<ReferenceRecord>, DashboardError> {
        self.get(kind.path()).await
    }

    pub async fn get_reference(
        &self,
        kind: ReferenceKind,
        id: &str,
    ) -> Result<ReferenceRecord, DashboardError> {
        self.get(&kind.item_path(id)?).await
    }

    pub async fn create_reference(
        &self,
        kind: ReferenceKind,
        record: &ReferenceRecord,
    ) -> Result<ReferenceRecord, DashboardError> {
        let created: Option<ReferenceRecord> = self.post(kind.path(), record).await?;
        Ok(created_record(record, created))
    }

    pub async fn update_reference(
        &self,
        kind: ReferenceKind,
        id: &str,
        record: &ReferenceRecord,
    ) -> Result<(), DashboardError> {
        let _: serde_json::Value = self.put(&kind.item_path(id)?, record).await?;
        Ok(())
    }

    pub async fn delete_reference(
        &self,
        kind: ReferenceKind,
        id: &str,
    ) -> Result<(), DashboardError> {
        let _: serde_json::Value = self.delete(&kind.item_path(id)?).await?;
        Ok(())
    }
}

/// The stored record as far as the create response tells; an empty body or
/// a bare `{id}` falls back to what was sent.
fn created_record(sent: &ReferenceRecord, returned: Option<ReferenceRecord>) -> ReferenceRecord {
    match returned {
        None => sent.clone(),
        Some(mut record) => {
            if record.name.is_empty() {
                record.name = sent.name.clone();
            }
            record
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::client::decode_body;

    #[test]
    fn test_reference_paths() {
        assert_eq!(ReferenceKind::ProjectTypes.path(), "/project-types");
        assert_eq!(
            ReferenceKind::Tools.item_path("nginx").unwrap(),
            "/tools/nginx"
        );
        assert_eq!("organizations".parse::<ReferenceKind>(), Ok(ReferenceKind::Organizations));
        assert_eq!(ReferenceKind::ProjectTypes.to_string(), "project-types");
    }

    #[test]
    fn test_created_record_tolerates_sparse_bodies() {
        let sent = ReferenceRecord::new("docker");

        let empty: Option<ReferenceRecord> = decode_body("").unwrap();
        assert_eq!(created_record(&sent, empty), sent);

        let id_only: Option<ReferenceRecord> = decode_body(r#"{"id": 5}"#).unwrap();
        let record = created_record(&sent, id_only);
        assert_eq!(record.id.as_deref(), Some("5"));
        assert_eq!(record.name, "docker");

        let full: Option<ReferenceRecord> =
            decode_body(r#"{"id": "t1", "name": "Docker CE"}"#).unwrap();
        assert_eq!(created_record(&sent, full).name, "Docker CE");
    }
}
