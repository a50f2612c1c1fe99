//! Locally saved wizard drafts

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use crate::errors::DashboardError;
use crate::filesys::file::File;
use crate::wizard::ProjectForm;

/// A saved copy of the wizard form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    pub id: String,
    pub saved_at: DateTime<Utc>,
    pub form: ProjectForm,
}

/// Drafts directory, one JSON file per draft
#[derive(Debug, Clone)]
pub struct DraftStore {
    dir: PathBuf,
}

impl DraftStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn file(&self, id: &str) -> Result<File, DashboardError> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(DashboardError::ValidationError(format!(
                "Invalid draft id: {}",
                id
            )));
        }
        Ok(File::new(self.dir.join(format!("{}.json", id))))
    }

    /// Save `form`, overwriting the draft `id` when given
    pub async fn save(&self, form: &ProjectForm, id: Option<&str>) -> Result<Draft, DashboardError> {
        let id = match id {
            Some(id) => id.to_string(),
            None => uuid::Uuid::new_v4().to_string(),
        };
        let draft = Draft {
            id: id.clone(),
            saved_at: Utc::now(),
            form: form.clone(),
        };
        self.file(&id)?.write_json(&draft).await?;
        debug!("Saved draft {}", id);
        Ok(draft)
    }

    pub async fn load(&self, id: &str) -> Result<Draft, DashboardError> {
        self.file(id)?
            .read_json_opt::<Draft>()
            .await?
            .ok_or_else(|| DashboardError::NotFound(format!("draft {}", id)))
    }

    pub async fn delete(&self, id: &str) -> Result<(), DashboardError> {
        self.file(id)?.delete().await
    }

    /// All readable drafts, most recent first
    pub async fn list(&self) -> Result<Vec<Draft>, DashboardError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut drafts = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            match File::new(&path).read_json::<Draft>().await {
                Ok(draft) => drafts.push(draft),
                Err(e) => debug!("Skipping unreadable draft {}: {}", path.display(), e),
            }
        }
        drafts.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(drafts)
    }
}
