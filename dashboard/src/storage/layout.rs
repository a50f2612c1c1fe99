//! Storage layout configuration

use std::path::PathBuf;

use crate::filesys::file::File;

/// Where the dashboard keeps its local files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLayout {
    pub base_dir: PathBuf,
}

impl StorageLayout {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn settings_file(&self) -> File {
        File::new(self.base_dir.join("settings.json"))
    }

    pub fn drafts_dir(&self) -> PathBuf {
        self.base_dir.join("drafts")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.base_dir.join("logs")
    }
}

impl Default for StorageLayout {
    fn default() -> Self {
        let base_dir = std::env::var_os("SHIPDECK_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME")
                    .or_else(|| std::env::var_os("USERPROFILE"))
                    .map(|home| PathBuf::from(home).join(".shipdeck"))
            })
            .unwrap_or_else(|| PathBuf::from(".shipdeck"));

        Self::new(base_dir)
    }
}
