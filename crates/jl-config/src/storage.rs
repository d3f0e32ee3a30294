use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::types::{ByteSize, StorageBackend};

/// `[storage]` section.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Session directory for the file backend. Relative paths are resolved
    /// against the config file's parent directory by `EditorConfig::load`.
    pub dir: Option<PathBuf>,
    /// Optional byte quota across all keys.
    pub quota: Option<ByteSize>,
}

impl StorageConfig {
    pub(crate) fn resolve_dir(&mut self, base_dir: &Path) {
        if let Some(dir) = &self.dir
            && dir.is_relative()
        {
            self.dir = Some(base_dir.join(dir));
        }
    }
}
