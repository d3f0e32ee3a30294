//! Session-scoped key/value storage for the history blob.
//!
//! Values are UTF-8 strings. Quotas are counted in bytes: key plus value
//! for the memory backend, file sizes for the file backend.

use std::collections::HashMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use jl_config::{StorageBackend, StorageConfig};
use orion_error::prelude::*;
use orion_error::ErrorOweBase;

use crate::error::{CoreReason, CoreResult};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage quota exceeded: {needed} bytes needed, quota is {quota}")]
    QuotaExceeded { needed: usize, quota: usize },
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage i/o error: {0}")]
    Io(#[from] io::Error),
}

impl StorageError {
    pub fn is_quota(&self) -> bool {
        matches!(self, StorageError::QuotaExceeded { .. })
    }
}

/// Backend for the history blob. One instance per editor session.
pub trait SessionStorage: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
    /// Byte size of the stored value, 0 when absent or unreadable.
    fn size_of(&self, key: &str) -> usize;
}

/// Build the backend selected in `[storage]`.
pub fn open_storage(config: &StorageConfig) -> CoreResult<Box<dyn SessionStorage>> {
    let quota = config.quota.map(|q| q.as_bytes());
    match config.backend {
        StorageBackend::Memory => Ok(Box::new(MemoryStorage::new(quota))),
        StorageBackend::File => {
            let Some(dir) = &config.dir else {
                return StructError::from(CoreReason::Storage)
                    .with_detail("file storage requires a session directory")
                    .err();
            };
            let storage = FileStorage::open(dir, quota).owe(CoreReason::Storage)?;
            Ok(Box::new(storage))
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryStorage
// ---------------------------------------------------------------------------

/// In-process map that lives as long as the session.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new(quota: Option<usize>) -> Self {
        Self {
            entries: HashMap::new(),
            quota,
        }
    }

    /// Bytes currently used, keys included.
    pub fn used_bytes(&self) -> usize {
        self.entries.iter().map(|(k, v)| k.len() + v.len()).sum()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            let replaced = self.entries.get(key).map_or(0, |v| key.len() + v.len());
            let needed = self.used_bytes() - replaced + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }

    fn size_of(&self, key: &str) -> usize {
        self.entries.get(key).map_or(0, String::len)
    }
}

// ---------------------------------------------------------------------------
// FileStorage
// ---------------------------------------------------------------------------

/// One `<key>.json` file per key under a session directory.
#[derive(Debug)]
pub struct FileStorage {
    dir: PathBuf,
    quota: Option<usize>,
}

impl FileStorage {
    pub fn open(dir: impl AsRef<Path>, quota: Option<usize>) -> io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir, quota })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Remove the session directory and everything in it.
    pub fn teardown(self) -> io::Result<()> {
        match fs::remove_dir_all(&self.dir) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }

    fn used_bytes_except(&self, skip: &Path) -> io::Result<usize> {
        let mut total = 0;
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.path() == skip {
                continue;
            }
            total += entry.metadata()?.len() as usize;
        }
        Ok(total)
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if !self.dir.is_dir() {
            return Err(StorageError::Unavailable(format!(
                "session directory {} is gone",
                self.dir.display()
            )));
        }
        let path = self.path_for(key);
        if let Some(quota) = self.quota {
            let needed = self.used_bytes_except(&path)? + value.len();
            if needed > quota {
                return Err(StorageError::QuotaExceeded { needed, quota });
            }
        }
        // readers never observe a partially written blob
        let tmp = path.with_extension("json.tmp");
        let mut file = fs::File::create(&tmp)?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    fn size_of(&self, key: &str) -> usize {
        fs::metadata(self.path_for(key)).map_or(0, |m| m.len() as usize)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use jl_config::ByteSize;

    use super::*;

    #[test]
    fn memory_roundtrip_and_quota() {
        let mut s = MemoryStorage::new(Some(16));
        s.set("k", "12345").unwrap();
        assert_eq!(s.get("k").unwrap().as_deref(), Some("12345"));
        assert_eq!(s.size_of("k"), 5);
        assert_eq!(s.used_bytes(), 6);

        // replacing a value only counts the new size
        s.set("k", "123456789012345").unwrap();
        let err = s.set("k", "1234567890123456").unwrap_err();
        assert!(err.is_quota());

        s.remove("k").unwrap();
        assert_eq!(s.get("k").unwrap(), None);
        assert_eq!(s.size_of("k"), 0);
    }

    #[test]
    fn memory_without_quota_accepts_anything() {
        let mut s = MemoryStorage::default();
        s.set("big", &"x".repeat(1 << 20)).unwrap();
        assert_eq!(s.size_of("big"), 1 << 20);
    }

    #[test]
    fn file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut s = FileStorage::open(dir.path().join("session"), None).unwrap();
        assert_eq!(s.get("history").unwrap(), None);

        s.set("history", "{\"a\":1}").unwrap();
        assert_eq!(s.get("history").unwrap().as_deref(), Some("{\"a\":1}"));
        assert_eq!(s.size_of("history"), 7);
        assert!(s.dir().join("history.json").exists());

        s.remove("history").unwrap();
        s.remove("history").unwrap();
        assert_eq!(s.get("history").unwrap(), None);
    }

    #[test]
    fn file_quota_and_teardown() {
        let dir = tempfile::tempdir().unwrap();
        let session = dir.path().join("session");
        let mut s = FileStorage::open(&session, Some(10)).unwrap();
        s.set("a", "12345").unwrap();
        s.set("a", "1234567890").unwrap();
        assert!(s.set("b", "1").unwrap_err().is_quota());

        s.teardown().unwrap();
        assert!(!session.exists());
    }

    #[test]
    fn file_storage_unavailable_after_dir_removed() {
        let dir = tempfile::tempdir().unwrap();
        let session = dir.path().join("session");
        let mut s = FileStorage::open(&session, None).unwrap();
        fs::remove_dir_all(&session).unwrap();
        assert!(matches!(
            s.set("k", "v").unwrap_err(),
            StorageError::Unavailable(_)
        ));
    }

    #[test]
    fn open_storage_from_config() {
        let cfg = StorageConfig {
            quota: Some(ByteSize::from(4)),
            ..StorageConfig::default()
        };
        let mut s = open_storage(&cfg).unwrap();
        assert!(s.set("key", "value").unwrap_err().is_quota());

        let dir = tempfile::tempdir().unwrap();
        let cfg = StorageConfig {
            backend: StorageBackend::File,
            dir: Some(dir.path().join("s")),
            quota: None,
        };
        let mut s = open_storage(&cfg).unwrap();
        s.set("key", "value").unwrap();
        assert_eq!(s.size_of("key"), 5);

        let cfg = StorageConfig {
            backend: StorageBackend::File,
            ..StorageConfig::default()
        };
        assert!(open_storage(&cfg).is_err());
    }
}
