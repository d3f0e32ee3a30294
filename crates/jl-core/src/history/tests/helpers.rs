use std::sync::{Arc, Mutex};

use jl_config::HistoryConfig;
use jl_lang::Node;

use crate::history::HistoryManager;
use crate::storage::{MemoryStorage, SessionStorage, StorageError};

pub const KEY: &str = "jsonlogic-editor-history";

/// A one-rule forest with fixed ids, so equal tags compare equal.
pub fn forest(tag: &str) -> Vec<Node> {
    vec![
        Node::expression(
            "==",
            vec![
                Node::variable("person.firstName").with_id("var".into()),
                Node::literal(tag).with_id("lit".into()),
            ],
        )
        .with_id("root".into()),
    ]
}

pub fn manager() -> HistoryManager {
    HistoryManager::open(HistoryConfig::default(), Box::new(MemoryStorage::default()))
}

pub fn manager_on(storage: &SharedStorage, config: HistoryConfig) -> HistoryManager {
    HistoryManager::open(config, Box::new(storage.clone()))
}

pub fn descriptions(m: &HistoryManager) -> Vec<&str> {
    m.entries().iter().map(|e| e.description.as_str()).collect()
}

/// Memory storage that outlives the manager owning it.
#[derive(Clone, Default)]
pub struct SharedStorage(Arc<Mutex<MemoryStorage>>);

impl SharedStorage {
    pub fn with_blob(blob: &str) -> Self {
        let storage = Self::default();
        storage.0.lock().unwrap().set(KEY, blob).unwrap();
        storage
    }

    pub fn blob(&self) -> Option<serde_json::Value> {
        let raw = self.0.lock().unwrap().get(KEY).unwrap()?;
        Some(serde_json::from_str(&raw).unwrap())
    }
}

impl SessionStorage for SharedStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.0.lock().unwrap().get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.0.lock().unwrap().set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.0.lock().unwrap().remove(key)
    }

    fn size_of(&self, key: &str) -> usize {
        self.0.lock().unwrap().size_of(key)
    }
}

/// Rejects any blob holding more than `max_entries` snapshots.
pub struct CappedStorage {
    pub inner: MemoryStorage,
    pub max_entries: usize,
}

impl SessionStorage for CappedStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let entries = serde_json::from_str::<serde_json::Value>(value)
            .ok()
            .and_then(|v| v["history"].as_array().map(Vec::len))
            .unwrap_or(0);
        if entries > self.max_entries {
            return Err(StorageError::QuotaExceeded {
                needed: value.len(),
                quota: 0,
            });
        }
        self.inner.set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }

    fn size_of(&self, key: &str) -> usize {
        self.inner.size_of(key)
    }
}

/// Storage whose every write fails without a quota error.
pub struct BrokenStorage;

impl SessionStorage for BrokenStorage {
    fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("disk detached".to_string()))
    }

    fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
        Ok(())
    }

    fn size_of(&self, _key: &str) -> usize {
        0
    }
}

/// Rejects the session blob, accepts the health probe, then fails to
/// remove it again.
#[derive(Default)]
pub struct StickyProbeStorage {
    pub inner: MemoryStorage,
}

impl SessionStorage for StickyProbeStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if key == KEY {
            return Err(StorageError::Unavailable("read-only mount".to_string()));
        }
        self.inner.set(key, value)
    }

    fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("read-only mount".to_string()))
    }

    fn size_of(&self, key: &str) -> usize {
        self.inner.size_of(key)
    }
}
