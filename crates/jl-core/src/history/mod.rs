//! Bounded, session-persisted undo/redo log of editor snapshots.
//!
//! The log is a list of whole-forest snapshots with a cursor on the state
//! the editor currently shows. Recording a new snapshot discards everything
//! after the cursor; undo and redo only move the cursor.
//!
//! Restoring a snapshot makes the UI re-render, which would echo the
//! restored forest back as a fresh edit. While a restore is settling,
//! [`HistoryManager::save_state`] is suppressed: until [`HistoryManager::resume`]
//! under [`SettleMode::Explicit`], or until the configured delay has passed
//! under [`SettleMode::Delay`].

mod persist;

use std::time::{Duration, Instant};

use jl_config::{HistoryConfig, SettleMode};
use jl_lang::Node;
use orion_error::prelude::*;
use orion_error::ErrorOweBase;
use serde::{Deserialize, Serialize};

use crate::error::{CoreReason, CoreResult};
use crate::storage::{SessionStorage, StorageError};
use persist::{BLOB_VERSION, HistoryBlob, HistoryBlobRef, clamp_cursor};

const INITIAL_DESCRIPTION: &str = "Initial state";
const PROBE_KEY: &str = "jl-storage-probe";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One snapshot of the whole rule forest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorHistoryState {
    #[serde(rename = "rules", alias = "forest")]
    pub forest: Vec<Node>,
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub description: String,
}

/// What `save_state` did with the offered forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Recorded,
    /// Identical to the snapshot at the cursor.
    Unchanged,
    /// A restore is still settling.
    Suppressed,
}

/// Result of the most recent write of the session blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistStatus {
    Saved { bytes: usize },
    /// Storage was exhausted; the oldest `dropped` entries were discarded
    /// before the write succeeded.
    Shrunk { dropped: usize, bytes: usize },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryStats {
    pub total: usize,
    pub current: Option<usize>,
    pub can_undo: bool,
    pub can_redo: bool,
    pub storage_bytes: usize,
    pub capacity: usize,
}

// ---------------------------------------------------------------------------
// HistoryManager
// ---------------------------------------------------------------------------

pub struct HistoryManager {
    config: HistoryConfig,
    storage: Box<dyn SessionStorage>,
    entries: Vec<EditorHistoryState>,
    cursor: Option<usize>,
    /// Set by undo/redo, cleared once the restore has settled.
    restoring_since: Option<Instant>,
    last_persist: Option<PersistStatus>,
}

impl HistoryManager {
    /// Open the log, loading whatever the storage holds under the configured
    /// key. An absent or unreadable blob yields an empty log.
    pub fn open(mut config: HistoryConfig, storage: Box<dyn SessionStorage>) -> Self {
        if config.capacity == 0 {
            log::warn!("history: capacity 0 raised to 1");
            config.capacity = 1;
        }
        let mut manager = Self {
            config,
            storage,
            entries: Vec::new(),
            cursor: None,
            restoring_since: None,
            last_persist: None,
        };
        manager.load();
        manager
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    // -- recording ----------------------------------------------------------

    pub fn save_state(&mut self, forest: &[Node], description: &str) -> SaveOutcome {
        self.save_state_at(forest, description, Instant::now())
    }

    /// [`save_state`](Self::save_state) with an explicit clock, for tests.
    pub fn save_state_at(&mut self, forest: &[Node], description: &str, now: Instant) -> SaveOutcome {
        if self.is_restoring_at(now) {
            log::debug!("history: save {description:?} suppressed during restore");
            return SaveOutcome::Suppressed;
        }
        self.restoring_since = None;
        if let Some(current) = self.current()
            && current.forest == forest
        {
            return SaveOutcome::Unchanged;
        }

        let keep = self.cursor.map_or(0, |c| c + 1);
        self.entries.truncate(keep);
        self.entries.push(EditorHistoryState {
            forest: forest.to_vec(),
            timestamp: now_millis(),
            description: description.to_string(),
        });
        if self.entries.len() > self.config.capacity {
            let excess = self.entries.len() - self.config.capacity;
            self.entries.drain(..excess);
        }
        self.cursor = Some(self.entries.len() - 1);
        log::debug!(
            "history: recorded {description:?} ({}/{})",
            self.entries.len(),
            self.config.capacity
        );

        self.persist_best_effort();
        SaveOutcome::Recorded
    }

    // -- navigation ---------------------------------------------------------

    pub fn undo(&mut self) -> Option<EditorHistoryState> {
        self.undo_at(Instant::now())
    }

    pub fn undo_at(&mut self, now: Instant) -> Option<EditorHistoryState> {
        if !self.can_undo() {
            return None;
        }
        let target = self.cursor? - 1;
        Some(self.move_to(target, now))
    }

    pub fn redo(&mut self) -> Option<EditorHistoryState> {
        self.redo_at(Instant::now())
    }

    pub fn redo_at(&mut self, now: Instant) -> Option<EditorHistoryState> {
        if !self.can_redo() {
            return None;
        }
        let target = self.cursor.map_or(0, |c| c + 1);
        Some(self.move_to(target, now))
    }

    fn move_to(&mut self, index: usize, now: Instant) -> EditorHistoryState {
        self.cursor = Some(index);
        self.restoring_since = Some(now);
        self.persist_best_effort();
        self.entries[index].clone()
    }

    /// End the restore window: the editor has applied the restored forest.
    pub fn resume(&mut self) {
        self.restoring_since = None;
    }

    pub fn is_restoring(&self) -> bool {
        self.is_restoring_at(Instant::now())
    }

    /// Whether a restore started by undo/redo is still settling at `now`.
    pub fn is_restoring_at(&self, now: Instant) -> bool {
        let Some(since) = self.restoring_since else {
            return false;
        };
        match self.config.settle {
            SettleMode::Explicit => true,
            SettleMode::Delay(delay) => {
                now.saturating_duration_since(since) < Duration::from(delay)
            }
        }
    }

    pub fn clear_history(&mut self) {
        self.entries.clear();
        self.cursor = None;
        self.restoring_since = None;
        self.persist_best_effort();
    }

    // -- queries ------------------------------------------------------------

    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|c| c > 0)
    }

    pub fn can_redo(&self) -> bool {
        match self.cursor {
            Some(c) => c + 1 < self.entries.len(),
            None => !self.entries.is_empty(),
        }
    }

    pub fn current(&self) -> Option<&EditorHistoryState> {
        self.entries.get(self.cursor?)
    }

    pub fn current_description(&self) -> &str {
        self.current()
            .map_or(INITIAL_DESCRIPTION, |s| s.description.as_str())
    }

    /// Description of the snapshot an undo would restore.
    pub fn undo_description(&self) -> Option<&str> {
        if !self.can_undo() {
            return None;
        }
        let c = self.cursor?;
        Some(self.entries[c - 1].description.as_str())
    }

    /// Description of the snapshot a redo would restore.
    pub fn redo_description(&self) -> Option<&str> {
        if !self.can_redo() {
            return None;
        }
        let next = self.cursor.map_or(0, |c| c + 1);
        Some(self.entries[next].description.as_str())
    }

    pub fn entries(&self) -> &[EditorHistoryState] {
        &self.entries
    }

    pub fn current_index(&self) -> Option<usize> {
        self.cursor
    }

    pub fn stats(&self) -> HistoryStats {
        HistoryStats {
            total: self.entries.len(),
            current: self.cursor,
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            storage_bytes: self.storage.size_of(&self.config.storage_key),
            capacity: self.config.capacity,
        }
    }

    pub fn last_persist(&self) -> Option<&PersistStatus> {
        self.last_persist.as_ref()
    }

    // -- persistence --------------------------------------------------------

    /// Write the log to storage. When storage reports exhaustion the log is
    /// shrunk to `floor(capacity * shrink_ratio)` newest entries and the
    /// write retried once.
    pub fn persist(&mut self) -> CoreResult<PersistStatus> {
        let blob = self.encode()?;
        let first = match self.storage.set(&self.config.storage_key, &blob) {
            Ok(()) => return Ok(PersistStatus::Saved { bytes: blob.len() }),
            Err(e) => e,
        };
        log::warn!("history: failed to write session blob: {first}");

        if !self.storage_exhausted(&first) {
            return StructError::from(CoreReason::Storage)
                .with_detail(first.to_string())
                .err();
        }

        let dropped = self.shrink();
        log::warn!(
            "history: storage exhausted, dropped {dropped} oldest entries ({} kept)",
            self.entries.len()
        );
        let blob = self.encode()?;
        self.storage
            .set(&self.config.storage_key, &blob)
            .owe(CoreReason::Persist)?;
        Ok(PersistStatus::Shrunk {
            dropped,
            bytes: blob.len(),
        })
    }

    fn persist_best_effort(&mut self) {
        let status = match self.persist() {
            Ok(status) => status,
            Err(e) => {
                log::warn!("history: not persisted: {e}");
                PersistStatus::Failed {
                    reason: e.to_string(),
                }
            }
        };
        self.last_persist = Some(status);
    }

    fn encode(&self) -> CoreResult<String> {
        let blob = HistoryBlobRef {
            history: &self.entries,
            current_index: self.cursor.map_or(-1, |c| c as i64),
            version: BLOB_VERSION,
            saved_at: now_millis(),
        };
        serde_json::to_string(&blob).owe(CoreReason::DataFormat)
    }

    /// Exhaustion is confirmed by a quota error on the write itself or on a
    /// tiny probe write.
    fn storage_exhausted(&mut self, err: &StorageError) -> bool {
        if err.is_quota() {
            return true;
        }
        match self.storage.set(PROBE_KEY, "probe") {
            Ok(()) => {
                if let Err(e) = self.storage.remove(PROBE_KEY) {
                    log::debug!("history: failed to remove storage probe {PROBE_KEY:?}: {e}");
                }
                false
            }
            Err(probe) => probe.is_quota(),
        }
    }

    /// Keep the newest `shrink_target` entries; the cursor follows its
    /// snapshot, or lands on the oldest survivor if that was dropped.
    fn shrink(&mut self) -> usize {
        let keep = self.config.shrink_target();
        let dropped = self.entries.len().saturating_sub(keep);
        self.entries.drain(..dropped);
        self.cursor = clamp_cursor(
            self.cursor.map_or(-1, |c| c as i64) - dropped as i64,
            self.entries.len(),
        );
        dropped
    }

    fn load(&mut self) {
        let key = &self.config.storage_key;
        let raw = match self.storage.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return,
            Err(e) => {
                log::warn!("history: failed to read session blob {key:?}: {e}");
                return;
            }
        };
        let blob: HistoryBlob = match serde_json::from_str(&raw) {
            Ok(blob) => blob,
            Err(e) => {
                log::warn!("history: discarding unreadable session blob {key:?}: {e}");
                return;
            }
        };
        if let Some(version) = &blob.version
            && version != BLOB_VERSION
        {
            log::warn!("history: session blob version {version:?}, expected {BLOB_VERSION:?}");
        }

        let mut entries = blob.history;
        let mut index = blob.current_index;
        if entries.len() > self.config.capacity {
            let excess = entries.len() - self.config.capacity;
            entries.drain(..excess);
            index -= excess as i64;
            log::info!("history: trimmed {excess} entries over capacity on load");
        }
        self.cursor = clamp_cursor(index, entries.len());
        self.entries = entries;
        log::debug!(
            "history: loaded {} entries (cursor {:?}, saved at {:?})",
            self.entries.len(),
            self.cursor,
            blob.saved_at
        );
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
