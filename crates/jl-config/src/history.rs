use serde::Deserialize;

use crate::types::SettleMode;

pub const DEFAULT_CAPACITY: usize = 100;
pub const DEFAULT_SHRINK_RATIO: f64 = 0.7;
pub const DEFAULT_STORAGE_KEY: &str = "jsonlogic-editor-history";

/// `[history]` section. Every field has a default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Maximum number of retained snapshots; the oldest are evicted first.
    pub capacity: usize,
    /// Fraction of `capacity` kept when storage reports exhaustion.
    pub shrink_ratio: f64,
    /// Key under which the history blob is stored.
    pub storage_key: String,
    pub settle: SettleMode,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            shrink_ratio: DEFAULT_SHRINK_RATIO,
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            settle: SettleMode::Explicit,
        }
    }
}

impl HistoryConfig {
    /// Number of entries kept after an emergency shrink, never below one.
    pub fn shrink_target(&self) -> usize {
        ((self.capacity as f64 * self.shrink_ratio).floor() as usize).max(1)
    }
}
