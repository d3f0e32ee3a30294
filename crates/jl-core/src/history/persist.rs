//! Session blob layout:
//!
//! ```json
//! { "history": [{ "rules": [...], "timestamp": 0, "description": "Edit" }],
//!   "currentIndex": 0, "version": "1.0", "savedAt": 0 }
//! ```
//!
//! `currentIndex` is `-1` for an empty log.

use serde::{Deserialize, Serialize};

use super::EditorHistoryState;

pub(super) const BLOB_VERSION: &str = "1.0";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct HistoryBlobRef<'a> {
    pub history: &'a [EditorHistoryState],
    pub current_index: i64,
    pub version: &'static str,
    pub saved_at: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct HistoryBlob {
    #[serde(default)]
    pub history: Vec<EditorHistoryState>,
    #[serde(default = "no_index")]
    pub current_index: i64,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub saved_at: Option<i64>,
}

fn no_index() -> i64 {
    -1
}

/// Cursor for a loaded log of `len` entries, clamped into `[0, len - 1]`.
pub(super) fn clamp_cursor(current_index: i64, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let max = len - 1;
    Some(usize::try_from(current_index).map_or(0, |i| i.min(max)))
}
