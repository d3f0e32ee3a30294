pub mod editor;
pub mod heuristics;
pub mod history;
pub mod logging;
pub mod storage;
pub mod types;
mod validate;

pub use editor::EditorConfig;
pub use heuristics::{ContextRule, HeuristicsConfig};
pub use history::HistoryConfig;
pub use logging::{LogFormat, LoggingConfig};
pub use storage::StorageConfig;
pub use types::{ByteSize, HumanDuration, SettleMode, StorageBackend};
