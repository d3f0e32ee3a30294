pub mod convert;
pub mod error;
pub mod history;
pub mod storage;

pub use convert::{ConversionOption, Converter};
pub use error::{CoreError, CoreReason, CoreResult};
pub use history::{EditorHistoryState, HistoryManager, HistoryStats, PersistStatus, SaveOutcome};
pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageError, open_storage};
