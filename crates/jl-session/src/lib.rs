#[macro_use]
mod log_macros;

pub mod error;
pub mod session;
pub mod tracing_init;

pub use error::{SessionError, SessionReason, SessionResult};
pub use session::EditorSession;
pub use tracing_init::init_tracing;
