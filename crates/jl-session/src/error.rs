use derive_more::From;
use jl_core::error::CoreReason;
use orion_error::{ErrorCode, StructError, UvsReason};

#[derive(Debug, Clone, PartialEq, thiserror::Error, From)]
pub enum SessionReason {
    #[error("session bootstrap error")]
    Bootstrap,
    #[error("node not found")]
    NodeNotFound,
    #[error("JsonLogic codec error")]
    Codec,
    #[error("{0}")]
    Core(CoreReason),
    #[error("{0}")]
    Uvs(UvsReason),
}

impl ErrorCode for SessionReason {
    fn error_code(&self) -> i32 {
        match self {
            Self::Bootstrap => 2001,
            Self::NodeNotFound => 2002,
            Self::Codec => 2003,
            Self::Core(c) => c.error_code(),
            Self::Uvs(u) => u.error_code(),
        }
    }
}

pub type SessionError = StructError<SessionReason>;
pub type SessionResult<T> = Result<T, SessionError>;
