//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, content loading, configuration,
//! and synchronous cast rejections so clients can bubble them up with
//! consistent context.

use spell_content::LoadError;
use spell_core::{CastError, ErrorSeverity, GameError};
use thiserror::Error;
use tokio::sync::oneshot;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("world worker command channel closed")]
    CommandChannelClosed,

    #[error("world worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("world worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("runtime requires game data to be configured before starting")]
    MissingData,

    #[error("invalid value {value:?} for {var}")]
    InvalidEnv { var: &'static str, value: String },

    #[error(transparent)]
    Cast(#[from] CastError),

    #[error(transparent)]
    Content(#[from] LoadError),
}

impl GameError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Cast(err) => err.severity(),
            Self::Content(err) => err.severity(),
            Self::MissingData | Self::InvalidEnv { .. } => ErrorSeverity::Validation,
            Self::CommandChannelClosed | Self::ReplyChannelClosed(_) | Self::WorkerJoin(_) => {
                ErrorSeverity::Fatal
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::CommandChannelClosed => "RUNTIME_COMMAND_CLOSED",
            Self::ReplyChannelClosed(_) => "RUNTIME_REPLY_CLOSED",
            Self::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
            Self::MissingData => "RUNTIME_MISSING_DATA",
            Self::InvalidEnv { .. } => "RUNTIME_INVALID_ENV",
            Self::Cast(err) => err.error_code(),
            Self::Content(err) => err.error_code(),
        }
    }
}
