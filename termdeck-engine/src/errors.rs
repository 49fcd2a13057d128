use thiserror::Error;

use crate::session::SessionKind;

/// Errors returned to callers of the session manager.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Validation failed: {message}")]
    Validation { message: String },
    #[error("connection not found: {id}")]
    ConnectionNotFound { id: String },
    #[error("session not found: {id}")]
    SessionNotFound { id: String },
    #[error("session {id} is not a {expected} session")]
    WrongSessionKind { id: String, expected: SessionKind },
}

impl EngineError {
    pub(crate) fn validation(message: &str) -> Self {
        EngineError::Validation {
            message: String::from(message),
        }
    }
}

/// Errors emitted while reading or writing the key-value store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage IO failed")]
    Io(#[from] std::io::Error),
    #[error("storage JSON failed")]
    Json(#[from] serde_json::Error),
    #[error("invalid storage key: {key}")]
    InvalidKey { key: String },
}
