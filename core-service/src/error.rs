use bridge_traits::error::BridgeError;
use core_library::LibraryError;
use thiserror::Error;

/// Errors surfaced to callers of the catalog service.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Configuration error: {0}")]
    Config(#[from] core_runtime::Error),

    #[error("Invalid input: {field} - {message}")]
    InvalidInput { field: String, message: String },

    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Duplicate or missing membership, or a write that lost a race.
    /// `retryable` is set when the same call may succeed if repeated.
    #[error("Conflict: {message}")]
    Conflict { message: String, retryable: bool },

    #[error("Storage error: {0}")]
    Storage(#[from] BridgeError),

    #[error("Database error: {0}")]
    Database(String),
}

impl CoreError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, CoreError::Conflict { retryable: true, .. })
    }

    pub(crate) fn not_found(entity_type: &str, id: impl ToString) -> Self {
        CoreError::NotFound {
            entity_type: entity_type.to_string(),
            id: id.to_string(),
        }
    }

    pub(crate) fn invalid_input(field: &str, message: impl Into<String>) -> Self {
        CoreError::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn conflict(message: impl Into<String>) -> Self {
        CoreError::Conflict {
            message: message.into(),
            retryable: false,
        }
    }

    /// Blob failure while reading a song's audio: a missing object is the
    /// song file not existing, anything else is a storage fault.
    pub(crate) fn from_blob_read(err: BridgeError, storage_key: &str) -> Self {
        if err.is_not_found() {
            CoreError::not_found("SongFile", storage_key)
        } else {
            CoreError::Storage(err)
        }
    }
}

impl From<LibraryError> for CoreError {
    fn from(err: LibraryError) -> Self {
        match err {
            LibraryError::InvalidInput { field, message } => {
                CoreError::InvalidInput { field, message }
            }
            LibraryError::NotFound { entity_type, id } => CoreError::NotFound { entity_type, id },
            LibraryError::Conflict {
                entity_type,
                message,
            } => CoreError::Conflict {
                message: format!("{}: {}", entity_type, message),
                retryable: false,
            },
            LibraryError::Busy(message) => CoreError::Conflict {
                message,
                retryable: true,
            },
            LibraryError::Bridge(err) => CoreError::Storage(err),
            LibraryError::Database(err) => CoreError::Database(err.to_string()),
            LibraryError::Migration(message) => CoreError::InitializationFailed(message),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
