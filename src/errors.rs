//! Error types for the jackpot service
//!
//! Domain failures (bad input, unknown jackpot) are expected and local to a
//! request. Storage and configuration failures are the only ones an operator
//! needs to look at.

use std::fmt;
use uuid::Uuid;

/// Root error type for all jackpot operations
#[derive(Debug, thiserror::Error)]
pub enum JackpotError {
    #[error("{0}")]
    InvalidBetAmount(String),

    #[error("{0}")]
    InvalidJackpotDefinition(String),

    #[error("{0}")]
    InvalidRequest(String),

    #[error("Jackpot not found with ID: {0}")]
    JackpotNotFound(Uuid),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
}

impl JackpotError {
    /// True for failures caused by the caller's input rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            JackpotError::InvalidBetAmount(_)
                | JackpotError::InvalidJackpotDefinition(_)
                | JackpotError::InvalidRequest(_)
                | JackpotError::JackpotNotFound(_)
        )
    }
}

/// Storage system errors
#[derive(Debug)]
pub enum StorageError {
    DatabaseOpenFailed(String),
    ReadFailed(String),
    WriteFailed(String),
    CommitFailed(String),
    CorruptedData(String),
}

/// Configuration and validation errors
#[derive(Debug)]
pub enum ConfigurationError {
    InvalidValue { field: String, value: String, reason: String },
    LoadFailed(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::DatabaseOpenFailed(msg) => write!(f, "Database open failed: {}", msg),
            StorageError::ReadFailed(msg) => write!(f, "Read failed: {}", msg),
            StorageError::WriteFailed(msg) => write!(f, "Write failed: {}", msg),
            StorageError::CommitFailed(msg) => write!(f, "Commit failed: {}", msg),
            StorageError::CorruptedData(msg) => write!(f, "Corrupted data: {}", msg),
        }
    }
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigurationError::InvalidValue { field, value, reason } => {
                write!(f, "Invalid value for {}: '{}' ({})", field, value, reason)
            }
            ConfigurationError::LoadFailed(msg) => write!(f, "Failed to load configuration: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {}
impl std::error::Error for ConfigurationError {}

// Convenience type alias for Results
pub type JackpotResult<T> = Result<T, JackpotError>;
