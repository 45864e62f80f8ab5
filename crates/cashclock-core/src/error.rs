//! Core error types for cashclock-core.
//!
//! Every fallible operation in the library reports one of the enums below,
//! and they all fold into [`CoreError`] so callers can use `?` across
//! module boundaries.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for cashclock-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Snapshot decoding errors
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Peer sync errors
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while parsing an encoded snapshot string.
///
/// Each variant names the part of `<persons>x<cost>$x<secs>s=<total>$ (<state>)`
/// that could not be read.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("snapshot is empty")]
    Empty,

    #[error("missing separator '{separator}' in snapshot '{input}'")]
    MissingSeparator { separator: &'static str, input: String },

    #[error("invalid {field} '{value}'")]
    InvalidNumber { field: &'static str, value: String },

    #[error("number of persons must be at least 1")]
    NoPersons,

    #[error("unknown state token '{0}'")]
    UnknownState(String),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Key does not exist in the configuration tree
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Data directory could not be prepared
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Peer link errors.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The other half of the link is gone
    #[error("Peer channel closed")]
    ChannelClosed,

    /// Writing to the transport failed
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),

    /// Message could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Sync was switched off in configuration
    #[error("Peer sync is disabled")]
    Disabled,
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_converts_into_core_error() {
        let err: CoreError = DecodeError::UnknownState("pause".into()).into();
        assert!(matches!(err, CoreError::Decode(DecodeError::UnknownState(_))));
        assert_eq!(err.to_string(), "Decode error: unknown state token 'pause'");
    }

    #[test]
    fn missing_row_is_query_failure() {
        let err: DatabaseError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, DatabaseError::QueryFailed(_)));
    }
}
