//! Core error types for zenith-core.
//!
//! Validation failures are rejected at the mutation boundary and never reach the
//! store. Store failures on reads are recovered by the callers (see
//! [`crate::storage::load_or_default`]); nothing in here is fatal to a tick.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for zenith-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Persistence-related errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Referenced entity does not exist
    #[error("No {kind} with id '{id}'")]
    NotFound { kind: &'static str, id: String },
}

/// Key-value store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(#[from] rusqlite::Error),

    /// Stored value is not valid JSON, or a value could not be encoded
    #[error("Malformed value under '{key}': {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Data directory could not be prepared
    #[error("Data directory unavailable: {0}")]
    DataDir(#[from] std::io::Error),
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

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Validation errors.
///
/// The `Display` text is user facing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Schedule title must not be empty")]
    EmptyTitle,

    #[error("Select at least one day")]
    NoDaysSelected,

    #[error("Day {0} is out of range (expected 0-6, 0 = Sunday)")]
    DayOutOfRange(u8),

    #[error("Day {0} is selected more than once")]
    DuplicateDay(u8),

    #[error("Invalid time '{0}': expected HH:MM")]
    InvalidTimeFormat(String),

    #[error("End time ({end}) must be after start time ({start})")]
    InvalidTimeRange { start: String, end: String },

    #[error("Duration must be a positive number of minutes, got {0}")]
    NonPositiveDuration(i64),

    #[error("Goal target must be positive, got {0}")]
    InvalidGoalTarget(i64),

    #[error("To-do text must not be empty")]
    EmptyTodo,
}

/// A control line for a running driver that could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command '{0}' (try: start, pause, resume, reset, lockout <min>, unlock, duration <min>, mode <mode>, sound <id>, quit)")]
    Unknown(String),

    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),

    #[error("Invalid argument for '{command}': {message}")]
    InvalidArgument {
        command: &'static str,
        message: String,
    },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
