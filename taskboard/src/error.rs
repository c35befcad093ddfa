//! Error types for the task board engine

use thiserror::Error;

/// Result type for board operations
pub type Result<T> = std::result::Result<T, BoardError>;

/// Severity levels for error classification
///
/// - **Warning**: the engine recovered and keeps working (store failures, corrupt data)
/// - **Error**: the requested operation was rejected, nothing changed
/// - **Critical**: the board cannot be set up as configured
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Recovered internally, operation continued
    Warning,
    /// Operation rejected, state unchanged
    Error,
    /// Board cannot be constructed
    Critical,
}

/// Trait for errors that can report their severity
pub trait Severity {
    /// Get the severity level of this error
    fn severity(&self) -> ErrorSeverity;
}

/// Errors that can occur in board operations
#[derive(Debug, Error)]
pub enum BoardError {
    /// Title is empty after trimming
    #[error("task title must not be empty")]
    EmptyTitle,

    /// Status is not part of the configured workflow
    #[error("unknown status: {status}")]
    UnknownStatus { status: String },

    /// Priority is not part of the configured priority set
    #[error("unknown priority: {priority}")]
    UnknownPriority { priority: String },

    /// A filter or sort name is not recognized
    #[error("invalid {kind} '{value}': expected {expected}")]
    InvalidValue {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },

    /// Task not found
    #[error("task not found: {id}")]
    TaskNotFound { id: String },

    /// Persisted value exists but cannot be decoded
    #[error("corrupt value under '{key}': {message}")]
    CorruptState { key: String, message: String },

    /// The backing store could not be read or written
    #[error("store unavailable for '{key}': {message}")]
    StoreUnavailable { key: String, message: String },

    /// Board configuration is inconsistent
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Configuration could not be extracted from its sources
    #[error("configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BoardError {
    /// Create an invalid configuration error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    /// Create a store unavailable error
    pub fn store(key: impl Into<String>, message: impl ToString) -> Self {
        Self::StoreUnavailable {
            key: key.into(),
            message: message.to_string(),
        }
    }

    /// Create a corrupt state error
    pub fn corrupt(key: impl Into<String>, message: impl ToString) -> Self {
        Self::CorruptState {
            key: key.into(),
            message: message.to_string(),
        }
    }

    /// Create a task not found error
    pub fn not_found(id: impl ToString) -> Self {
        Self::TaskNotFound { id: id.to_string() }
    }

    /// Environment failures the engine absorbs instead of reporting to the caller
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::CorruptState { .. } | Self::StoreUnavailable { .. } | Self::Io(_)
        )
    }
}

impl From<figment::Error> for BoardError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl Severity for BoardError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            BoardError::CorruptState { .. }
            | BoardError::StoreUnavailable { .. }
            | BoardError::Io(_) => ErrorSeverity::Warning,

            BoardError::EmptyTitle
            | BoardError::UnknownStatus { .. }
            | BoardError::UnknownPriority { .. }
            | BoardError::InvalidValue { .. }
            | BoardError::TaskNotFound { .. }
            | BoardError::Json(_) => ErrorSeverity::Error,

            BoardError::InvalidConfig { .. } | BoardError::Config(_) => ErrorSeverity::Critical,
        }
    }
}
