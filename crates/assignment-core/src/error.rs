//! Error types for case assignment operations

use thiserror::Error;

/// Errors produced by the assignment subsystem
#[derive(Debug, Error)]
pub enum AssignmentError {
    /// A required case or agent field was missing, empty or out of range
    #[error("Validation error: {0}")]
    Validation(String),

    /// No online agent was available at selection time
    #[error("No agent available to take the case")]
    NoCapacity,

    /// Referenced record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Data store failure (connectivity, constraint violation, busy)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data store call exceeded the configured timeout
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse classification of an [`AssignmentError`] for callers that only
/// need to decide how to present the failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller input was rejected before touching the store
    Validation,
    /// Retry later; nobody is online
    NoCapacity,
    /// Referenced record does not exist
    NotFound,
    /// Anything unexpected
    Internal,
}

impl ErrorKind {
    /// Stable token used in API error bodies
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::NoCapacity => "no_capacity",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Internal => "internal",
        }
    }
}

impl AssignmentError {
    /// Create a new Validation error
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new NotFound error
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new Timeout error
    pub fn timeout<S: Into<String>>(msg: S) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create a new Config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new Internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// Collapse this error into the caller-facing taxonomy
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NoCapacity => ErrorKind::NoCapacity,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Database(_) | Self::Timeout(_) | Self::Config(_) | Self::Internal(_) => {
                ErrorKind::Internal
            }
        }
    }
}

/// Result type for assignment operations
pub type Result<T> = std::result::Result<T, AssignmentError>;
