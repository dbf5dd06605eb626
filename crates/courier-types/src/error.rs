//! Error types for Courier
//!
//! Defines all error types used throughout the application.

use thiserror::Error;

/// Main error type for Courier operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Queue not found
    #[error("Queue not found: {0}")]
    QueueNotFound(String),

    /// Queue already exists
    #[error("Queue already exists: {0}")]
    QueueAlreadyExists(String),

    /// Topic not found
    #[error("Topic not found: {0}")]
    TopicNotFound(String),

    /// Topic already exists
    #[error("Topic already exists: {0}")]
    TopicAlreadyExists(String),

    /// Malformed or incomplete request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The transport cannot carry a live stream
    #[error("Streaming unsupported: {0}")]
    StreamingUnsupported(String),
}

impl Error {
    /// True for the name-collision variants
    pub fn is_already_exists(&self) -> bool {
        matches!(
            self,
            Error::QueueAlreadyExists(_) | Error::TopicAlreadyExists(_)
        )
    }
}

/// Result type alias for Courier operations
pub type Result<T> = std::result::Result<T, Error>;
