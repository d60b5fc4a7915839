//! Error types for coursechat
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for coursechat operations
///
/// Backend failures are split by kind so that callers which care (the
/// session list treats a missing chat as already deleted) can tell them
/// apart with `downcast_ref`. Everything else is surfaced to the user as a
/// single message string.
#[derive(Error, Debug)]
pub enum CourseChatError {
    /// Configuration-related errors, including values missing at first use
    #[error("Configuration error: {0}")]
    Config(String),

    /// Backend answered with a non-success HTTP status
    #[error("HTTP error! status: {status}: {message}")]
    Api {
        /// HTTP status code returned by the backend
        status: u16,
        /// Message extracted from the response body
        message: String,
    },

    /// Backend reported that the requested resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Request never produced a response (connection refused, timeout, ...)
    #[error("Network error: {0}")]
    Transport(String),

    /// Response body did not match the expected wire schema
    #[error("Failed to parse response: {0}")]
    Decode(String),

    /// User input that cannot be acted on (empty question, unknown chat id)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed; the message is already user-facing
    #[error("{0}")]
    Operation(String),

    /// The in-memory chat store cannot be used
    #[error("Chat store error: {0}")]
    Store(String),

    /// Terminal input errors
    #[error("Readline error: {0}")]
    Readline(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP client construction errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for coursechat operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

/// Returns true when `err` wraps [`CourseChatError::NotFound`]
pub fn is_not_found(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<CourseChatError>(),
        Some(CourseChatError::NotFound(_))
    )
}
