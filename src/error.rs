//! Error types for tabchat.
//!
//! Defines the main error enum used throughout the application.

use thiserror::Error;

/// Main error type for tabchat operations.
#[derive(Error, Debug)]
pub enum ChatError {
    /// Data loading errors (missing file, unreadable format, empty sheet).
    #[error("Data error: {0}")]
    Data(String),

    /// LLM API errors (service unreachable, timeouts, malformed replies).
    #[error("LLM error: {0}")]
    Llm(String),

    /// Query errors (unparseable program, unknown column, bad verb).
    #[error("Query error: {0}")]
    Query(String),

    /// Configuration errors (invalid config file, bad field values).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal application errors (unexpected states, bugs).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ChatError {
    /// Creates a data error with the given message.
    pub fn data(msg: impl Into<String>) -> Self {
        Self::Data(msg.into())
    }

    /// Creates an LLM error with the given message.
    pub fn llm(msg: impl Into<String>) -> Self {
        Self::Llm(msg.into())
    }

    /// Creates a query error with the given message.
    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    /// Creates a configuration error with the given message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates an internal error with the given message.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Returns the error category as a string for display purposes.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Data(_) => "Data Error",
            Self::Llm(_) => "LLM Error",
            Self::Query(_) => "Query Error",
            Self::Config(_) => "Configuration Error",
            Self::Internal(_) => "Internal Error",
        }
    }
}

/// Result type alias using ChatError.
pub type Result<T> = std::result::Result<T, ChatError>;
