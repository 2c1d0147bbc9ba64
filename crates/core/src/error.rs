//! Error types for Concierge.
//!
//! This module defines a unified error enum that covers every failure category
//! in the assistant: configuration, I/O, completion calls, prompts, the
//! structured store, the retrieval index and orchestration.

use thiserror::Error;

/// Unified error type for Concierge.
///
/// All fallible functions return `Result<T, AppError>`. Failures are
/// represented and propagated, never panicked on.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Completion service errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Prompt loading and rendering errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Structured store errors
    #[error("Database error: {0}")]
    Database(String),

    /// Retrieval index and embedding errors
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Orchestration errors
    #[error("Agent error: {0}")]
    Agent(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
