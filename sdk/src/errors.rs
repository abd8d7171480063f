//! Error types and handling
//!
//! This module provides the error types used throughout the Relay engine.
//! All errors implement the `RelayErrorExt` trait which provides user-friendly
//! hints and indicates whether errors are recoverable.
//!
//! # Security
//!
//! Error messages never carry credentials. Provider and memory adapters
//! redact API keys before an error reaches this type.

use thiserror::Error;

/// Trait for Relay error extensions
///
/// Provides additional context for errors: a hint that is safe to show to a
/// caller of the HTTP surface, and whether retrying the operation can help.
pub trait RelayErrorExt {
    /// Returns a user-friendly hint for the error
    fn user_hint(&self) -> &str;

    /// Returns whether the error is recoverable
    fn is_recoverable(&self) -> bool;
}

/// Main engine error type
///
/// Only `InvalidInput` ever aborts a chat turn. Provider and memory failures
/// are contained by their adapters and degrade the turn instead, so the
/// remaining variants surface from startup, the CLI and the auxiliary
/// endpoints.
///
/// # Examples
///
/// ```
/// use sdk::errors::{EngineError, RelayErrorExt};
///
/// let error = EngineError::InvalidInput("message is required".to_string());
/// assert_eq!(error.user_hint(), "The request is missing a required field");
/// assert!(error.is_recoverable());
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Client input errors
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Upstream service errors (transcription, status probes)
    #[error("Upstream service error: {0}")]
    Upstream(String),

    // Network errors
    #[error("Network error: {0}")]
    Network(String),

    // Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RelayErrorExt for EngineError {
    fn user_hint(&self) -> &str {
        match self {
            Self::Config(_) => "Check your config.toml file for errors",
            Self::InvalidInput(_) => "The request is missing a required field",
            Self::Upstream(_) => "An upstream service returned an error",
            Self::Network(_) => "Network operation failed. Check your connection",
            Self::Io(_) => "File system operation failed",
        }
    }

    fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Config(_))
    }
}
