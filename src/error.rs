//! Error Handling Infrastructure
//!
//! This module defines all error types used throughout emptrack.
//! Every error maps to a stable error code and a one-line message that the
//! interactive controller prints before returning to the menu.
//!
//! # Error Categories
//! - `Configuration`: Missing or invalid connection settings (fatal)
//! - `ConnectionFailed`: Database unreachable at startup (fatal)
//! - `Validation`: Rejected user input, recovered by re-prompting
//! - `NotFound`: Update/delete target no longer exists
//! - `Database`: Constraint violations, lost connectivity, failed statements
//! - `Prompt`: The terminal prompt could not be read (fatal)
//! - `Io`: Console output could not be written (fatal)

use thiserror::Error;

/// Main error type for emptrack operations
#[derive(Error, Debug)]
pub enum TrackerError {
    /// Missing or invalid connection settings
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Database connection could not be established
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// User input rejected by validation
    #[error("{0}")]
    Validation(String),

    /// Target row does not exist (anymore)
    #[error("{0}")]
    NotFound(String),

    /// Statement failed inside the database or driver
    #[error("Database error: {0}")]
    Database(String),

    /// Interactive prompt failed (closed stdin, interrupted terminal)
    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    /// Console output failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TrackerError {
    /// Convert error to a stable error code string
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIG_ERROR",
            Self::ConnectionFailed(_) => "CONNECTION_FAILED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Prompt(_) => "PROMPT_FAILED",
            Self::Io(_) => "IO_ERROR",
        }
    }

    /// Get the human-readable, single-line error message
    ///
    /// Never contains the database password.
    #[must_use]
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Whether the interactive loop must stop on this error
    ///
    /// Not-found and database errors are reported and the menu is shown again.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Configuration(_) | Self::ConnectionFailed(_) | Self::Prompt(_) | Self::Io(_)
        )
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a connection failed error
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::ConnectionFailed(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a not-found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database(message.into())
    }
}

/// Result type alias for emptrack operations
pub type Result<T> = std::result::Result<T, TrackerError>;
