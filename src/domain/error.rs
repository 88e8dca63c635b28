//! Error types for the pageshell crate.
//!
//! This module defines the centralized error type [`ShellError`] for
//! configuration and I/O failures, plus [`ControllerError`], the error a
//! controller reports from its own life-cycle operations. Transition failures
//! have their own cloneable type in [`crate::app::transition`] because a
//! settled transition is observed by several waiters at once.

use thiserror::Error;

/// The main error type for shell setup operations.
///
/// Covers everything that can go wrong before the first navigation: reading
/// and parsing configuration, and building the route table from it.
///
/// # Examples
///
/// ```
/// use pageshell::ShellError;
///
/// fn validate_route(pattern: &str) -> Result<(), ShellError> {
///     if pattern.contains(' ') {
///         return Err(ShellError::Config(format!("route pattern {pattern:?} contains a space")));
///     }
///     Ok(())
/// }
///
/// assert!(validate_route("users/:id").is_ok());
/// assert!(validate_route("bad route").is_err());
/// ```
#[derive(Debug, Error)]
pub enum ShellError {
    /// Configuration is invalid or missing.
    ///
    /// The string describes the specific configuration problem.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem or I/O operation failed.
    ///
    /// Wraps errors from standard library I/O operations, typically while
    /// reading a configuration file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML configuration could not be parsed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON configuration could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Error reported by a controller's `start`, `unload` or `destroy`.
///
/// Controllers live outside this crate, so the error carries only a
/// human-readable message. It is `Clone` because it ends up inside a
/// transition outcome shared between waiters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ControllerError {
    message: String,
}

impl ControllerError {
    /// Creates a controller error from any displayable message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message the controller reported.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A specialized `Result` type for shell setup operations.
pub type Result<T> = std::result::Result<T, ShellError>;
