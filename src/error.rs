//! Structured error types for path validation and host communication.
//!
//! Parsing never produces an error: content that no parser understands
//! degrades to opaque text. Only structural path problems and transport
//! failures surface here.

use serde::Serialize;
use std::fmt;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation errors
    InvalidPath,

    // Connection errors
    InvalidConnection,
    MissingKeyfile,
    CommandFailed,

    // Local I/O
    Io,
}

/// Structured error for migration operations.
#[derive(Debug, Serialize, thiserror::Error)]
#[error("{message}")]
pub struct MigrateError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl MigrateError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            path: None,
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    // Convenience constructors

    pub fn invalid_path(path: &str) -> Self {
        Self::new(ErrorCode::InvalidPath, format!("Invalid path: {:?}", path)).with_path(path)
    }

    pub fn not_absolute(path: &str) -> Self {
        Self::new(
            ErrorCode::InvalidPath,
            format!("Expected an absolute path, got {:?}", path),
        )
        .with_path(path)
    }

    pub fn invalid_connection(reason: &str) -> Self {
        Self::new(
            ErrorCode::InvalidConnection,
            format!("Invalid connection: {}", reason),
        )
    }

    pub fn missing_keyfile(path: &str) -> Self {
        Self::new(
            ErrorCode::MissingKeyfile,
            format!("Key file not found: {}", path),
        )
        .with_path(path)
    }

    pub fn command_failed(cmd: &str, detail: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::CommandFailed,
            format!("Command `{}` failed: {}", cmd, detail),
        )
    }

    pub fn io(err: impl fmt::Display) -> Self {
        Self::new(ErrorCode::Io, err.to_string())
    }
}

impl From<std::io::Error> for MigrateError {
    fn from(err: std::io::Error) -> Self {
        MigrateError::io(err)
    }
}

/// Result type for migration operations.
pub type MigrateResult<T> = std::result::Result<T, MigrateError>;
