//! Error types and handling infrastructure for stlvr.
//!
//! This module provides a centralized error handling system using `thiserror` for
//! custom error types. The binary layers `anyhow` on top for context.
//!
//! ## Design Principles
//!
//! - **Structural misses are not errors**: out-of-range tree addressing yields an
//!   empty value, never a `ViewerError`
//! - **Initialization errors propagate**: a failed render context surfaces from
//!   `RenderCoordinator::start`
//! - **Misuse is loud**: staging into a live scene is rejected, not ignored

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for stlvr operations.
#[derive(Error, Debug)]
pub enum ViewerError {
    /// File system related errors (permission denied, read failures, etc.)
    #[error("File operation failed: {message}")]
    FileError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// File not found specifically (common case for user feedback)
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Geometry file could not be parsed
    #[error("Invalid model file {path}: {message}")]
    Format { path: PathBuf, message: String },

    /// Render window, device or interactor could not be acquired
    #[error("Render initialization failed: {message}")]
    Initialization { message: String },

    /// Scene mutation attempted from outside the coordinator while it is live
    #[error("Rejected while coordinator is {state}: {message}")]
    ConcurrencyMisuse { state: String, message: String },

    /// `start` called on a coordinator that is not idle
    #[error("Coordinator already running")]
    AlreadyRunning,

    /// Coordinator thread ended abnormally
    #[error("Coordinator failure: {message}")]
    Coordinator { message: String },

    /// Node handle does not belong to the tree
    #[error("Unknown scene node: {id}")]
    InvalidNode { id: usize },

    /// Configuration related errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Generic error for cases not covered by specific variants
    #[error("Operation failed: {message}")]
    Other { message: String },
}

/// Standard Result type for stlvr operations.
pub type Result<T> = std::result::Result<T, ViewerError>;

impl ViewerError {
    /// Create a FileError from an io::Error with additional context
    pub fn file_error(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileError {
            message: message.into(),
            source,
        }
    }

    /// Create a Format error for a model file
    pub fn format(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Format {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an Initialization error with a descriptive message
    pub fn initialization(message: impl Into<String>) -> Self {
        Self::Initialization {
            message: message.into(),
        }
    }

    pub fn concurrency_misuse(state: impl ToString, message: impl Into<String>) -> Self {
        Self::ConcurrencyMisuse {
            state: state.to_string(),
            message: message.into(),
        }
    }

    pub fn coordinator(message: impl Into<String>) -> Self {
        Self::Coordinator {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a generic Other error with a descriptive message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

// Automatic conversion from io::Error to ViewerError
impl From<std::io::Error> for ViewerError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::FileError {
                message: "File not found".to_string(),
                source: err,
            },
            std::io::ErrorKind::PermissionDenied => Self::FileError {
                message: "Permission denied".to_string(),
                source: err,
            },
            _ => Self::FileError {
                message: "IO operation failed".to_string(),
                source: err,
            },
        }
    }
}
