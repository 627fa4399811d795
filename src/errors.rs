//! Typed error hierarchy for the Folio control plane.
//!
//! Two enums cover the two places a request can legitimately fail:
//! - `ControlError`: project lookup, state persistence and supervision
//! - `GuardError`: content path validation (see [`crate::guard`])
//!
//! Malformed data found on disk is never an error; readers substitute an
//! empty value instead.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from project controller operations.
#[derive(Debug, Error)]
pub enum ControlError {
    #[error("project not found")]
    ProjectNotFound { name: String },

    #[error("invalid path")]
    InvalidPath(#[from] GuardError),

    #[error("file not found")]
    ContentNotFound { path: String },

    #[error("file is not UTF-8 text")]
    ContentNotText { path: String },

    #[error("Failed to write state file at {path}: {source}")]
    StateWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to lock state file at {path}: {source}")]
    StateLockFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to spawn worker process: {0}")]
    SpawnFailed(#[source] std::io::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Reasons a requested content path is refused.
///
/// Callers must not reveal which rule fired: every variant maps to the same
/// client-visible "invalid path" response.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GuardError {
    #[error("path is empty")]
    Empty,

    #[error("path must be relative: {0}")]
    NotRelative(String),

    #[error("path contains a parent or alternate separator segment: {0}")]
    Traversal(String),

    #[error("path does not have a .{expected} extension: {path}")]
    WrongExtension { path: String, expected: &'static str },

    #[error("path is outside the content folders: {0}")]
    OutsideContentFolders(String),

    #[error("path escapes the project root: {0}")]
    EscapesRoot(String),
}
