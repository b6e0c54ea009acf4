//! Error types for the blobtrace history search.

use crate::types::{ContentHash, EntryPath, RevisionId};
use thiserror::Error;

/// Errors raised by the object collaborators (snapshot resolution, entry lookup,
/// object inspection).
#[derive(Debug, Error)]
pub enum ObjectError {
    #[error("Invalid object id: {0:?}")]
    InvalidId(String),

    #[error("Invalid path: {0:?}")]
    InvalidPath(String),

    #[error("Revision not found: {0}")]
    RevisionNotFound(RevisionId),

    #[error("Path not found in snapshot: {0}")]
    PathNotFound(EntryPath),

    #[error("Malformed output from {command}: {detail}")]
    Malformed { command: String, detail: String },

    #[error("Command `{command}` failed ({status}): {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("Object I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Ways the revision listing can end other than success.
#[derive(Debug, Error)]
pub enum SourceFailure {
    /// The read end of the stream went away while the listing was still writing.
    /// Expected whenever the scanner stops early.
    #[error("revision stream reader closed")]
    ReaderClosed,

    #[error("failed to start revision listing: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("revision listing exited with {status}")]
    Exited { status: String },

    #[error("revision listing I/O error: {0}")]
    Io(#[source] std::io::Error),
}

impl SourceFailure {
    /// True when the failure is only the producer noticing the scanner hung up.
    pub fn is_reader_closed(&self) -> bool {
        matches!(self, SourceFailure::ReaderClosed)
    }
}

/// Faults of the streaming machinery itself.
#[derive(Debug, Error)]
pub enum InternalScanError {
    #[error("failed to read revision stream: {0}")]
    Read(#[source] std::io::Error),

    #[error("malformed revision line: {0:?}")]
    MalformedLine(String),

    #[error("scanner panicked: {0}")]
    Panicked(String),

    #[error("scanner exited without reporting")]
    CompletionLost,
}

/// Failure kinds of one history search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("No revision holds {hash} at {path}")]
    NotFound { hash: ContentHash, path: EntryPath },

    #[error("Failed to resolve revision {revision}: {source}")]
    Resolution {
        revision: RevisionId,
        #[source]
        source: ObjectError,
    },

    #[error("Revision listing failed: {failure}{}", format_diagnostics(.diagnostics))]
    Source {
        #[source]
        failure: SourceFailure,
        diagnostics: String,
    },

    #[error("Internal scan error: {0}")]
    InternalScan(#[from] InternalScanError),
}

fn format_diagnostics(diagnostics: &str) -> String {
    let trimmed = diagnostics.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(" - {}", trimmed)
    }
}

/// Top-level errors for the library facade and the CLI.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid content hash: {0}")]
    InvalidHash(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Not a repository: {0}")]
    NotARepository(std::path::PathBuf),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Object error: {0}")]
    ObjectError(#[from] ObjectError),

    #[error("{0}")]
    SearchError(#[from] SearchError),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
