//! Error types for the log aggregation archive.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while writing or reading an aggregated log archive.
///
/// Per-file security and existence problems never surface here: the
/// collector absorbs them as in-band diagnostics or skips. These
/// variants cover structural failures only.
#[derive(Debug, Error)]
pub enum LogAggError {
    /// The archive file could not be created.
    #[error("failed to create archive at {path}: {source}")]
    Creation {
        /// Destination archive path.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// The archive's permission mode could not be set.
    #[error("failed to set permissions on archive {path}: {source}")]
    Permissions {
        /// Destination archive path.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// `append` was called on a writer that has already been closed.
    #[error("archive writer is closed")]
    WriterClosed,

    /// An empty key was passed to `append`.
    #[error("record key must not be empty")]
    EmptyKey,

    /// The archive contains structurally invalid data.
    #[error("corrupt archive: {0}")]
    Corrupt(String),

    /// A record ended before its declared length was satisfied.
    #[error("truncated record: expected {expected} bytes, got {actual}")]
    TruncatedRecord {
        /// Bytes the record header declared.
        expected: u64,
        /// Bytes actually present.
        actual: u64,
    },

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, LogAggError>;
