//! Error types for the enumeration engine.

use thiserror::Error;

/// Catch-all error for this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// `n` was negative, a grid dimension exceeded 255 or was zero, or an archive
    /// header described an impossible shape.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The archive was malformed: bad magic, truncated record, invalid enum value,
    /// or a gzip stream that failed to decode.
    #[error("archive corrupt: {0}")]
    ArchiveCorrupt(String),
    /// Reading or writing the archive or cache failed at the filesystem layer.
    #[error("I/O failure: {0}")]
    IoFailure(#[from] std::io::Error),
    /// A worker task in a parallel dispatch failed; carries the first failure seen.
    #[error("worker failure: {0}")]
    WorkerFailure(String),
    /// Allocation failed while materializing a tier; implementation-defined and may
    /// be unrecoverable.
    #[error("resource exhausted: {0}")]
    ResourceExhausted(String),
    /// Error that does not originate from this crate.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;
