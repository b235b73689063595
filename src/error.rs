// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the logging backend.
//!
//! Initialization is the only surface that reports failure to the caller;
//! everything after it degrades silently (a logging backend must not be able
//! to crash, or recursively log into, the application it instruments).

use std::io;
use std::path::PathBuf;

/// Classification of a filesystem failure.
///
/// The retention sweeper and active-pointer publisher treat every kind as
/// skip-and-continue; the classification exists so that policy is explicit
/// at the call sites instead of buried in ad-hoc `io::Error` matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum FsErrorKind {
    /// The path does not exist.
    #[error("not found")]
    NotFound,
    /// The operation was not permitted.
    #[error("permission denied")]
    PermissionDenied,
    /// The path already exists.
    #[error("already exists")]
    AlreadyExists,
    /// Any other I/O failure.
    #[error("i/o failure")]
    Other,
}

impl From<&io::Error> for FsErrorKind {
    fn from(error: &io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => FsErrorKind::NotFound,
            io::ErrorKind::PermissionDenied => FsErrorKind::PermissionDenied,
            io::ErrorKind::AlreadyExists => FsErrorKind::AlreadyExists,
            _ => FsErrorKind::Other,
        }
    }
}

impl From<io::Error> for FsErrorKind {
    fn from(error: io::Error) -> Self {
        Self::from(&error)
    }
}

/// Failure to bring the logging backend up.
///
/// Surfaced once, from [`LogRouter::initialize`](crate::LogRouter::initialize);
/// the process is expected to continue without logging rather than crash.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    /// Both console and file output are disabled; there is nowhere to write.
    #[error("no output sink configured: console and file logging are both disabled")]
    NoSinkConfigured,

    /// The log directory could not be created.
    #[error("failed to create log directory at {path}: {kind}")]
    CreateDirectory {
        /// The directory that could not be created.
        path: PathBuf,
        /// Classification of the underlying failure.
        kind: FsErrorKind,
    },

    /// A target's initial file could not be opened.
    #[error("failed to open log file at {path}: {kind}")]
    OpenTarget {
        /// The file that could not be opened.
        path: PathBuf,
        /// Classification of the underlying failure.
        kind: FsErrorKind,
    },

    /// A dispatch worker thread could not be started.
    #[error("failed to start dispatch worker: {kind}")]
    WorkerSpawn {
        /// Classification of the underlying failure.
        kind: FsErrorKind,
    },

    /// Initialization already failed once, or the router was shut down;
    /// the lifecycle never re-enters initialization.
    #[error("logging is disabled: initialization already failed or the router was shut down")]
    Disabled,
}
