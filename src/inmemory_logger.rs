// SPDX-License-Identifier: MIT OR Apache-2.0

//! # In-Memory Logger
//!
//! An in-memory sink for testing and debugging. The `InMemoryLogger` captures
//! rendered lines rather than writing them anywhere, making it ideal for:
//!
//! - Unit testing code that routes through the backend
//! - Programmatically examining log output
//! - Capturing logs where stderr is redirected or unavailable
//!
//! ## Integration
//!
//! The logger implements the [`Logger`] trait and can be attached to a router
//! as an extra sink via [`ConfigBuilder::sink`](crate::ConfigBuilder::sink).

use crate::log_record::LogRecord;
use crate::logger::Logger;
use std::sync::Mutex;

/// An in-memory sink that stores rendered lines in a `Vec<String>`.
///
/// Thread-safe; share it across threads with `Arc`. All operations on the
/// internal buffer are protected by a mutex.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use tierlog::{Config, InMemoryLogger, LogRouter};
///
/// let captured = Arc::new(InMemoryLogger::new());
/// let dir = tempfile::tempdir().expect("tempdir");
///
/// let router = LogRouter::new();
/// router
///     .initialize(
///         Config::builder(dir.path().join("app"))
///             .sink(captured.clone())
///             .build(),
///     )
///     .expect("initialize");
///
/// tierlog::info!(router, "answer is {}", 42);
///
/// let logs = captured.drain_logs();
/// assert!(logs.contains("answer is 42"));
/// ```
#[derive(Debug)]
pub struct InMemoryLogger {
    logs: Mutex<Vec<String>>,
}

// ============================================================================
// BOILERPLATE TRAIT IMPLEMENTATIONS
// ============================================================================
//
// - Debug: Derived for diagnostic purposes and required by Logger
// - Default: Implemented with obvious zero-value (empty log buffer)
// - Clone: NOT implemented - loggers hold a unique capture buffer that
//   shouldn't be duplicated; share with Arc instead
// - PartialEq/Eq/Hash: NOT implemented - equality semantics unclear for sinks
// - Send/Sync: Automatically implemented due to Mutex usage

impl Default for InMemoryLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLogger {
    /// Creates a new `InMemoryLogger` with an empty buffer.
    pub fn new() -> Self {
        Self {
            logs: Mutex::new(Vec::new()),
        }
    }

    /// Drains all captured lines into a single newline-joined string,
    /// clearing the internal buffer.
    pub fn drain_logs(&self) -> String {
        let mut logs = match self.logs.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let result = logs.join("\n");
        logs.clear();
        result
    }

    /// Number of lines currently captured.
    pub fn len(&self) -> usize {
        match self.logs.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// True when nothing has been captured since the last drain.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Logger for InMemoryLogger {
    fn finish_log_record(&self, record: &LogRecord) {
        let line = record.rendered_line().to_owned();
        let mut logs = match self.logs.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        logs.push(line);
    }

    fn prepare_to_die(&self) {
        // No-op since we're storing in memory, no flushing needed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Level;
    use crate::log_record::SourceLocation;

    #[test]
    fn test_capture_and_drain() {
        let logger = InMemoryLogger::new();
        let location = SourceLocation::new(module_path!(), file!(), line!());
        logger.finish_log_record(&LogRecord::new(Level::Info, location, "one".to_owned()));
        logger.finish_log_record(&LogRecord::new(Level::Warn, location, "two".to_owned()));
        assert_eq!(logger.len(), 2);

        let logs = logger.drain_logs();
        assert!(logs.contains("one"));
        assert!(logs.contains("two"));
        assert!(logger.is_empty());
        assert_eq!(logger.drain_logs(), "");
    }
}
