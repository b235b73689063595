// SPDX-License-Identifier: MIT OR Apache-2.0

//! Log record type for the tierlog logging backend.
//!
//! This module defines [`LogRecord`], the immutable value that travels from a
//! producer thread through the router to every sink, and [`SourceLocation`],
//! the call-site tag captured by the front-end macros.
//!
//! # Design Philosophy
//!
//! A record is rendered to its final line form at most once, no matter how
//! many sinks observe it: the rendering is memoized in the record itself.
//! The renderer pre-computes the line length and allocates the output buffer
//! once, so fan-out to several tier files does not multiply formatting work.

use crate::Level;
use chrono::{DateTime, Local};
use std::fmt::{self, Display};
use std::sync::OnceLock;

/// Message body used when rendering the caller's format arguments fails.
const FORMAT_FALLBACK: &str = "format error";

/// Identifies the code location that produced a record.
///
/// Constructed by the logging macros from `module_path!()`, `file!()` and
/// `line!()`; rarely built by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    module: &'static str,
    file: &'static str,
    line: u32,
}

impl SourceLocation {
    pub const fn new(module: &'static str, file: &'static str, line: u32) -> Self {
        Self { module, file, line }
    }

    /// Module path of the call site.
    pub const fn module(&self) -> &'static str {
        self.module
    }

    /// Source file of the call site.
    pub const fn file(&self) -> &'static str {
        self.file
    }

    /// Line number of the call site.
    pub const fn line(&self) -> u32 {
        self.line
    }

    /// Trailing path component of the source file.
    fn basename(&self) -> &'static str {
        self.file.rsplit(['/', '\\']).next().unwrap_or(self.file)
    }
}

impl Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.basename(), self.line)
    }
}

/**
A complete log record.

Carries the severity, the wall-clock timestamp, the producing thread's
identifier, the call-site location and the already-formatted message body.
Immutable once constructed; owned by the producing call stack, or by the
async dispatch queue when asynchronous dispatch is configured.
*/
#[derive(Debug)]
pub struct LogRecord {
    level: Level,
    timestamp: DateTime<Local>,
    thread: String,
    location: SourceLocation,
    message: String,
    rendered: OnceLock<String>,
}

impl LogRecord {
    /// Creates a record from an already-formatted message body.
    pub fn new(level: Level, location: SourceLocation, message: String) -> Self {
        let current = std::thread::current();
        let thread = match current.name() {
            Some(name) => name.to_owned(),
            None => format!("{:?}", current.id()),
        };
        Self {
            level,
            timestamp: Local::now(),
            thread,
            location,
            message,
            rendered: OnceLock::new(),
        }
    }

    /// Creates a record by rendering the caller's format arguments.
    ///
    /// A formatting failure degrades to a fixed fallback body rather than
    /// losing the record or panicking.
    pub fn from_args(level: Level, location: SourceLocation, args: fmt::Arguments<'_>) -> Self {
        let mut message = String::new();
        if fmt::write(&mut message, args).is_err() {
            message.clear();
            message.push_str(FORMAT_FALLBACK);
        }
        Self::new(level, location, message)
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn timestamp(&self) -> DateTime<Local> {
        self.timestamp
    }

    /// Name (or debug-formatted id) of the thread that produced the record.
    pub fn thread(&self) -> &str {
        &self.thread
    }

    pub fn location(&self) -> SourceLocation {
        self.location
    }

    /// The message body, without the line prefix.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The record's final line form, without a trailing newline.
    ///
    /// Rendered at most once per record; every sink observing the record
    /// shares the same rendering.
    pub fn rendered_line(&self) -> &str {
        self.rendered.get_or_init(|| self.render())
    }

    fn render(&self) -> String {
        let prefix = format!(
            "{}:{}{} {} {}] ",
            std::process::id(),
            self.level.tag(),
            self.timestamp.format("%Y%m%d %H:%M:%S%.6f"),
            self.thread,
            self.location,
        );
        let mut line = String::with_capacity(prefix.len() + self.message.len());
        line.push_str(&prefix);
        line.push_str(&self.message);
        line
    }
}

impl Clone for LogRecord {
    fn clone(&self) -> Self {
        Self {
            level: self.level,
            timestamp: self.timestamp,
            thread: self.thread.clone(),
            location: self.location,
            message: self.message.clone(),
            // The clone renders independently; sharing the memo would tie the
            // two records' lifetimes together for no benefit.
            rendered: OnceLock::new(),
        }
    }
}

impl Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rendered_line())
    }
}

/*
Boilerplate notes for LogRecord:

IMPLEMENTED:
- Debug: Derived - essential for diagnostics
- Clone: Implemented by hand - the render memo is deliberately not shared
- Display: Implemented - the canonical line form

NOT IMPLEMENTED:
- PartialEq/Eq/Hash: the render memo makes structural equality misleading
  (two equal records could compare via different cache states)
- Copy: heap-allocated message
- Ord/PartialOrd: no meaningful total order across categories
- Default: a record without a level and call site is not a sensible value

AUTOMATIC:
- Send/Sync: all fields are Send + Sync, which the async queue relies on
*/

#[cfg(test)]
mod tests {
    use super::*;

    fn here() -> SourceLocation {
        SourceLocation::new(module_path!(), file!(), line!())
    }

    #[test]
    fn test_rendered_once() {
        let record = LogRecord::new(Level::Info, here(), "hello".to_owned());
        let first = record.rendered_line().as_ptr();
        let second = record.rendered_line().as_ptr();
        assert_eq!(first, second, "rendering must be memoized");
        assert!(record.rendered_line().ends_with("hello"));
    }

    #[test]
    fn test_line_shape() {
        let record = LogRecord::new(Level::Warn, here(), "body".to_owned());
        let line = record.rendered_line();
        let pid = std::process::id().to_string();
        assert!(line.starts_with(&format!("{pid}:W")));
        assert!(line.contains("log_record.rs:"));
        assert!(line.ends_with("] body"));
    }

    #[test]
    fn test_format_fallback() {
        struct Broken;
        impl Display for Broken {
            fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
                Err(fmt::Error)
            }
        }
        let record = LogRecord::from_args(Level::Error, here(), format_args!("{}", Broken));
        assert_eq!(record.message(), FORMAT_FALLBACK);
    }

    #[test]
    fn test_location_basename() {
        let location = SourceLocation::new("a::b", "src/deep/nested/file.rs", 7);
        assert_eq!(location.to_string(), "file.rs:7");
    }
}
