// SPDX-License-Identifier: MIT OR Apache-2.0

//! Front-end logging macros.
//!
//! Each macro takes the router as its first argument — call sites name their
//! logging context explicitly instead of reaching for a global — captures the
//! call-site location, and forwards the message as `format_args!`.
//!
//! The message arguments are only evaluated when the record would actually be
//! recorded: a `debug!` with an expensive argument costs one atomic load when
//! debug capture is off.
//!
//! # Example
//!
//! ```rust
//! use tierlog::{Config, LogRouter};
//!
//! let dir = tempfile::tempdir().expect("tempdir");
//! let router = LogRouter::new();
//! router
//!     .initialize(Config::builder(dir.path().join("app")).build())
//!     .expect("initialize");
//!
//! tierlog::info!(router, "started worker {}", 3);
//! tierlog::error!(router, "connection lost: {}", "timed out");
//! ```

/// Captures the source location of the call site.
#[macro_export]
macro_rules! source_location {
    () => {
        $crate::SourceLocation::new(module_path!(), file!(), line!())
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __emit_at {
    ($router:expr, $level:expr, $($arg:tt)+) => {{
        let __tierlog_router = &$router;
        if __tierlog_router.would_emit($level) {
            __tierlog_router.emit($level, $crate::source_location!(), format_args!($($arg)+));
        }
    }};
}

/// Logs at [`Level::Debug`](crate::Level::Debug); recorded only when the
/// router has debug capture enabled.
#[macro_export]
macro_rules! debug {
    ($router:expr, $($arg:tt)+) => {
        $crate::__emit_at!($router, $crate::Level::Debug, $($arg)+)
    };
}

/// Logs at [`Level::Info`](crate::Level::Info).
#[macro_export]
macro_rules! info {
    ($router:expr, $($arg:tt)+) => {
        $crate::__emit_at!($router, $crate::Level::Info, $($arg)+)
    };
}

/// Logs at [`Level::Warn`](crate::Level::Warn).
#[macro_export]
macro_rules! warn {
    ($router:expr, $($arg:tt)+) => {
        $crate::__emit_at!($router, $crate::Level::Warn, $($arg)+)
    };
}

/// Logs at [`Level::Error`](crate::Level::Error).
#[macro_export]
macro_rules! error {
    ($router:expr, $($arg:tt)+) => {
        $crate::__emit_at!($router, $crate::Level::Error, $($arg)+)
    };
}
