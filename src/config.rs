// SPDX-License-Identifier: MIT OR Apache-2.0

//! Router configuration.
//!
//! A [`Config`] is built once, handed to
//! [`LogRouter::initialize`](crate::LogRouter::initialize), and never
//! consulted again — the first configuration a router accepts is the one it
//! keeps for its whole life.
//!
//! Defaults: 10 MiB per file, 50 MiB per category budget, debug capture off,
//! console off, file output on, synchronous dispatch, the standard
//! INFO/WARN/ERROR tier set, and a 1 second rotation-check interval.

use crate::Level;
use crate::active_pointer::{PointerBackend, default_backends};
use crate::logger::Logger;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Default single-file byte cap (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
/// Default per-category total byte budget (50 MiB).
pub const DEFAULT_MAX_TOTAL_SIZE: u64 = 50 * 1024 * 1024;
/// Default bounded queue capacity for asynchronous dispatch.
pub const DEFAULT_QUEUE_CAPACITY: usize = 8192;
/// Default worker-thread count for asynchronous dispatch.
pub const DEFAULT_WORKER_THREADS: usize = 1;

pub(crate) const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_secs(1);

/// One severity-filtered file lineage: a category tag plus the minimum level
/// written to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tier {
    name: String,
    min_level: Level,
}

impl Tier {
    /// `name` becomes the category tag in file names
    /// (`<name>.<timestamp>.<base-name>`).
    pub fn new(name: impl Into<String>, min_level: Level) -> Self {
        Self {
            name: name.into(),
            min_level,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn min_level(&self) -> Level {
        self.min_level
    }
}

/// The standard tier set: an INFO file receiving everything, a WARN file
/// receiving warnings and errors, an ERROR file receiving only errors.
pub fn default_tiers() -> Vec<Tier> {
    vec![
        Tier::new("INFO", Level::Debug),
        Tier::new("WARN", Level::Warn),
        Tier::new("ERROR", Level::Error),
    ]
}

/// How records travel from producers to sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// Producers write through to the sinks on their own thread.
    Synchronous,
    /// Producers enqueue onto a bounded queue serviced by a fixed pool of
    /// worker threads. A full queue blocks the producer until space frees
    /// up: bounded memory, at the cost of producer stalls under sustained
    /// overload.
    Asynchronous {
        /// Maximum records queued before producers block.
        queue_capacity: usize,
        /// Fixed worker-thread count (at least one is always started).
        worker_threads: usize,
    },
}

/// Complete configuration for a [`LogRouter`](crate::LogRouter).
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) prefix: PathBuf,
    pub(crate) max_file_size: u64,
    pub(crate) max_total_size: u64,
    pub(crate) debug_enabled: bool,
    pub(crate) console_enabled: bool,
    pub(crate) file_enabled: bool,
    pub(crate) tiers: Vec<Tier>,
    pub(crate) check_interval: Duration,
    pub(crate) dispatch: DispatchMode,
    pub(crate) pointer_backends: Vec<Arc<dyn PointerBackend>>,
    pub(crate) extra_sinks: Vec<Arc<dyn Logger>>,
}

impl Config {
    /// Starts a builder. `prefix` is the log directory plus the base name:
    /// `logs/app` produces files like `logs/INFO.20250412_143045.app`.
    pub fn builder(prefix: impl Into<PathBuf>) -> ConfigBuilder {
        ConfigBuilder {
            config: Config {
                prefix: prefix.into(),
                max_file_size: DEFAULT_MAX_FILE_SIZE,
                max_total_size: DEFAULT_MAX_TOTAL_SIZE,
                debug_enabled: false,
                console_enabled: false,
                file_enabled: true,
                tiers: default_tiers(),
                check_interval: DEFAULT_CHECK_INTERVAL,
                dispatch: DispatchMode::Synchronous,
                pointer_backends: default_backends(),
                extra_sinks: Vec::new(),
            },
        }
    }

    /// The directory component of the prefix (`.` when the prefix is bare).
    pub(crate) fn directory(&self) -> PathBuf {
        match self.prefix.parent() {
            Some(parent) if parent != Path::new("") => parent.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// The trailing path component of the prefix.
    pub(crate) fn base_name(&self) -> String {
        self.prefix
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "log".to_owned())
    }
}

/// Builder for [`Config`]; every knob has a documented default.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Single-file byte cap (default 10 MiB). A file rolls over before a
    /// write would push it past this size.
    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.config.max_file_size = bytes;
        self
    }

    /// Per-category total byte budget (default 50 MiB). The retention sweep
    /// deletes the oldest files of a category until this is respected.
    pub fn max_total_size(mut self, bytes: u64) -> Self {
        self.config.max_total_size = bytes;
        self
    }

    /// Whether DEBUG-level records are recorded at all (default false).
    pub fn debug_records(mut self, enabled: bool) -> Self {
        self.config.debug_enabled = enabled;
        self
    }

    /// Whether records are mirrored to stderr (default false).
    pub fn console_output(mut self, enabled: bool) -> Self {
        self.config.console_enabled = enabled;
        self
    }

    /// Whether file output is enabled (default true). Disabling both console
    /// and file output fails initialization.
    pub fn file_output(mut self, enabled: bool) -> Self {
        self.config.file_enabled = enabled;
        self
    }

    /// Replaces the tier set (default INFO≥Debug, WARN≥Warn, ERROR≥Error).
    pub fn tiers(mut self, tiers: Vec<Tier>) -> Self {
        self.config.tiers = tiers;
        self
    }

    /// Interval between authoritative on-disk size checks (default 1 s).
    pub fn check_interval(mut self, interval: Duration) -> Self {
        self.config.check_interval = interval;
        self
    }

    /// Switches to asynchronous dispatch with the given bounded queue
    /// capacity and worker-thread count.
    pub fn asynchronous(mut self, queue_capacity: usize, worker_threads: usize) -> Self {
        self.config.dispatch = DispatchMode::Asynchronous {
            queue_capacity,
            worker_threads,
        };
        self
    }

    /// Switches back to synchronous dispatch (the default).
    pub fn synchronous(mut self) -> Self {
        self.config.dispatch = DispatchMode::Synchronous;
        self
    }

    /// Replaces the active-pointer backend chain (default: symlink, then
    /// marker file).
    pub fn pointer_backends(mut self, backends: Vec<Arc<dyn PointerBackend>>) -> Self {
        self.config.pointer_backends = backends;
        self
    }

    /// Attaches an additional sink that receives every record passing the
    /// router's threshold, independent of the tier files.
    pub fn sink(mut self, sink: Arc<dyn Logger>) -> Self {
        self.config.extra_sinks.push(sink);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
