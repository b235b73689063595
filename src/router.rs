// SPDX-License-Identifier: MIT OR Apache-2.0

//! The router: lifecycle, severity filtering, and record fan-out.
//!
//! A [`LogRouter`] is an explicit, process-scoped object: the application
//! constructs one at startup, initializes it once, and passes (or stores) it
//! for producer call sites — there is no hidden global. Its lifecycle is a
//! small state machine,
//!
//! ```text
//! uninitialized ──initialize ok──▶ ready ──shutdown──▶ shutdown (terminal)
//!        │
//!        └──initialize err──▶ failed (terminal)
//! ```
//!
//! with idempotent-once initialization: the first `initialize` call decides
//! the configuration forever; later calls have no effect. `emit` outside the
//! ready state is a no-op, which is what makes the router safe to reach from
//! any thread at any time.

use crate::active_pointer::ActivePointer;
use crate::config::{Config, DispatchMode};
use crate::console_logger::ConsoleLogger;
use crate::dispatch::{Command, WorkerPool};
use crate::error::InitError;
use crate::level::Level;
use crate::log_record::{LogRecord, SourceLocation};
use crate::logger::Logger;
use crate::retention::RetentionSweeper;
use crate::rotating::RotatingFileTarget;
use crossbeam_channel::Sender;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};

const UNINITIALIZED: u8 = 0;
const INITIALIZING: u8 = 1;
const READY: u8 = 2;
const SHUTDOWN: u8 = 3;
const FAILED: u8 = 4;

/// Routes each record to every tier file whose minimum level it reaches,
/// plus the console and any extra sinks.
///
/// # Example
///
/// ```rust
/// use tierlog::{Config, LogRouter};
///
/// let dir = tempfile::tempdir().expect("tempdir");
/// let router = LogRouter::new();
/// router
///     .initialize(Config::builder(dir.path().join("app")).build())
///     .expect("initialize");
///
/// tierlog::warn!(router, "cache miss rate at {}%", 93);
/// router.shutdown();
/// ```
#[derive(Debug)]
pub struct LogRouter {
    state: AtomicU8,
    core: OnceLock<Arc<RouterCore>>,
    workers: Mutex<Option<WorkerPool>>,
}

/// Everything `emit` needs after initialization, published once through the
/// `OnceLock` so the hot path is wait-free.
#[derive(Debug)]
pub(crate) struct RouterCore {
    threshold: AtomicU8,
    tiers: Vec<TierTarget>,
    sinks: Vec<Arc<dyn Logger>>,
    queue: Option<Sender<Command>>,
}

#[derive(Debug)]
struct TierTarget {
    min_level: Level,
    target: RotatingFileTarget,
}

impl RouterCore {
    /// Fans one record out to every matching tier and every sink. Runs on
    /// the producer thread under synchronous dispatch, on a worker thread
    /// otherwise.
    pub(crate) fn route(&self, record: &LogRecord) {
        for tier in &self.tiers {
            if record.level() >= tier.min_level {
                tier.target.finish_log_record(record);
            }
        }
        for sink in &self.sinks {
            sink.finish_log_record(record);
        }
    }

    fn submit(&self, record: LogRecord) {
        match &self.queue {
            // A full queue blocks here: bounded memory over dropped records.
            Some(sender) => {
                let _ = sender.send(Command::Record(record));
            }
            None => self.route(&record),
        }
    }

    fn threshold_level(&self) -> Level {
        Level::from_u8(self.threshold.load(Ordering::Relaxed))
    }

    fn prepare_to_die(&self) {
        for tier in &self.tiers {
            tier.target.prepare_to_die();
        }
        for sink in &self.sinks {
            sink.prepare_to_die();
        }
    }
}

impl LogRouter {
    /// Creates an uninitialized router. `emit` is a no-op until
    /// [`initialize`](Self::initialize) succeeds.
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(UNINITIALIZED),
            core: OnceLock::new(),
            workers: Mutex::new(None),
        }
    }

    /// Brings the backend up. Idempotent-once: the first call decides the
    /// configuration; a second call while ready is a no-op returning
    /// `Ok(())`, and calls after a failed attempt or after shutdown return
    /// [`InitError::Disabled`].
    ///
    /// Fails without side effects if both console and file output are
    /// disabled, and with no targets left open if any tier's initial file
    /// cannot be created.
    pub fn initialize(&self, config: Config) -> Result<(), InitError> {
        match self.state.compare_exchange(
            UNINITIALIZED,
            INITIALIZING,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(_) => {}
            Err(INITIALIZING) => {
                // Another thread is mid-initialization; wait for it to
                // resolve and report its outcome.
                loop {
                    match self.state.load(Ordering::Acquire) {
                        INITIALIZING => std::hint::spin_loop(),
                        READY => return Ok(()),
                        _ => return Err(InitError::Disabled),
                    }
                }
            }
            Err(READY) => return Ok(()),
            Err(_) => return Err(InitError::Disabled),
        }

        match self.build_core(config) {
            Ok(()) => {
                self.state.store(READY, Ordering::Release);
                Ok(())
            }
            Err(error) => {
                self.state.store(FAILED, Ordering::Release);
                Err(error)
            }
        }
    }

    fn build_core(&self, config: Config) -> Result<(), InitError> {
        if !config.console_enabled && !config.file_enabled {
            return Err(InitError::NoSinkConfigured);
        }

        let threshold = if config.debug_enabled {
            Level::Debug
        } else {
            Level::Info
        };

        let mut tiers = Vec::new();
        if config.file_enabled {
            let directory = config.directory();
            let base_name = config.base_name();
            let sweeper = Arc::new(RetentionSweeper::new());
            for tier in &config.tiers {
                let pointer = ActivePointer::new(
                    &directory,
                    &base_name,
                    tier.name(),
                    config.pointer_backends.clone(),
                );
                let target = RotatingFileTarget::open(
                    directory.clone(),
                    base_name.clone(),
                    tier.name().to_owned(),
                    config.max_file_size,
                    config.max_total_size,
                    config.check_interval,
                    pointer,
                    Arc::clone(&sweeper),
                )?;
                tiers.push(TierTarget {
                    min_level: tier.min_level(),
                    target,
                });
            }
        }

        let mut sinks: Vec<Arc<dyn Logger>> = Vec::new();
        if config.console_enabled {
            sinks.push(Arc::new(ConsoleLogger::new()));
        }
        sinks.extend(config.extra_sinks.iter().cloned());

        let (queue, receiver) = match config.dispatch {
            DispatchMode::Synchronous => (None, None),
            DispatchMode::Asynchronous { queue_capacity, .. } => {
                let (sender, receiver) = crossbeam_channel::bounded(queue_capacity.max(1));
                (Some(sender), Some(receiver))
            }
        };

        let core = Arc::new(RouterCore {
            threshold: AtomicU8::new(threshold.as_u8()),
            tiers,
            sinks,
            queue,
        });

        if let (DispatchMode::Asynchronous { worker_threads, .. }, Some(receiver)) =
            (config.dispatch, receiver)
        {
            let pool = WorkerPool::start(Arc::clone(&core), receiver, worker_threads)
                .map_err(|error| InitError::WorkerSpawn {
                    kind: (&error).into(),
                })?;
            *self.workers.lock() = Some(pool);
        }

        let _ = self.core.set(core);
        Ok(())
    }

    /// Whether a record at `level` would currently be recorded. Used by the
    /// macros so message arguments are only evaluated for records that will
    /// actually be kept.
    pub fn would_emit(&self, level: Level) -> bool {
        if self.state.load(Ordering::Acquire) != READY {
            return false;
        }
        match self.core.get() {
            Some(core) => level >= core.threshold_level(),
            None => false,
        }
    }

    /// The single entry point for producers.
    ///
    /// A record below the threshold — or any record while the router is not
    /// ready — is dropped with no observable effect. Everything else is
    /// routed to every enabled destination, synchronously or through the
    /// bounded queue depending on the configured dispatch mode.
    pub fn emit(&self, level: Level, location: SourceLocation, args: fmt::Arguments<'_>) {
        if self.state.load(Ordering::Acquire) != READY {
            return;
        }
        let Some(core) = self.core.get() else { return };
        if level < core.threshold_level() {
            return;
        }
        core.submit(LogRecord::from_args(level, location, args));
    }

    /// Routes an already-constructed record; the macro-free equivalent of
    /// [`emit`](Self::emit) for callers that build [`LogRecord`]s directly.
    pub fn emit_record(&self, record: LogRecord) {
        if self.state.load(Ordering::Acquire) != READY {
            return;
        }
        let Some(core) = self.core.get() else { return };
        if record.level() < core.threshold_level() {
            return;
        }
        core.submit(record);
    }

    /// Adjusts the minimum severity recorded. Returns false unless the
    /// router is ready.
    pub fn set_level(&self, level: Level) -> bool {
        if self.state.load(Ordering::Acquire) != READY {
            return false;
        }
        match self.core.get() {
            Some(core) => {
                core.threshold.store(level.as_u8(), Ordering::Relaxed);
                true
            }
            None => false,
        }
    }

    /// The current minimum severity, once initialized.
    pub fn level(&self) -> Option<Level> {
        self.core.get().map(|core| core.threshold_level())
    }

    /// True while records are being accepted.
    pub fn is_ready(&self) -> bool {
        self.state.load(Ordering::Acquire) == READY
    }

    /// Drains pending asynchronous work, flushes every target and sink, and
    /// retires the router. Terminal and idempotent; `emit` afterwards is a
    /// no-op. The drain waits unboundedly for queued records.
    pub fn shutdown(&self) {
        if self
            .state
            .compare_exchange(READY, SHUTDOWN, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        let Some(core) = self.core.get() else { return };

        if let Some(pool) = self.workers.lock().take() {
            if let Some(sender) = &core.queue {
                for _ in 0..pool.len() {
                    let _ = sender.send(Command::Shutdown);
                }
            }
            pool.join();
        }
        core.prepare_to_die();
    }
}

impl Default for LogRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for LogRouter {
    fn drop(&mut self) {
        // Flush all logs
        self.shutdown();
    }
}
