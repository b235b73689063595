//SPDX-License-Identifier: MIT OR Apache-2.0
/*!
# tierlog

tierlog is a process-local log-writing backend with tiered, size-bounded,
self-pruning rotating files.

# The problem

A long-running process that logs to disk has three chronic problems:

* a single log file grows without bound until the disk fills;
* one file mixes every severity, so finding the errors means grepping past
  the noise;
* naive rotation schemes either lose records at the rollover or let the
  total footprint of old files grow unbounded anyway.

tierlog addresses all three with one design: each severity *tier* (by
default `INFO`, `WARN` and `ERROR`) owns its own lineage of rotating files,
every file rolls over before a write would push it past a per-file cap, and
after every roll the oldest files of that tier are deleted until the tier
fits a total disk budget. A stable alias name per tier always resolves to
the currently active file, so `tail -F app.INFO` keeps working across
rotations.

# The shape

One record fans out to every tier whose minimum severity it reaches: an
error lands in the `INFO`, `WARN` *and* `ERROR` files simultaneously, so
each file is a complete view at its own severity floor.

```text
producer ─▶ LogRouter::emit ─▶ threshold filter
                                   │
                  ┌────────────────┼──────────────────┐
                  ▼                ▼                  ▼
           INFO tier (≥D)    WARN tier (≥W)    ERROR tier (≥E)   + console
                  │
            rotate at cap ─▶ publish alias ─▶ sweep old files
```

The [`LogRouter`] is an explicit object — construct it once at process
start and hand it to whoever logs. Initialization is idempotent-once,
shutdown is terminal, and nothing this crate does after a successful
initialization can panic the host application: per-write failures are
invisible by design, and a tier whose file cannot be reopened disables
itself while its siblings keep running.

# The API

```rust
use tierlog::{Config, LogRouter};

# let dir = tempfile::tempdir().expect("tempdir");
let router = LogRouter::new();
router.initialize(
    Config::builder(dir.path().join("app"))
        .max_file_size(10 * 1024 * 1024)
        .max_total_size(50 * 1024 * 1024)
        .build(),
)?;

tierlog::info!(router, "listening on port {}", 8080);
tierlog::error!(router, "upstream refused: {}", "connection reset");

router.shutdown();
# Ok::<(), tierlog::InitError>(())
```

Message arguments are only evaluated if the record passes the severity
threshold, so a `debug!` in a hot loop costs one atomic load when debug
capture is off.

# Throughput

Producers never take a lock on the common path: the active file is written
through an append-mode handle (one write per record, atomic per call) and
the size accounting is a lock-free estimate, re-anchored against the real
file size at most once per check interval. For producers that must never
wait on disk at all, an asynchronous dispatch mode moves the I/O onto a
small worker pool behind a bounded queue with blocking backpressure.

# Multithreading

Any number of threads may share one router (`&LogRouter` is all the macros
need; wrap it in `Arc` to move it across threads). Records from concurrent
producers never interleave within a line, and within one tier the files on
disk always contain every accepted record exactly once.
*/

mod active_pointer;
mod config;
mod console_logger;
mod dispatch;
mod error;
mod inmemory_logger;
mod level;
mod log_record;
mod logger;
mod macros;
mod retention;
mod rotating;
mod router;
mod size_tracker;

pub use active_pointer::{MarkerFileBackend, PointerBackend, SymlinkBackend};
pub use config::{
    Config, ConfigBuilder, DEFAULT_MAX_FILE_SIZE, DEFAULT_MAX_TOTAL_SIZE, DEFAULT_QUEUE_CAPACITY,
    DEFAULT_WORKER_THREADS, DispatchMode, Tier, default_tiers,
};
pub use console_logger::ConsoleLogger;
pub use error::{FsErrorKind, InitError};
pub use inmemory_logger::InMemoryLogger;
pub use level::{Level, ParseLevelError};
pub use log_record::{LogRecord, SourceLocation};
pub use logger::Logger;
pub use rotating::RotatingFileTarget;
pub use router::LogRouter;
