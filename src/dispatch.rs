// SPDX-License-Identifier: MIT OR Apache-2.0

//! Asynchronous dispatch: a bounded queue serviced by worker threads.
//!
//! Producers hand completed records to the queue and return; the workers do
//! the routing (and therefore all file I/O) off the producers' threads. The
//! queue is bounded with blocking backpressure: when it is full, the
//! producer's `send` stalls until a worker frees a slot. Memory stays
//! bounded; no record is ever dropped.
//!
//! Shutdown enqueues one [`Command::Shutdown`] sentinel per worker behind
//! whatever is already queued, so the queue drains completely before the
//! workers exit. The wait is unbounded.

use crate::log_record::LogRecord;
use crate::router::RouterCore;
use crossbeam_channel::Receiver;
use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;

/// Work items for the dispatch workers.
#[derive(Debug)]
pub(crate) enum Command {
    Record(LogRecord),
    /// One per worker at shutdown; everything queued ahead of it is routed
    /// first.
    Shutdown,
}

/// Handles to the running workers; joined at shutdown.
#[derive(Debug)]
pub(crate) struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Starts `worker_threads` workers (at least one) draining `receiver`
    /// into `core`.
    pub(crate) fn start(
        core: Arc<RouterCore>,
        receiver: Receiver<Command>,
        worker_threads: usize,
    ) -> io::Result<Self> {
        let handles = (0..worker_threads.max(1))
            .map(|index| {
                let core = Arc::clone(&core);
                let receiver = receiver.clone();
                std::thread::Builder::new()
                    .name(format!("tierlog-worker-{index}"))
                    .spawn(move || run(core, receiver))
            })
            .collect::<io::Result<Vec<_>>>()?;
        Ok(Self { handles })
    }

    pub(crate) fn len(&self) -> usize {
        self.handles.len()
    }

    /// Waits for every worker to exit. Callers must already have enqueued
    /// one shutdown sentinel per worker.
    pub(crate) fn join(mut self) {
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}

fn run(core: Arc<RouterCore>, receiver: Receiver<Command>) {
    while let Ok(command) = receiver.recv() {
        match command {
            Command::Record(record) => core.route(&record),
            Command::Shutdown => break,
        }
    }
}
