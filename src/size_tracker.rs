// SPDX-License-Identifier: MIT OR Apache-2.0

//! Approximate file-size accounting for the rotation fast path.
//!
//! A [`SizeTracker`] keeps a lock-free running estimate of the active file's
//! byte size so that the write path does not need a filesystem stat per
//! record. The estimate drifts from truth only when several threads race past
//! the cap simultaneously, and is re-anchored from the authoritative on-disk
//! size whenever the throttled check fires — so staleness is bounded by one
//! check interval.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Lock-free byte counter plus a throttled authoritative-check stamp.
#[derive(Debug)]
pub(crate) struct SizeTracker {
    bytes: AtomicU64,
    /// Milliseconds since `origin` at which the last authoritative check ran.
    last_check_ms: AtomicU64,
    origin: Instant,
    interval: Duration,
}

impl SizeTracker {
    pub(crate) fn new(initial: u64, interval: Duration) -> Self {
        Self {
            bytes: AtomicU64::new(initial),
            last_check_ms: AtomicU64::new(0),
            origin: Instant::now(),
            interval,
        }
    }

    /// The current estimate.
    pub(crate) fn approximate(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }

    /// Accounts for a completed write.
    pub(crate) fn record_write(&self, len: u64) {
        self.bytes.fetch_add(len, Ordering::Relaxed);
    }

    /// Would appending `incoming` bytes push the estimate past `cap`?
    pub(crate) fn would_exceed(&self, incoming: u64, cap: u64) -> bool {
        self.approximate().saturating_add(incoming) > cap
    }

    /// True once a full check interval has elapsed since the last
    /// authoritative check.
    pub(crate) fn check_due(&self) -> bool {
        let elapsed = self.elapsed_ms();
        let last = self.last_check_ms.load(Ordering::Relaxed);
        elapsed.saturating_sub(last) >= self.interval.as_millis() as u64
    }

    /// Re-anchors the estimate to the authoritative on-disk size.
    pub(crate) fn reset(&self, actual: u64) {
        self.bytes.store(actual, Ordering::Relaxed);
    }

    /// Stamps the time of an authoritative check.
    pub(crate) fn mark_checked(&self) {
        self.last_check_ms.store(self.elapsed_ms(), Ordering::Relaxed);
    }

    fn elapsed_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}
