// SPDX-License-Identifier: MIT OR Apache-2.0

//! Size-bounded rotating file target.
//!
//! A [`RotatingFileTarget`] owns one file lineage per (category, base-name)
//! pair: it appends records to the active file, rolls over to a freshly named
//! file before a write would push past the single-file cap, and triggers the
//! retention sweep and active-pointer publication after every roll.
//!
//! # Write path
//!
//! The common case takes no lock: the approximate size estimate says the cap
//! is far away and the throttled authoritative check is not due, so the
//! record is appended under a shared read guard. Appends go through an
//! `O_APPEND`-mode handle with one `write_all` per record, which keeps
//! concurrent records intact without serializing producers.
//!
//! The slow path takes the exclusive lock and re-checks against the
//! authoritative on-disk size — several threads may observe the same
//! fast-path trigger concurrently, and only the first one through the lock
//! must actually rotate. The throttle bounds how stale the estimate can get
//! (one check interval) while amortizing the stat cost under bursts, at the
//! price of a small, bounded cap overshoot.

use crate::active_pointer::ActivePointer;
use crate::error::InitError;
use crate::log_record::LogRecord;
use crate::logger::Logger;
use crate::retention::RetentionSweeper;
use crate::size_tracker::SizeTracker;
use chrono::Local;
use parking_lot::RwLock;
use std::fs::{self, File, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// One rotating file lineage for a category.
///
/// Constructed by the router at initialization; producers reach it only
/// through [`Logger::finish_log_record`].
#[derive(Debug)]
pub struct RotatingFileTarget {
    directory: PathBuf,
    base_name: String,
    category: String,
    max_file_size: u64,
    max_total_size: u64,
    active: RwLock<ActiveFile>,
    size: SizeTracker,
    /// Cleared when a rotation cannot open its new file; the target then
    /// drops writes so the rest of the backend keeps running.
    healthy: AtomicBool,
    pointer: ActivePointer,
    sweeper: Arc<RetentionSweeper>,
}

#[derive(Debug)]
struct ActiveFile {
    file: File,
    path: PathBuf,
}

impl RotatingFileTarget {
    /// Opens the initial file for the lineage, creating the directory
    /// recursively, seeding the size estimate from whatever the file already
    /// contains, publishing the alias and running one sweep.
    pub(crate) fn open(
        directory: PathBuf,
        base_name: String,
        category: String,
        max_file_size: u64,
        max_total_size: u64,
        check_interval: Duration,
        pointer: ActivePointer,
        sweeper: Arc<RetentionSweeper>,
    ) -> Result<Self, InitError> {
        fs::create_dir_all(&directory).map_err(|error| InitError::CreateDirectory {
            path: directory.clone(),
            kind: (&error).into(),
        })?;

        let path = directory.join(timestamped_name(&category, &base_name));
        let file = open_append(&path).map_err(|error| InitError::OpenTarget {
            path: path.clone(),
            kind: (&error).into(),
        })?;
        let initial_size = file.metadata().map(|m| m.len()).unwrap_or(0);

        let target = Self {
            directory,
            base_name,
            category,
            max_file_size,
            max_total_size,
            active: RwLock::new(ActiveFile { file, path }),
            size: SizeTracker::new(initial_size, check_interval),
            healthy: AtomicBool::new(true),
            pointer,
            sweeper,
        };

        {
            let guard = target.active.read();
            target.publish_pointer(&guard.path);
            target.sweeper.enforce_budget(
                &target.directory,
                &target.category,
                &target.base_name,
                &guard.path,
                target.max_total_size,
            );
        }
        Ok(target)
    }

    /// Appends one rendered record (a full line, newline included).
    ///
    /// Never returns a failure: per-write problems are invisible by design,
    /// and a target that cannot rotate disables itself.
    pub(crate) fn write(&self, bytes: &[u8]) {
        if !self.healthy.load(Ordering::Acquire) {
            return;
        }
        let incoming = bytes.len() as u64;
        if self.size.would_exceed(incoming, self.max_file_size) || self.size.check_due() {
            self.checked_write(bytes, incoming);
        } else {
            let guard = self.active.read();
            let _ = (&guard.file).write_all(bytes);
            drop(guard);
            self.size.record_write(incoming);
        }
    }

    /// Slow path: authoritative re-check under the exclusive lock, rotating
    /// if the write would still overflow the cap.
    #[cold]
    fn checked_write(&self, bytes: &[u8], incoming: u64) {
        let mut guard = self.active.write();

        // Re-check against the on-disk size, not the estimate: every thread
        // that observed the fast-path trigger lands here, and only the first
        // one through may rotate.
        let on_disk = guard
            .file
            .metadata()
            .map(|m| m.len())
            .unwrap_or_else(|_| self.size.approximate());

        if on_disk + incoming > self.max_file_size {
            let path = self.directory.join(timestamped_name(&self.category, &self.base_name));
            match open_append(&path) {
                Ok(file) => {
                    // Within one second the new name can equal the old one;
                    // append mode makes that a harmless reopen, never a
                    // truncation.
                    let new_size = file.metadata().map(|m| m.len()).unwrap_or(0);
                    *guard = ActiveFile { file, path };
                    self.size.reset(new_size);
                    self.publish_pointer(&guard.path);
                    self.sweeper.enforce_budget(
                        &self.directory,
                        &self.category,
                        &self.base_name,
                        &guard.path,
                        self.max_total_size,
                    );
                }
                Err(_) => {
                    // Fatal to this target only; siblings and the router
                    // keep operating.
                    self.healthy.store(false, Ordering::Release);
                    return;
                }
            }
        } else {
            self.size.reset(on_disk);
        }
        self.size.mark_checked();

        let _ = (&guard.file).write_all(bytes);
        drop(guard);
        self.size.record_write(incoming);
    }

    fn publish_pointer(&self, path: &Path) {
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            self.pointer.publish(name);
        }
    }

    /// The category tag of this lineage.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// Whether the target is still accepting writes.
    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Acquire)
    }

    #[cfg(test)]
    pub(crate) fn active_path(&self) -> PathBuf {
        self.active.read().path.clone()
    }
}

impl Logger for RotatingFileTarget {
    fn finish_log_record(&self, record: &LogRecord) {
        let line = record.rendered_line();
        // One write_all per record preserves append-mode atomicity; the
        // newline must travel in the same call.
        let mut bytes = Vec::with_capacity(line.len() + 1);
        bytes.extend_from_slice(line.as_bytes());
        bytes.push(b'\n');
        self.write(&bytes);
    }

    fn prepare_to_die(&self) {
        let guard = self.active.read();
        let _ = guard.file.sync_all();
    }
}

/// `<category>.<YYYYMMDD_HHMMSS>.<base-name>` — the published name format;
/// existing deployments parse these names.
fn timestamped_name(category: &str, base_name: &str) -> String {
    format!(
        "{category}.{}.{base_name}",
        Local::now().format("%Y%m%d_%H%M%S")
    )
}

fn open_append(path: &Path) -> std::io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::active_pointer::default_backends;

    fn make_target(directory: &Path, max_file_size: u64, max_total_size: u64) -> RotatingFileTarget {
        let pointer = ActivePointer::new(directory, "app", "INFO", default_backends());
        RotatingFileTarget::open(
            directory.to_path_buf(),
            "app".to_owned(),
            "INFO".to_owned(),
            max_file_size,
            max_total_size,
            // Zero interval: every write runs the authoritative check, which
            // makes rotation deterministic for the assertions below.
            Duration::ZERO,
            pointer,
            Arc::new(RetentionSweeper::new()),
        )
        .expect("target opens")
    }

    fn info_files(directory: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = fs::read_dir(directory)
            .expect("read dir")
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("INFO.") && n.ends_with(".app"))
            })
            .collect();
        files.sort();
        files
    }

    #[test]
    fn test_initial_file_created_and_published() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = make_target(dir.path(), 1024, 10 * 1024);

        let active = target.active_path();
        assert!(active.exists());
        let name = active.file_name().and_then(|n| n.to_str()).expect("name");
        assert!(name.starts_with("INFO.") && name.ends_with(".app"));

        #[cfg(unix)]
        {
            let alias = dir.path().join("app.INFO");
            let resolved = fs::read_link(alias).expect("alias resolves");
            assert_eq!(resolved, Path::new(name));
        }
    }

    #[test]
    fn test_rotation_before_cap_breach() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = make_target(dir.path(), 100, 100 * 1024);

        let first = target.active_path();
        target.write(&[b'a'; 60]);
        assert_eq!(target.active_path(), first, "under the cap, no roll");

        // Cross a second boundary so the roll gets a distinct name instead
        // of reopening the same file.
        std::thread::sleep(Duration::from_millis(1100));

        // 60 + 60 would breach the cap: the roll happens before the write,
        // so the first file never exceeds it.
        target.write(&[b'b'; 60]);
        assert_ne!(target.active_path(), first, "the breaching write rolled");
        let first_len = fs::metadata(&first).map(|m| m.len()).unwrap_or(0);
        assert!(first_len <= 100, "rotation happens before, not after, the cap");

        let total: u64 = info_files(dir.path())
            .iter()
            .filter_map(|p| fs::metadata(p).ok())
            .map(|m| m.len())
            .sum();
        assert_eq!(total, 120, "no record was lost across the roll");
    }

    #[test]
    fn test_oversized_write_honored_in_full() {
        let dir = tempfile::tempdir().expect("tempdir");
        let target = make_target(dir.path(), 100, 100 * 1024);

        target.write(&[b'a'; 10]);
        target.write(&[b'x'; 300]);

        let active = target.active_path();
        let len = fs::metadata(&active).map(|m| m.len()).unwrap_or(0);
        // The cap is a rotate-before trigger, not a truncation: within the
        // same second the roll reopens the same name, so the active file
        // holds at least the full oversized record.
        assert!(len >= 300, "oversized write landed in full, got {len}");
    }

    #[test]
    fn test_open_failure_disables_target_only() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().to_path_buf();
        let target = make_target(&path, 100, 100 * 1024);
        assert!(target.is_healthy());

        // Removing the directory makes the next rotation's open fail.
        fs::remove_dir_all(&path).expect("remove dir");
        target.write(&[b'x'; 300]);

        assert!(!target.is_healthy());
        // Subsequent writes are dropped without panicking.
        target.write(&[b'y'; 10]);
    }
}
