// SPDX-License-Identifier: MIT OR Apache-2.0

//! Retention sweeping: oldest-first deletion down to a total byte budget.
//!
//! The directory itself is the source of truth — nothing about past files is
//! persisted or cached. Each sweep re-enumerates the files matching a
//! category's naming pattern, so a sweep can never act on stale accounting.
//!
//! Sweeps of the same category are serialized: two concurrent sweeps reading
//! overlapping snapshots could both decide to delete the same file or
//! under-delete. Sweeps of different categories proceed concurrently.

use crate::error::FsErrorKind;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// Deletes the oldest files of a category until the total size of files
/// matching `<category>.*.<base-name>` respects the budget.
#[derive(Debug, Default)]
pub(crate) struct RetentionSweeper {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

#[derive(Debug)]
struct Candidate {
    path: PathBuf,
    size: u64,
    modified: SystemTime,
}

impl RetentionSweeper {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Enforces `total_cap` over the category's files in `directory`.
    ///
    /// Oldest-by-modification-time files are deleted first (ties broken by
    /// file name, so a run is deterministic). The active file is never
    /// deleted, and neither is the newest file, even when one of them alone
    /// exceeds the budget. Individual deletion failures are skipped and the
    /// sweep continues with the next oldest; nothing is retried or reported.
    ///
    /// Returns the number of files removed.
    pub(crate) fn enforce_budget(
        &self,
        directory: &Path,
        category: &str,
        base_name: &str,
        active: &Path,
        total_cap: u64,
    ) -> usize {
        let lock = self.category_lock(category);
        let _guard = lock.lock();

        let mut files = match collect(directory, category, base_name) {
            Ok(files) => files,
            // An unreadable directory means there is nothing we can safely do.
            Err(_) => return 0,
        };
        if files.len() <= 1 {
            return 0;
        }

        files.sort_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.path.cmp(&b.path)));

        let mut total: u64 = files.iter().map(|f| f.size).sum();
        let mut removed = 0;
        let deletable = files.len() - 1;
        for candidate in &files[..deletable] {
            if total <= total_cap {
                break;
            }
            if candidate.path == active {
                continue;
            }
            match fs::remove_file(&candidate.path) {
                Ok(()) => {
                    total = total.saturating_sub(candidate.size);
                    removed += 1;
                }
                Err(_) => continue,
            }
        }
        removed
    }

    fn category_lock(&self, category: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock();
        locks.entry(category.to_owned()).or_default().clone()
    }
}

/// Enumerates regular files named `<category>.<anything>.<base-name>`.
///
/// The alias (`<base-name>.<category>`) and unrelated files never match. A
/// length guard rejects degenerate names where prefix and suffix overlap.
fn collect(directory: &Path, category: &str, base_name: &str) -> Result<Vec<Candidate>, FsErrorKind> {
    let prefix = format!("{category}.");
    let suffix = format!(".{base_name}");

    let mut out = Vec::new();
    for entry in fs::read_dir(directory).map_err(FsErrorKind::from)? {
        let Ok(entry) = entry else { continue };
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if !file_type.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if name.len() <= prefix.len() + suffix.len()
            || !name.starts_with(&prefix)
            || !name.ends_with(&suffix)
        {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        out.push(Candidate {
            path: entry.path(),
            size: metadata.len(),
            modified,
        });
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    /// Creates a file of `size` bytes; sleeps briefly afterwards so that
    /// modification times order the way creation did.
    fn put_file(directory: &Path, name: &str, size: usize) -> PathBuf {
        let path = directory.join(name);
        fs::write(&path, vec![b'x'; size]).expect("write fixture");
        thread::sleep(Duration::from_millis(30));
        path
    }

    #[test]
    fn test_budget_enforced_oldest_first() {
        let dir = tempfile::tempdir().expect("tempdir");
        let oldest = put_file(dir.path(), "INFO.20250101_000001.app", 1000);
        let middle = put_file(dir.path(), "INFO.20250101_000002.app", 1000);
        let active = put_file(dir.path(), "INFO.20250101_000003.app", 1000);

        let sweeper = RetentionSweeper::new();
        let removed = sweeper.enforce_budget(dir.path(), "INFO", "app", &active, 2000);

        assert_eq!(removed, 1);
        assert!(!oldest.exists(), "the oldest file goes first");
        assert!(middle.exists());
        assert!(active.exists());
    }

    #[test]
    fn test_active_file_survives_even_over_budget() {
        let dir = tempfile::tempdir().expect("tempdir");
        let old = put_file(dir.path(), "WARN.20250101_000001.app", 500);
        let active = put_file(dir.path(), "WARN.20250101_000002.app", 5000);

        let sweeper = RetentionSweeper::new();
        sweeper.enforce_budget(dir.path(), "WARN", "app", &active, 1000);

        assert!(!old.exists());
        assert!(active.exists(), "the active file alone may exceed the budget");
    }

    #[test]
    fn test_single_file_untouched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let only = put_file(dir.path(), "ERROR.20250101_000001.app", 9000);

        let sweeper = RetentionSweeper::new();
        let removed = sweeper.enforce_budget(dir.path(), "ERROR", "app", &only, 100);

        assert_eq!(removed, 0);
        assert!(only.exists());
    }

    #[test]
    fn test_unrelated_and_alias_files_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let alias = put_file(dir.path(), "app.INFO", 4000);
        let other_category = put_file(dir.path(), "WARN.20250101_000001.app", 4000);
        let other_base = put_file(dir.path(), "INFO.20250101_000001.other", 4000);
        let old = put_file(dir.path(), "INFO.20250101_000002.app", 4000);
        let active = put_file(dir.path(), "INFO.20250101_000003.app", 4000);

        let sweeper = RetentionSweeper::new();
        sweeper.enforce_budget(dir.path(), "INFO", "app", &active, 4000);

        assert!(alias.exists());
        assert!(other_category.exists());
        assert!(other_base.exists());
        assert!(!old.exists(), "only the category's own files are swept");
        assert!(active.exists());
    }

    #[test]
    fn test_missing_directory_is_harmless() {
        let sweeper = RetentionSweeper::new();
        let removed = sweeper.enforce_budget(
            Path::new("/nonexistent/tierlog-test"),
            "INFO",
            "app",
            Path::new("/nonexistent/tierlog-test/INFO.x.app"),
            1000,
        );
        assert_eq!(removed, 0);
    }

    #[test]
    fn test_under_budget_deletes_nothing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let a = put_file(dir.path(), "INFO.20250101_000001.app", 100);
        let b = put_file(dir.path(), "INFO.20250101_000002.app", 100);

        let sweeper = RetentionSweeper::new();
        let removed = sweeper.enforce_budget(dir.path(), "INFO", "app", &b, 1000);

        assert_eq!(removed, 0);
        assert!(a.exists());
        assert!(b.exists());
    }
}
