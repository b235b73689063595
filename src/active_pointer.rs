// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stable alias publication for the active file of a category.
//!
//! Every rotation publishes `<directory>/<base-name>.<category>` so operators
//! and tooling can follow one fixed name (`tail -F app.INFO`) while the real
//! file underneath changes. Publication is a convenience, never a correctness
//! requirement: any failure is absorbed here and the write path proceeds.
//!
//! The mechanism is pluggable via [`PointerBackend`]. The default chain tries
//! a relative symbolic link first and falls back to a marker file on
//! platforms or filesystems where symlinks are unavailable.

use crate::error::FsErrorKind;
use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Strategy for making an alias name resolve to the active file.
pub trait PointerBackend: Debug + Send + Sync {
    /// Makes `alias` resolve to `target_file_name`, replacing any prior
    /// alias. `target_file_name` is the bare file name of the active file;
    /// backends must keep the reference relative so the directory stays
    /// relocatable.
    fn publish(&self, alias: &Path, target_file_name: &str) -> Result<(), FsErrorKind>;
}

/// Publishes the alias as a symbolic link with a relative target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SymlinkBackend;

impl PointerBackend for SymlinkBackend {
    fn publish(&self, alias: &Path, target_file_name: &str) -> Result<(), FsErrorKind> {
        remove_existing(alias)?;

        #[cfg(unix)]
        {
            std::os::unix::fs::symlink(target_file_name, alias).map_err(FsErrorKind::from)
        }
        #[cfg(windows)]
        {
            std::os::windows::fs::symlink_file(target_file_name, alias).map_err(FsErrorKind::from)
        }
        #[cfg(not(any(unix, windows)))]
        {
            let _ = target_file_name;
            Err(FsErrorKind::Other)
        }
    }
}

/// Fallback for platforms without symlinks: writes the active file's bare
/// name into a regular file at the alias path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MarkerFileBackend;

impl PointerBackend for MarkerFileBackend {
    fn publish(&self, alias: &Path, target_file_name: &str) -> Result<(), FsErrorKind> {
        // Remove first so a write never follows a stale symlink left behind
        // by a previously working backend.
        remove_existing(alias)?;
        fs::write(alias, format!("{target_file_name}\n")).map_err(FsErrorKind::from)
    }
}

fn remove_existing(alias: &Path) -> Result<(), FsErrorKind> {
    match fs::remove_file(alias) {
        Ok(()) => Ok(()),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(error) => Err(FsErrorKind::from(&error)),
    }
}

/// The default backend chain: symlink, then marker file.
pub(crate) fn default_backends() -> Vec<Arc<dyn PointerBackend>> {
    vec![Arc::new(SymlinkBackend), Arc::new(MarkerFileBackend)]
}

/// Maintains the alias for one category.
#[derive(Debug)]
pub(crate) struct ActivePointer {
    alias: PathBuf,
    backends: Vec<Arc<dyn PointerBackend>>,
}

impl ActivePointer {
    pub(crate) fn new(
        directory: &Path,
        base_name: &str,
        category: &str,
        backends: Vec<Arc<dyn PointerBackend>>,
    ) -> Self {
        Self {
            alias: directory.join(format!("{base_name}.{category}")),
            backends,
        }
    }

    /// Best-effort publication: backends are tried in order until one
    /// succeeds. All failure stops here; nothing is retried or reported.
    pub(crate) fn publish(&self, target_file_name: &str) {
        for backend in &self.backends {
            if backend.publish(&self.alias, target_file_name).is_ok() {
                return;
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn alias_path(&self) -> &Path {
        &self.alias
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_symlink_replaces_prior_alias() {
        let dir = tempfile::tempdir().expect("tempdir");
        let pointer = ActivePointer::new(dir.path(), "app", "INFO", default_backends());

        pointer.publish("INFO.20250101_000000.app");
        pointer.publish("INFO.20250101_000001.app");

        let target = fs::read_link(pointer.alias_path()).expect("alias resolves");
        assert_eq!(target, Path::new("INFO.20250101_000001.app"));
    }

    #[test]
    fn test_marker_file_backend() {
        let dir = tempfile::tempdir().expect("tempdir");
        let alias = dir.path().join("app.WARN");

        MarkerFileBackend
            .publish(&alias, "WARN.20250101_000000.app")
            .expect("marker publish");

        let contents = fs::read_to_string(&alias).expect("marker readable");
        assert_eq!(contents, "WARN.20250101_000000.app\n");
    }

    #[test]
    fn test_fallback_chain() {
        #[derive(Debug)]
        struct AlwaysFails;
        impl PointerBackend for AlwaysFails {
            fn publish(&self, _alias: &Path, _target: &str) -> Result<(), FsErrorKind> {
                Err(FsErrorKind::Other)
            }
        }

        let dir = tempfile::tempdir().expect("tempdir");
        let pointer = ActivePointer::new(
            dir.path(),
            "app",
            "ERROR",
            vec![Arc::new(AlwaysFails), Arc::new(MarkerFileBackend)],
        );

        pointer.publish("ERROR.20250101_000000.app");
        let contents = fs::read_to_string(pointer.alias_path()).expect("fallback wrote");
        assert!(contents.starts_with("ERROR.20250101_000000.app"));
    }

    #[test]
    fn test_all_backends_failing_is_silent() {
        #[derive(Debug)]
        struct AlwaysFails;
        impl PointerBackend for AlwaysFails {
            fn publish(&self, _alias: &Path, _target: &str) -> Result<(), FsErrorKind> {
                Err(FsErrorKind::PermissionDenied)
            }
        }

        let dir = tempfile::tempdir().expect("tempdir");
        let pointer = ActivePointer::new(dir.path(), "app", "INFO", vec![Arc::new(AlwaysFails)]);
        // Must not panic and must not create the alias.
        pointer.publish("INFO.20250101_000000.app");
        assert!(!pointer.alias_path().exists());
    }
}
