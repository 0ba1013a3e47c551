//! Recursive Age-Based Sweep
//!
//! Walks a log directory and deletes every `*.log` file whose modification
//! time is at least the retention threshold in the past.
//!
//! ## Traversal Rules
//!
//! ```text
//! wc-logs/
//! ├── old.log            file, 10 days  ──> deleted
//! ├── fresh.log          file, 1 hour   ──> kept
//! ├── notes.txt          no match       ──> never looked at
//! ├── archive.log/       directory      ──> recursed into, never deleted
//! │   └── older.log      file, 30 days  ──> deleted
//! └── plugins/           no match       ──> never descended into
//!     └── stale.log                     ──> untouched
//! ```
//!
//! Only entries whose *name* matches the pattern are considered, and that
//! rule applies to directories too: a directory is descended into only when
//! its own name ends in `.log`. Symlinks are followed, so recursion depth is
//! capped at [`MAX_DEPTH`] to make link cycles terminate.

use crate::retention::age::should_delete;
use crate::retention::pattern::GlobPattern;
use crate::retention::{remove_log_file, SweepReport};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::{Duration, SystemTime};
use tracing::{debug, trace, warn};

/// Maximum directory nesting the sweeper will descend into.
pub const MAX_DEPTH: usize = 32;

/// Deletes aged log files from a directory tree.
#[derive(Debug, Clone)]
pub struct DirectorySweeper {
    pattern: GlobPattern,
    max_depth: usize,
}

impl Default for DirectorySweeper {
    fn default() -> Self {
        Self::new()
    }
}

impl DirectorySweeper {
    /// Creates a sweeper matching `*.log`.
    pub fn new() -> Self {
        Self::with_pattern(GlobPattern::default())
    }

    /// Creates a sweeper matching a custom filename pattern.
    pub fn with_pattern(pattern: GlobPattern) -> Self {
        Self {
            pattern,
            max_depth: MAX_DEPTH,
        }
    }

    /// Overrides the nesting limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn pattern(&self) -> &GlobPattern {
        &self.pattern
    }

    /// Sweeps `root` using the current time.
    pub fn sweep(&self, root: impl AsRef<Path>, threshold: Duration) -> SweepReport {
        self.sweep_at(root, threshold, SystemTime::now())
    }

    /// Sweeps `root` as if the current time were `now`.
    ///
    /// The same `now` is used for every file in the tree.
    pub fn sweep_at(
        &self,
        root: impl AsRef<Path>,
        threshold: Duration,
        now: SystemTime,
    ) -> SweepReport {
        let root = root.as_ref();
        let mut report = SweepReport::default();

        self.sweep_dir(root, threshold, now, 0, &mut report);

        debug!(
            root = %root.display(),
            threshold_secs = threshold.as_secs(),
            deleted = report.deleted,
            kept = report.kept,
            failed = report.failed,
            directories = report.directories,
            "Sweep finished"
        );

        report
    }

    fn sweep_dir(
        &self,
        dir: &Path,
        threshold: Duration,
        now: SystemTime,
        depth: usize,
        report: &mut SweepReport,
    ) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(dir = %dir.display(), "Log directory does not exist");
                return;
            }
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Failed to list log directory");
                report.failed += 1;
                return;
            }
        };

        report.directories += 1;

        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "Failed to read directory entry");
                    report.failed += 1;
                    continue;
                }
            };

            if !self.pattern.matches(&entry.file_name()) {
                continue;
            }

            let path = entry.path();

            // Follows symlinks, so a link to a log file is judged by its target.
            let metadata = match fs::metadata(&path) {
                Ok(metadata) => metadata,
                Err(e) if e.kind() == ErrorKind::NotFound => {
                    trace!(path = %path.display(), "Entry vanished or dangling link");
                    continue;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to stat log entry");
                    report.failed += 1;
                    continue;
                }
            };

            if metadata.is_file() {
                let modified = match metadata.modified() {
                    Ok(modified) => modified,
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "No modification time");
                        report.failed += 1;
                        continue;
                    }
                };

                if should_delete(modified, now, threshold) {
                    report.record(remove_log_file(&path));
                } else {
                    report.kept += 1;
                }
            } else if metadata.is_dir() {
                if depth >= self.max_depth {
                    warn!(
                        path = %path.display(),
                        max_depth = self.max_depth,
                        "Not descending further, nesting limit reached"
                    );
                    continue;
                }
                self.sweep_dir(&path, threshold, now, depth + 1, report);
            } else {
                trace!(path = %path.display(), "Skipping special file");
            }
        }
    }
}

/// Sweeps `root` for `*.log` files at least `threshold` old.
///
/// This is a convenience wrapper around [`DirectorySweeper::sweep`].
pub fn sweep(root: impl AsRef<Path>, threshold: Duration) -> SweepReport {
    DirectorySweeper::new().sweep(root, threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retention::age::threshold_for_days;
    use std::fs::File;

    const HOUR: Duration = Duration::from_secs(3_600);
    const DAY: Duration = Duration::from_secs(86_400);

    fn touch(path: &Path, age: Duration) {
        let file = File::create(path).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
    }

    #[test]
    fn test_only_files_past_threshold_deleted() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.log"), DAY * 10);
        touch(&dir.path().join("b.log"), HOUR);

        let report = sweep(dir.path(), threshold_for_days(11));
        assert_eq!(report.deleted, 0);
        assert_eq!(report.kept, 2);

        let report = sweep(dir.path(), threshold_for_days(1));
        assert_eq!(report.deleted, 1);
        assert_eq!(report.kept, 1);
        assert!(!dir.path().join("a.log").exists());
        assert!(dir.path().join("b.log").exists());
    }

    #[test]
    fn test_week_threshold_deletes_ten_day_old_file() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.log"), DAY * 10);
        touch(&dir.path().join("b.log"), HOUR);

        let report = sweep(dir.path(), threshold_for_days(7));
        assert_eq!(report.deleted, 1);
        assert!(dir.path().join("b.log").exists());
    }

    #[test]
    fn test_recent_files_survive_week_threshold() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.log"), DAY * 3);
        touch(&dir.path().join("b.log"), HOUR);

        let report = sweep(dir.path(), threshold_for_days(7));
        assert_eq!(report.deleted, 0);
        assert!(dir.path().join("a.log").exists());
        assert!(dir.path().join("b.log").exists());
    }

    #[test]
    fn test_sweep_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..5 {
            touch(&dir.path().join(format!("old-{}.log", i)), DAY * 2);
        }
        touch(&dir.path().join("new.log"), HOUR);

        let first = sweep(dir.path(), DAY);
        assert_eq!(first.deleted, 5);

        let second = sweep(dir.path(), DAY);
        assert_eq!(second.deleted, 0);
        assert_eq!(second.kept, 1);
    }

    #[test]
    fn test_non_log_files_untouched() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("old.txt"), DAY * 30);
        touch(&dir.path().join("old.log.gz"), DAY * 30);
        touch(&dir.path().join(".hidden.log"), DAY * 30);

        let report = sweep(dir.path(), Duration::ZERO);
        assert_eq!(report.examined(), 0);
        assert!(dir.path().join("old.txt").exists());
        assert!(dir.path().join("old.log.gz").exists());
        assert!(dir.path().join(".hidden.log").exists());
    }

    #[test]
    fn test_recurses_into_log_named_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("archive.log");
        fs::create_dir(&nested).unwrap();
        touch(&nested.join("older.log"), DAY * 30);
        touch(&nested.join("fresh.log"), HOUR);

        let report = sweep(dir.path(), DAY);
        assert_eq!(report.deleted, 1);
        assert_eq!(report.kept, 1);
        assert_eq!(report.directories, 2);
        assert!(nested.is_dir());
        assert!(!nested.join("older.log").exists());
        assert!(nested.join("fresh.log").exists());
    }

    #[test]
    fn test_plain_subdirectory_never_descended() {
        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("plugins");
        fs::create_dir(&plain).unwrap();
        touch(&plain.join("stale.log"), DAY * 30);

        let report = sweep(dir.path(), DAY);
        assert_eq!(report.deleted, 0);
        assert_eq!(report.directories, 1);
        assert!(plain.join("stale.log").exists());
    }

    #[test]
    fn test_future_dated_file_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skewed.log");
        let file = File::create(&path).unwrap();
        file.set_modified(SystemTime::now() + DAY).unwrap();

        let report = sweep(dir.path(), Duration::ZERO);
        assert_eq!(report.deleted, 0);
        assert_eq!(report.kept, 1);
        assert!(path.exists());
    }

    #[test]
    fn test_sweep_at_fixed_clock() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.log");
        let modified = SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000);
        File::create(&path).unwrap().set_modified(modified).unwrap();

        let sweeper = DirectorySweeper::new();
        let report = sweeper.sweep_at(dir.path(), DAY, modified + DAY - Duration::from_secs(1));
        assert_eq!(report.deleted, 0);

        let report = sweeper.sweep_at(dir.path(), DAY, modified + DAY);
        assert_eq!(report.deleted, 1);
    }

    #[test]
    fn test_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let report = sweep(dir.path().join("absent"), DAY);
        assert_eq!(report, SweepReport::default());
    }

    #[test]
    fn test_root_is_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("not-a-dir");
        touch(&path, HOUR);

        let report = sweep(&path, DAY);
        assert_eq!(report.deleted, 0);
        assert_eq!(report.failed, 1);
        assert_eq!(report.directories, 0);
    }

    #[test]
    fn test_custom_pattern() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("debug.txt"), DAY * 2);
        touch(&dir.path().join("a.log"), DAY * 2);

        let sweeper = DirectorySweeper::with_pattern(GlobPattern::new("*.txt"));
        let report = sweeper.sweep(dir.path(), DAY);
        assert_eq!(report.deleted, 1);
        assert!(!dir.path().join("debug.txt").exists());
        assert!(dir.path().join("a.log").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_cycle_terminates() {
        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("loop.log")).unwrap();
        touch(&dir.path().join("old.log"), DAY * 2);

        let report = sweep(dir.path(), DAY);
        assert_eq!(report.deleted, 1);
        assert_eq!(report.directories as usize, MAX_DEPTH + 1);
        assert!(dir.path().join("loop.log").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(dir.path().join("gone"), dir.path().join("dangling.log"))
            .unwrap();

        let report = sweep(dir.path(), Duration::ZERO);
        assert_eq!(report.examined(), 0);
    }

    #[test]
    fn test_max_depth_limits_recursion() {
        let dir = tempfile::tempdir().unwrap();
        let level1 = dir.path().join("one.log");
        let level2 = level1.join("two.log");
        fs::create_dir_all(&level2).unwrap();
        touch(&level1.join("a.log"), DAY * 2);
        touch(&level2.join("b.log"), DAY * 2);

        let report = DirectorySweeper::new()
            .with_max_depth(1)
            .sweep(dir.path(), DAY);
        assert_eq!(report.deleted, 1);
        assert!(!level1.join("a.log").exists());
        assert!(level2.join("b.log").exists());
    }
}
