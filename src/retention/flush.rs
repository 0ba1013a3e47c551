//! Unconditional one-level flush of a log directory.
//!
//! Unlike the sweeper this ignores file age and never recurses. Every regular
//! file directly inside the directory whose extension is `log` is removed,
//! except the protected diagnostics log.
//!
//! The extension is whatever follows the last `.` of the name, so a bare
//! `.log` counts as a log file with an empty stem.

use crate::retention::{remove_log_file, SweepReport};
use std::ffi::OsStr;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, info, trace, warn};

/// File stem that a flush never deletes (`test-log.log`).
pub const PROTECTED_LOG_NAME: &str = "test-log";

/// Deletes every `.log` file directly in `dir` except `test-log.log`.
pub fn flush_all(dir: impl AsRef<Path>) -> SweepReport {
    flush_all_except(dir, PROTECTED_LOG_NAME)
}

/// Deletes every `.log` file directly in `dir` whose stem is not `protected`.
pub fn flush_all_except(dir: impl AsRef<Path>, protected: &str) -> SweepReport {
    let dir = dir.as_ref();
    let mut report = SweepReport::default();

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(dir = %dir.display(), "Nothing to flush, log directory does not exist");
            return report;
        }
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "Failed to list log directory");
            report.failed += 1;
            return report;
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

        let path = entry.path();
        let file_name = entry.file_name();
        let Some((stem, b"log")) = split_extension(&file_name) else {
            continue;
        };

        match fs::metadata(&path) {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => {
                trace!(path = %path.display(), "Not a regular file, skipping");
                continue;
            }
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to stat log entry");
                report.failed += 1;
                continue;
            }
        }

        if stem == protected.as_bytes() {
            trace!(path = %path.display(), "Keeping protected log file");
            report.kept += 1;
            continue;
        }

        report.record(remove_log_file(&path));
    }

    info!(
        dir = %dir.display(),
        deleted = report.deleted,
        failed = report.failed,
        "Log directory flushed"
    );

    report
}

/// Splits a file name at its last `.` into stem and extension bytes.
///
/// Unlike [`Path::extension`], a leading dot still separates an extension:
/// `.log` splits into `""` and `"log"`.
fn split_extension(name: &OsStr) -> Option<(&[u8], &[u8])> {
    let name = name.as_encoded_bytes();
    let dot = name.iter().rposition(|&b| b == b'.')?;
    Some((&name[..dot], &name[dot + 1..]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::{Duration, SystemTime};

    fn touch(path: &Path, age: Duration) {
        let file = File::create(path).unwrap();
        file.set_modified(SystemTime::now() - age).unwrap();
    }

    #[test]
    fn test_flush_keeps_protected_file() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("test-log.log"), Duration::from_secs(86_400 * 365));
        touch(&dir.path().join("old.log"), Duration::from_secs(86_400 * 30));

        let report = flush_all(dir.path());
        assert_eq!(report.deleted, 1);
        assert_eq!(report.kept, 1);
        assert!(dir.path().join("test-log.log").exists());
        assert!(!dir.path().join("old.log").exists());
    }

    #[test]
    fn test_flush_ignores_age() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("just-now.log"), Duration::ZERO);
        touch(&dir.path().join("hour.log"), Duration::from_secs(3_600));

        let report = flush_all(dir.path());
        assert_eq!(report.deleted, 2);
        assert!(!dir.path().join("just-now.log").exists());
    }

    #[test]
    fn test_flush_only_log_extension() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("keep.txt"), Duration::ZERO);
        touch(&dir.path().join("keep.log.1"), Duration::ZERO);
        touch(&dir.path().join("keep.LOG"), Duration::ZERO);
        touch(&dir.path().join(".htaccess"), Duration::ZERO);

        let report = flush_all(dir.path());
        assert_eq!(report.examined(), 0);
        assert!(dir.path().join("keep.txt").exists());
        assert!(dir.path().join("keep.log.1").exists());
        assert!(dir.path().join("keep.LOG").exists());
    }

    #[test]
    fn test_flush_removes_bare_dot_log() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join(".log"), Duration::ZERO);
        touch(&dir.path().join("a.log"), Duration::ZERO);
        touch(&dir.path().join(".hidden.log"), Duration::ZERO);

        let report = flush_all(dir.path());
        assert_eq!(report.deleted, 3);
        assert_eq!(report.kept, 0);
        assert!(!dir.path().join(".log").exists());
        assert!(!dir.path().join(".hidden.log").exists());
    }

    #[test]
    fn test_split_extension() {
        let split = |name: &str| {
            split_extension(OsStr::new(name)).map(|(stem, ext)| (stem.to_vec(), ext.to_vec()))
        };
        assert_eq!(split(".log"), Some((b"".to_vec(), b"log".to_vec())));
        assert_eq!(split("a.b.log"), Some((b"a.b".to_vec(), b"log".to_vec())));
        assert_eq!(split("test-log.log"), Some((b"test-log".to_vec(), b"log".to_vec())));
        assert_eq!(split("README"), None);
        assert_eq!(split("trailing."), Some((b"trailing".to_vec(), b"".to_vec())));
    }

    #[test]
    fn test_flush_does_not_recurse() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested.log");
        fs::create_dir(&nested).unwrap();
        touch(&nested.join("inner.log"), Duration::ZERO);

        let report = flush_all(dir.path());
        assert_eq!(report.deleted, 0);
        assert_eq!(report.failed, 0);
        assert!(nested.join("inner.log").exists());
    }

    #[test]
    fn test_protected_name_is_exact_stem() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("test-log-2.log"), Duration::ZERO);
        touch(&dir.path().join("my-test-log.log"), Duration::ZERO);

        let report = flush_all(dir.path());
        assert_eq!(report.deleted, 2);
    }

    #[test]
    fn test_custom_protected_name() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("debug.log"), Duration::ZERO);
        touch(&dir.path().join("test-log.log"), Duration::ZERO);

        let report = flush_all_except(dir.path(), "debug");
        assert_eq!(report.deleted, 1);
        assert!(dir.path().join("debug.log").exists());
        assert!(!dir.path().join("test-log.log").exists());
    }

    #[test]
    fn test_flush_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let report = flush_all(dir.path().join("absent"));
        assert_eq!(report, SweepReport::default());
    }

    #[test]
    fn test_flush_twice_is_safe() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.log"), Duration::ZERO);

        assert_eq!(flush_all(dir.path()).deleted, 1);
        let second = flush_all(dir.path());
        assert_eq!(second.deleted, 0);
        assert_eq!(second.failed, 0);
    }
}
