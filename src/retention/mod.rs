//! Retention Module
//!
//! The filesystem side of logsweep: deciding whether a log file is old
//! enough, walking a log directory to delete the ones that are, and the
//! unconditional "delete everything now" flush.
//!
//! ## Architecture
//!
//! ```text
//!   Scheduler (daily)                 Manual trigger
//!         │                                 │
//!         ▼                                 ▼
//! ┌──────────────────┐             ┌──────────────────┐
//! │ DirectorySweeper │             │  ImmediateFlush  │
//! │  (recursive,     │             │  (one level,     │
//! │   *.log only)    │             │   ignores age)   │
//! └────────┬─────────┘             └────────┬─────────┘
//!          │                                │
//!          ▼                                │
//! ┌──────────────────┐                      │
//! │    AgeFilter     │                      │
//! └────────┬─────────┘                      │
//!          │                                │
//!          ▼                                ▼
//!    ┌────────────────────────────────────────────┐
//!    │      remove_file (delete-if-exists)        │
//!    └────────────────────────────────────────────┘
//! ```
//!
//! ## Failure Model
//!
//! Neither pass ever fails as a whole. A file that cannot be inspected or
//! removed is logged and counted in the [`SweepReport`], and the pass moves
//! on to the next entry. A file that disappears before it can be removed
//! (another sweep or flush got there first) is simply skipped.
//!
//! ## Example
//!
//! ```no_run
//! use logsweep::retention::{flush_all, sweep, threshold_for_days};
//!
//! let report = sweep("/var/www/uploads/wc-logs", threshold_for_days(7));
//! println!("{} deleted, {} failed", report.deleted, report.failed);
//!
//! // test-log.log survives a flush
//! let report = flush_all("/var/www/uploads/wc-logs");
//! assert!(report.kept <= 1);
//! ```

pub mod age;
pub mod flush;
pub mod pattern;
pub mod sweeper;

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{trace, warn};

pub use age::{should_delete, threshold_for_days, SECONDS_PER_DAY};
pub use flush::{flush_all, flush_all_except, PROTECTED_LOG_NAME};
pub use pattern::{GlobPattern, LOG_PATTERN};
pub use sweeper::{sweep, DirectorySweeper, MAX_DEPTH};

/// Summary of a single sweep or flush.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    /// Files removed
    pub deleted: u64,
    /// Matching files left in place (too young, or protected)
    pub kept: u64,
    /// Entries that could not be inspected or removed
    pub failed: u64,
    /// Directories listed, including the root
    pub directories: u64,
}

impl SweepReport {
    /// Number of log files the pass looked at.
    pub fn examined(&self) -> u64 {
        self.deleted + self.kept + self.failed
    }

    /// Check if anything was deleted.
    pub fn has_deletions(&self) -> bool {
        self.deleted > 0
    }

    /// Check if any entry failed.
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Folds the counters of a nested pass into this one.
    pub fn merge(&mut self, other: SweepReport) {
        self.deleted += other.deleted;
        self.kept += other.kept;
        self.failed += other.failed;
        self.directories += other.directories;
    }

    pub(crate) fn record(&mut self, removal: Removal) {
        match removal {
            Removal::Deleted => self.deleted += 1,
            Removal::AlreadyGone => {}
            Removal::Failed => self.failed += 1,
        }
    }
}

/// Outcome of removing one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Removal {
    Deleted,
    AlreadyGone,
    Failed,
}

/// Removes `path`, treating "already gone" as success without a deletion.
pub(crate) fn remove_log_file(path: &Path) -> Removal {
    match fs::remove_file(path) {
        Ok(()) => {
            trace!(path = %path.display(), "Deleted log file");
            Removal::Deleted
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            trace!(path = %path.display(), "Log file already gone");
            Removal::AlreadyGone
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to delete log file");
            Removal::Failed
        }
    }
}
