//! Schedule bookkeeping and the daily sweep itself.

use crate::config::{effective_retention_days, ConfigStore};
use crate::error::Result;
use crate::retention::{threshold_for_days, DirectorySweeper, SweepReport};
use crate::scheduler::entry::{ScheduleEntry, ScheduleStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};

/// Whether the recurring sweep has been registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleState {
    Unregistered,
    Active(ScheduleEntry),
}

impl ScheduleState {
    pub fn is_active(&self) -> bool {
        matches!(self, ScheduleState::Active(_))
    }
}

/// Outcome of [`Scheduler::ensure_registered`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// A new trigger was created
    Registered(ScheduleEntry),
    /// A trigger already existed and was left alone
    AlreadyActive(ScheduleEntry),
}

impl Registration {
    pub fn entry(&self) -> &ScheduleEntry {
        match self {
            Registration::Registered(entry) | Registration::AlreadyActive(entry) => entry,
        }
    }
}

/// Owns the daily sweep trigger for one log directory.
///
/// The scheduler does not keep time itself. Callers pass `now`, which keeps
/// the due-check testable and lets the same logic serve both the background
/// task and a one-shot `run-pending` invocation from an external cron.
#[derive(Debug)]
pub struct Scheduler {
    config: Arc<dyn ConfigStore>,
    store: Arc<dyn ScheduleStore>,
    log_dir: PathBuf,
    sweeper: DirectorySweeper,
}

impl Scheduler {
    pub fn new(
        config: Arc<dyn ConfigStore>,
        store: Arc<dyn ScheduleStore>,
        log_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            config,
            store,
            log_dir: log_dir.into(),
            sweeper: DirectorySweeper::new(),
        }
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn state(&self) -> Result<ScheduleState> {
        Ok(match self.store.load()? {
            Some(entry) => ScheduleState::Active(entry),
            None => ScheduleState::Unregistered,
        })
    }

    /// Registers the daily trigger unless one already exists.
    ///
    /// A new trigger is due immediately, so the first sweep runs on the next
    /// call to [`run_pending`](Self::run_pending).
    pub fn ensure_registered(&self, now: SystemTime) -> Result<Registration> {
        if let Some(entry) = self.store.load()? {
            debug!(next_fire_time = entry.next_fire_time, "Sweep schedule already active");
            return Ok(Registration::AlreadyActive(entry));
        }

        let entry = ScheduleEntry::daily_sweep(now);
        self.store.save(&entry)?;

        info!(
            next_fire_time = entry.next_fire_time,
            period_secs = entry.period_secs,
            handler = %entry.handler_id,
            "Registered daily log sweep"
        );

        Ok(Registration::Registered(entry))
    }

    /// Retention days currently in effect.
    ///
    /// An unreadable settings store is treated like an unset value.
    pub fn retention_days(&self) -> u64 {
        let raw = match self.config.retention_days() {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Failed to read retention setting, using default");
                None
            }
        };
        effective_retention_days(raw)
    }

    /// Minimum age a log file must reach before the sweep deletes it.
    pub fn threshold(&self) -> Duration {
        threshold_for_days(self.retention_days())
    }

    /// Sweeps the log directory now with the configured threshold.
    pub fn fire(&self) -> SweepReport {
        self.fire_at(SystemTime::now())
    }

    fn fire_at(&self, now: SystemTime) -> SweepReport {
        let days = self.retention_days();
        let report = self
            .sweeper
            .sweep_at(&self.log_dir, threshold_for_days(days), now);

        if report.has_deletions() || report.has_failures() {
            info!(
                log_dir = %self.log_dir.display(),
                retention_days = days,
                deleted = report.deleted,
                kept = report.kept,
                failed = report.failed,
                "Log sweep complete"
            );
        } else {
            debug!(
                log_dir = %self.log_dir.display(),
                retention_days = days,
                kept = report.kept,
                "Log sweep complete, nothing to delete"
            );
        }

        report
    }

    /// Runs the sweep if the trigger is due at `now`.
    ///
    /// The trigger is moved to its next tick and saved before the sweep
    /// starts, so a sweep that crashes the process is not retried in a loop.
    /// Several missed periods result in a single sweep.
    pub fn run_pending(&self, now: SystemTime) -> Result<Option<SweepReport>> {
        let Some(mut entry) = self.store.load()? else {
            return Ok(None);
        };

        if !entry.is_due(now) {
            return Ok(None);
        }

        entry.advance_past(now);
        self.store.save(&entry)?;

        Ok(Some(self.fire_at(now)))
    }

    /// Time until the next firing, `None` while unregistered.
    pub fn until_next(&self, now: SystemTime) -> Result<Option<Duration>> {
        Ok(self.store.load()?.map(|entry| entry.until_next(now)))
    }
}
