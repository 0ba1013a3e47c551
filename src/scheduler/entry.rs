//! The persisted schedule record and where it lives.

use crate::error::Result;
use crate::persist::{load_json, store_json};
use crate::retention::SECONDS_PER_DAY;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// File name of the schedule document inside the state directory.
pub const SCHEDULE_FILE: &str = "schedule.json";

/// Handler identifier recorded for the daily sweep.
pub const SWEEP_HANDLER_ID: &str = "retention_sweep";

/// Period of the recurring sweep.
pub const DAILY_PERIOD: Duration = Duration::from_secs(SECONDS_PER_DAY);

/// A recurring trigger.
///
/// Times are whole seconds since the Unix epoch so the record survives
/// restarts and is readable by other tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// When the trigger should fire next
    pub next_fire_time: u64,
    /// Seconds between firings
    pub period_secs: u64,
    /// What the trigger runs
    pub handler_id: String,
}

impl ScheduleEntry {
    /// Creates the daily sweep trigger, first firing at `first_fire`.
    pub fn daily_sweep(first_fire: SystemTime) -> Self {
        Self {
            next_fire_time: unix_secs(first_fire),
            period_secs: DAILY_PERIOD.as_secs(),
            handler_id: SWEEP_HANDLER_ID.to_string(),
        }
    }

    pub fn next_fire(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(self.next_fire_time)
    }

    /// The firing period. A hand-edited zero period falls back to daily.
    pub fn period(&self) -> Duration {
        if self.period_secs == 0 {
            DAILY_PERIOD
        } else {
            Duration::from_secs(self.period_secs)
        }
    }

    #[inline]
    pub fn is_due(&self, now: SystemTime) -> bool {
        self.next_fire_time <= unix_secs(now)
    }

    /// Moves the next fire time to the first tick of the period grid strictly
    /// after `now`. Missed ticks are skipped, not replayed.
    pub fn advance_past(&mut self, now: SystemTime) {
        let now = unix_secs(now);
        if self.next_fire_time > now {
            return;
        }

        let period = self.period().as_secs();
        let missed = (now - self.next_fire_time) / period + 1;
        self.next_fire_time = self
            .next_fire_time
            .saturating_add(missed.saturating_mul(period));
    }

    /// Time left until the next firing, zero if already due.
    pub fn until_next(&self, now: SystemTime) -> Duration {
        self.next_fire().duration_since(now).unwrap_or(Duration::ZERO)
    }
}

/// Seconds since the Unix epoch, clamped to zero for earlier times.
pub fn unix_secs(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Persistence for the single schedule record.
pub trait ScheduleStore: Send + Sync + fmt::Debug {
    /// Loads the record, `None` if the schedule was never registered.
    fn load(&self) -> Result<Option<ScheduleEntry>>;

    /// Replaces the record.
    fn save(&self, entry: &ScheduleEntry) -> Result<()>;
}

/// Schedule kept in memory. It does not survive restarts.
#[derive(Debug, Default)]
pub struct MemoryScheduleStore {
    entry: RwLock<Option<ScheduleEntry>>,
}

impl MemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(entry: ScheduleEntry) -> Self {
        Self {
            entry: RwLock::new(Some(entry)),
        }
    }
}

impl ScheduleStore for MemoryScheduleStore {
    fn load(&self) -> Result<Option<ScheduleEntry>> {
        Ok(self.entry.read().unwrap().clone())
    }

    fn save(&self, entry: &ScheduleEntry) -> Result<()> {
        *self.entry.write().unwrap() = Some(entry.clone());
        Ok(())
    }
}

/// Schedule persisted as JSON on disk.
#[derive(Debug, Clone)]
pub struct JsonScheduleStore {
    path: PathBuf,
}

impl JsonScheduleStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store for `schedule.json` inside `state_dir`.
    pub fn in_dir(state_dir: impl AsRef<Path>) -> Self {
        Self::new(state_dir.as_ref().join(SCHEDULE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScheduleStore for JsonScheduleStore {
    fn load(&self) -> Result<Option<ScheduleEntry>> {
        load_json(&self.path)
    }

    fn save(&self, entry: &ScheduleEntry) -> Result<()> {
        store_json(&self.path, entry)
    }
}
