//! Retention Settings
//!
//! The only setting the sweep depends on is the number of days a log file is
//! kept. It is written by whatever owns the settings UI and read by the
//! scheduler on every run, through the [`ConfigStore`] trait.
//!
//! Stored values are not trusted: a missing, unparsable, zero or negative
//! value means "use the default of one day". That substitution happens in
//! [`effective_retention_days`], not in the stores, so a store always reports
//! exactly what was persisted.

pub mod store;

pub use store::{ConfigStore, JsonConfigStore, MemoryConfigStore, SETTINGS_FILE};

use crate::error::{Error, Result};
use crate::retention::age::threshold_for_days;
use std::time::Duration;

/// Retention used when nothing valid is configured.
pub const DEFAULT_RETENTION_DAYS: u64 = 1;

/// Resolves a stored retention value to the number of days to keep logs.
///
/// # Example
///
/// ```
/// use logsweep::config::effective_retention_days;
///
/// assert_eq!(effective_retention_days(Some(7)), 7);
/// assert_eq!(effective_retention_days(Some(0)), 1);
/// assert_eq!(effective_retention_days(Some(-3)), 1);
/// assert_eq!(effective_retention_days(None), 1);
/// ```
pub fn effective_retention_days(raw: Option<i64>) -> u64 {
    match raw {
        Some(days) if days > 0 => days as u64,
        _ => DEFAULT_RETENTION_DAYS,
    }
}

/// Threshold a sweep should use for a stored retention value.
pub fn retention_threshold(raw: Option<i64>) -> Duration {
    threshold_for_days(effective_retention_days(raw))
}

/// Rejects values that would silently fall back to the default.
///
/// Used by front ends that write the setting; the sweep itself never calls it.
pub fn validate_retention_days(days: i64) -> Result<u64> {
    if days < 1 {
        return Err(Error::InvalidRetentionDays(days));
    }
    Ok(days as u64)
}
