//! Age-based keep/delete decision.

use std::time::{Duration, SystemTime};

/// Number of seconds in one retention day.
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Returns `true` if a file last modified at `modified` is at least
/// `threshold` old at `now`.
///
/// A modification time in the future (clock skew, restored backups) is never
/// old enough: `duration_since` fails instead of wrapping, and the file is kept.
///
/// # Example
///
/// ```
/// use logsweep::retention::should_delete;
/// use std::time::{Duration, SystemTime};
///
/// let now = SystemTime::now();
/// let day = Duration::from_secs(86_400);
///
/// assert!(should_delete(now - day * 10, now, day));
/// assert!(!should_delete(now - Duration::from_secs(3600), now, day));
/// assert!(!should_delete(now + day, now, Duration::ZERO));
/// ```
#[inline]
pub fn should_delete(modified: SystemTime, now: SystemTime, threshold: Duration) -> bool {
    match now.duration_since(modified) {
        Ok(age) => age >= threshold,
        Err(_) => false,
    }
}

/// Converts a number of retention days into a threshold duration.
#[inline]
pub fn threshold_for_days(days: u64) -> Duration {
    Duration::from_secs(days.saturating_mul(SECONDS_PER_DAY))
}
