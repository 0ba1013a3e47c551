//! Settings storage backends.

use crate::error::Result;
use crate::persist::{load_json, store_json};
use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::debug;

/// File name of the settings document inside the state directory.
pub const SETTINGS_FILE: &str = "settings.json";

/// JSON key holding the retention setting.
const RETENTION_DAYS_KEY: &str = "retention_days";

/// Source of the retention setting.
///
/// Implementations report the raw persisted value; `Ok(None)` means nothing
/// usable is stored. Callers apply the default themselves.
pub trait ConfigStore: Send + Sync + fmt::Debug {
    /// Reads the stored retention in days.
    fn retention_days(&self) -> Result<Option<i64>>;

    /// Overwrites the stored retention in days.
    fn set_retention_days(&self, days: i64) -> Result<()>;
}

/// Settings kept in memory, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    days: RwLock<Option<i64>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_days(days: i64) -> Self {
        Self {
            days: RwLock::new(Some(days)),
        }
    }

    /// Forgets the stored value.
    pub fn clear(&self) {
        *self.days.write().unwrap() = None;
    }
}

impl ConfigStore for MemoryConfigStore {
    fn retention_days(&self) -> Result<Option<i64>> {
        Ok(*self.days.read().unwrap())
    }

    fn set_retention_days(&self, days: i64) -> Result<()> {
        *self.days.write().unwrap() = Some(days);
        Ok(())
    }
}

/// Settings persisted as a JSON object on disk.
///
/// The retention value may be stored as a number or as text, the way a
/// settings form submits it. Other keys in the document are preserved on
/// write.
#[derive(Debug, Clone)]
pub struct JsonConfigStore {
    path: PathBuf,
}

impl JsonConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store for `settings.json` inside `state_dir`.
    pub fn in_dir(state_dir: impl AsRef<Path>) -> Self {
        Self::new(state_dir.as_ref().join(SETTINGS_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Map<String, Value>> {
        Ok(load_json(&self.path)?.unwrap_or_default())
    }
}

impl ConfigStore for JsonConfigStore {
    fn retention_days(&self) -> Result<Option<i64>> {
        let settings = self.load()?;
        let days = settings.get(RETENTION_DAYS_KEY).and_then(parse_days);

        if days.is_none() && settings.contains_key(RETENTION_DAYS_KEY) {
            debug!(
                path = %self.path.display(),
                value = %settings[RETENTION_DAYS_KEY],
                "Ignoring unusable retention setting"
            );
        }

        Ok(days)
    }

    fn set_retention_days(&self, days: i64) -> Result<()> {
        let mut settings = self.load()?;
        settings.insert(RETENTION_DAYS_KEY.to_string(), Value::from(days));
        store_json(&self.path, &settings)
    }
}

/// Interprets a stored retention value.
///
/// Numbers are taken as-is (fractions truncated). Text is read like an
/// integer cast of a form field: optional whitespace and sign, then leading
/// digits, so `" 7 days"` is 7. Anything else is unusable.
fn parse_days(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Value::String(s) => parse_leading_int(s),
        _ => None,
    }
}

fn parse_leading_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let magnitude: i64 = digits[..end].parse().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}
