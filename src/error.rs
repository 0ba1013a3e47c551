//! Error types for logsweep.
//!
//! Sweeps and flushes never fail as a whole: per-file problems are logged and
//! counted in a [`SweepReport`](crate::retention::SweepReport). The errors here
//! come from reading and writing the persisted settings and schedule state.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the persisted state stores.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading or writing a state file failed
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A state file exists but does not contain valid JSON
    #[error("malformed state file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Retention days must be a positive number of days
    #[error("invalid retention days: {0} (must be at least 1)")]
    InvalidRetentionDays(i64),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Error::Json {
            path: path.into(),
            source,
        }
    }
}

/// Result type for state store operations.
pub type Result<T> = std::result::Result<T, Error>;
