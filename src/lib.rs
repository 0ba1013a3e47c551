//! # logsweep - Scheduled Log Retention
//!
//! logsweep keeps a log directory from growing without bound. Once a day it
//! deletes `*.log` files older than a configurable number of days, and on
//! request it flushes every log file in the directory at once.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                              logsweep                               │
//! │                                                                     │
//! │  ┌──────────────┐   reads    ┌──────────────┐                       │
//! │  │  Scheduler   │──────────> │ ConfigStore  │  retention days       │
//! │  │ (daily task) │            └──────────────┘                       │
//! │  └──────┬───────┘                                                   │
//! │         │ persists           ┌──────────────┐                       │
//! │         ├──────────────────> │ScheduleStore │  next fire time       │
//! │         │                    └──────────────┘                       │
//! │         ▼                                                           │
//! │  ┌──────────────────┐                   ┌──────────────────┐        │
//! │  │ DirectorySweeper │                   │  ImmediateFlush  │ <── manual
//! │  │   + AgeFilter    │                   │                  │   trigger
//! │  └────────┬─────────┘                   └────────┬─────────┘        │
//! │           └──────────────┬───────────────────────┘                  │
//! │                          ▼                                          │
//! │                 <uploads>/wc-logs/                                  │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use logsweep::config::JsonConfigStore;
//! use logsweep::scheduler::{JsonScheduleStore, RunnerConfig, Scheduler, SchedulerHandle};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let state_dir = "/var/lib/logsweep";
//!     let scheduler = Scheduler::new(
//!         Arc::new(JsonConfigStore::in_dir(state_dir)),
//!         Arc::new(JsonScheduleStore::in_dir(state_dir)),
//!         "/var/www/uploads/wc-logs",
//!     );
//!
//!     let handle = SchedulerHandle::start(Arc::new(scheduler), RunnerConfig::default());
//!
//!     tokio::signal::ctrl_c().await.unwrap();
//!     handle.shutdown().await;
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`retention`]: age filter, recursive sweep, and the one-level flush
//! - [`config`]: the retention-days setting and its stores
//! - [`scheduler`]: the persisted daily trigger and its background task
//! - [`error`]: errors from the persisted state files
//!
//! ## Failure Handling
//!
//! Sweeps and flushes never fail outright. Every file is handled on its own:
//! one that cannot be removed is logged and counted, and one that is already
//! gone is skipped. Only the state files (settings and schedule) produce
//! [`Error`]s.

pub mod config;
pub mod error;
mod persist;
pub mod retention;
pub mod scheduler;

// Re-export commonly used types for convenience
pub use config::{ConfigStore, JsonConfigStore, MemoryConfigStore, DEFAULT_RETENTION_DAYS};
pub use error::{Error, Result};
pub use retention::{flush_all, sweep, DirectorySweeper, SweepReport, PROTECTED_LOG_NAME};
pub use scheduler::{RunnerConfig, Scheduler, SchedulerHandle};

/// Directory under the uploads location that holds the logs
pub const LOG_SUBDIR: &str = "wc-logs";

/// Version of logsweep
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
