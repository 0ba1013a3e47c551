//! Daily Sweep Scheduling
//!
//! A single recurring trigger, persisted so it survives restarts, that runs
//! the retention sweep once every 24 hours.
//!
//! ## State Machine
//!
//! ```text
//!  ┌──────────────┐  ensure_registered()   ┌──────────────┐
//!  │ Unregistered │ ─────────────────────> │    Active    │ ──┐
//!  └──────────────┘                        └──────────────┘   │ run_pending(now)
//!                                                 ▲           │ when due: advance,
//!                   ensure_registered() again ────┤           │ save, sweep
//!                   (no-op)                       └───────────┘
//! ```
//!
//! The trigger is never re-created after it fires: the scheduler moves the
//! stored next fire time forward by whole periods. There is no terminal state;
//! switching the whole thing off is up to whoever runs the process.
//!
//! ## Pieces
//!
//! - [`ScheduleEntry`] / [`ScheduleStore`]: the persisted record
//! - [`Scheduler`]: registration, due-check, and the sweep itself
//! - [`SchedulerHandle`]: the background Tokio task that drives it

pub mod entry;
pub mod runner;
pub mod service;

pub use entry::{
    unix_secs, JsonScheduleStore, MemoryScheduleStore, ScheduleEntry, ScheduleStore,
    DAILY_PERIOD, SCHEDULE_FILE, SWEEP_HANDLER_ID,
};
pub use runner::{RunnerConfig, SchedulerHandle};
pub use service::{Registration, ScheduleState, Scheduler};
