//! Background Sweep Task
//!
//! Runs the [`Scheduler`] on a Tokio task for as long as the process lives.
//!
//! ## Design
//!
//! The task:
//! 1. Registers the daily trigger if it is missing (checked on every pass, so
//!    a removed schedule record comes back)
//! 2. Runs the sweep if the trigger is due
//! 3. Sleeps until the next fire time (capped, so edits to the schedule or a
//!    clock change are picked up within [`RunnerConfig::max_sleep`])
//! 4. Repeats until the handle is stopped or dropped
//!
//! Filesystem work happens on the blocking thread pool so a large log tree
//! never stalls the runtime. A failing state store is retried after
//! [`RunnerConfig::retry_interval`] instead of ending the task.

use crate::scheduler::service::Scheduler;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Timing knobs for the background task.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Longest single sleep between schedule checks (default: 1h)
    pub max_sleep: Duration,

    /// Delay before retrying after the schedule could not be read or saved
    /// (default: 60s)
    pub retry_interval: Duration,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_sleep: Duration::from_secs(3_600),
            retry_interval: Duration::from_secs(60),
        }
    }
}

/// A handle to the running scheduler task.
///
/// When this handle is dropped, the task will be stopped.
#[derive(Debug)]
pub struct SchedulerHandle {
    /// Sender to signal shutdown
    shutdown_tx: watch::Sender<bool>,
    task: Option<JoinHandle<()>>,
}

impl SchedulerHandle {
    /// Starts the scheduler as a background task.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use logsweep::config::JsonConfigStore;
    /// use logsweep::scheduler::{JsonScheduleStore, RunnerConfig, Scheduler, SchedulerHandle};
    /// use std::sync::Arc;
    ///
    /// let scheduler = Scheduler::new(
    ///     Arc::new(JsonConfigStore::in_dir("/var/lib/logsweep")),
    ///     Arc::new(JsonScheduleStore::in_dir("/var/lib/logsweep")),
    ///     "/var/www/uploads/wc-logs",
    /// );
    /// let handle = SchedulerHandle::start(Arc::new(scheduler), RunnerConfig::default());
    ///
    /// // Sweeps run in the background...
    ///
    /// handle.shutdown().await;
    /// ```
    pub fn start(scheduler: Arc<Scheduler>, config: RunnerConfig) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(scheduler_loop(scheduler, config, shutdown_rx));

        info!("Background log sweep scheduler started");

        Self {
            shutdown_tx,
            task: Some(task),
        }
    }

    /// Signals the task to stop.
    ///
    /// A sweep already in progress runs to completion.
    pub fn stop(&self) {
        if self.shutdown_tx.send(true).is_ok() {
            info!("Background log sweep scheduler stopped");
        }
    }

    /// Stops the task and waits for it to finish.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!(error = %e, "Scheduler task ended abnormally");
            }
        }
    }

    /// Returns true once the task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |task| task.is_finished())
    }
}

impl Drop for SchedulerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The main scheduler loop.
async fn scheduler_loop(
    scheduler: Arc<Scheduler>,
    config: RunnerConfig,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    loop {
        let delay = tick(&scheduler, &config).await;

        debug!(sleep_secs = delay.as_secs(), "Scheduler sleeping");

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            result = shutdown_rx.changed() => {
                if result.is_err() || *shutdown_rx.borrow() {
                    debug!("Scheduler received shutdown signal");
                    return;
                }
            }
        }
    }
}

/// One pass: register if needed, run due work, and pick the next sleep.
async fn tick(scheduler: &Arc<Scheduler>, config: &RunnerConfig) -> Duration {
    let scheduler = Arc::clone(scheduler);

    let pass = tokio::task::spawn_blocking(move || {
        let now = SystemTime::now();
        scheduler.ensure_registered(now)?;
        scheduler.run_pending(now)?;
        scheduler.until_next(SystemTime::now())
    })
    .await;

    match pass {
        Ok(Ok(until_next)) => until_next.unwrap_or(config.max_sleep).min(config.max_sleep),
        Ok(Err(e)) => {
            error!(error = %e, "Scheduled sweep failed");
            config.retry_interval
        }
        Err(e) => {
            error!(error = %e, "Scheduled sweep panicked");
            config.retry_interval
        }
    }
}
