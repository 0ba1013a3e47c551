//! logsweep - Scheduled Log Retention
//!
//! This is the command-line entry point. It wires the JSON state stores and
//! the log directory into the library and exposes the daemon, the one-shot
//! triggers, and the settings commands.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use logsweep::config::{validate_retention_days, ConfigStore, JsonConfigStore};
use logsweep::retention::{flush_all, threshold_for_days, DirectorySweeper, SweepReport};
use logsweep::scheduler::{
    JsonScheduleStore, Registration, RunnerConfig, ScheduleState, Scheduler, SchedulerHandle,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Deletes aged log files on a daily schedule
#[derive(Parser, Debug)]
#[command(name = "logsweep", version, about, long_about = None)]
struct Cli {
    /// Uploads directory; logs live in its `wc-logs` subdirectory
    #[arg(long, env = "LOGSWEEP_UPLOADS_DIR", default_value = "uploads")]
    uploads_dir: PathBuf,

    /// Log directory to clean, overriding `<uploads-dir>/wc-logs`
    #[arg(long, env = "LOGSWEEP_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Where settings and the schedule are persisted
    #[arg(long, env = "LOGSWEEP_STATE_DIR", default_value = ".logsweep")]
    state_dir: PathBuf,

    /// Log level filter (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the daily sweep scheduler until interrupted
    Run,

    /// Register the schedule if needed and run the sweep if it is due
    ///
    /// Intended for hosts that already have a cron facility and only need
    /// logsweep to do the bookkeeping.
    RunPending,

    /// Sweep now, deleting logs older than the retention period
    Sweep {
        /// Use this many days instead of the stored setting
        #[arg(long)]
        days: Option<i64>,
    },

    /// Delete every log file in the log directory now, regardless of age
    Flush,

    /// Read or change the retention setting
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Show the schedule and the effective retention
    Status,
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the stored and effective retention days
    Get,
    /// Store a new retention period in days
    Set { days: i64 },
}

impl Cli {
    fn log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| self.uploads_dir.join(logsweep::LOG_SUBDIR))
    }

    fn config_store(&self) -> Arc<JsonConfigStore> {
        Arc::new(JsonConfigStore::in_dir(&self.state_dir))
    }

    fn scheduler(&self) -> Scheduler {
        Scheduler::new(
            self.config_store(),
            Arc::new(JsonScheduleStore::in_dir(&self.state_dir)),
            self.log_dir(),
        )
    }
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

fn print_report(action: &str, report: &SweepReport) {
    println!(
        "{}: {} deleted, {} kept, {} failed ({} directories)",
        action, report.deleted, report.kept, report.failed, report.directories
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    match &cli.command {
        Commands::Run => run(&cli).await,
        Commands::RunPending => run_pending(&cli).await,
        Commands::Sweep { days } => {
            let days = match days {
                Some(days) => validate_retention_days(*days)?,
                None => cli.scheduler().retention_days(),
            };
            let log_dir = cli.log_dir();
            let report = tokio::task::spawn_blocking(move || {
                DirectorySweeper::new().sweep(&log_dir, threshold_for_days(days))
            })
            .await?;
            print_report("Sweep", &report);
            Ok(())
        }
        Commands::Flush => {
            let log_dir = cli.log_dir();
            let report = tokio::task::spawn_blocking(move || flush_all(&log_dir)).await?;
            print_report("Flush", &report);
            Ok(())
        }
        Commands::Config { action } => config(&cli, action),
        Commands::Status => status(&cli),
    }
}

/// Runs the scheduler until Ctrl+C.
async fn run(cli: &Cli) -> Result<()> {
    let scheduler = Arc::new(cli.scheduler());

    info!(
        log_dir = %scheduler.log_dir().display(),
        state_dir = %cli.state_dir.display(),
        retention_days = scheduler.retention_days(),
        "logsweep v{} starting",
        logsweep::VERSION
    );

    let handle = SchedulerHandle::start(scheduler, RunnerConfig::default());

    signal::ctrl_c()
        .await
        .context("Failed to install Ctrl+C handler")?;
    info!("Shutdown signal received, stopping scheduler...");

    handle.shutdown().await;

    info!("Shutdown complete");
    Ok(())
}

async fn run_pending(cli: &Cli) -> Result<()> {
    let scheduler = cli.scheduler();

    let outcome = tokio::task::spawn_blocking(move || -> logsweep::Result<_> {
        let now = SystemTime::now();
        let registration = scheduler.ensure_registered(now)?;
        let report = scheduler.run_pending(now)?;
        Ok((registration, report))
    })
    .await?
    .context("Failed to run scheduled sweep")?;

    if let (Registration::Registered(entry), _) = &outcome {
        println!("Registered daily sweep (handler {})", entry.handler_id);
    }

    match &outcome.1 {
        Some(report) => print_report("Sweep", report),
        None => println!("Sweep not due yet"),
    }
    Ok(())
}

fn config(cli: &Cli, action: &ConfigAction) -> Result<()> {
    let store = cli.config_store();

    match action {
        ConfigAction::Get => {
            let stored = store
                .retention_days()
                .with_context(|| format!("Failed to read {}", store.path().display()))?;
            match stored {
                Some(days) => println!("stored: {}", days),
                None => println!("stored: (unset)"),
            }
            println!(
                "effective: {} day(s)",
                logsweep::config::effective_retention_days(stored)
            );
        }
        ConfigAction::Set { days } => {
            let days = validate_retention_days(*days)?;
            store
                .set_retention_days(days as i64)
                .with_context(|| format!("Failed to write {}", store.path().display()))?;
            println!("Retention set to {} day(s)", days);
        }
    }

    Ok(())
}

fn status(cli: &Cli) -> Result<()> {
    let scheduler = cli.scheduler();
    let now = SystemTime::now();

    println!("logsweep v{}", logsweep::VERSION);
    println!("log directory:  {}", scheduler.log_dir().display());
    println!("state directory: {}", cli.state_dir.display());
    println!("retention:      {} day(s)", scheduler.retention_days());

    match scheduler.state().context("Failed to read schedule")? {
        ScheduleState::Unregistered => println!("schedule:       not registered"),
        ScheduleState::Active(entry) => {
            let until = entry.until_next(now);
            println!(
                "schedule:       every {}s, next run at {} (in {}s)",
                entry.period().as_secs(),
                entry.next_fire_time,
                until.as_secs()
            );
        }
    }

    Ok(())
}
