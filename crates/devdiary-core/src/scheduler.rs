//! Periodic diary scheduler
//!
//! Runs a full collect, generate and publish cycle at a fixed interval in a
//! background Tokio task.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Notify;
use tracing::{error, info, warn};

use crate::config::ScheduleConfig;
use crate::coordinator::{DiaryCoordinator, DiaryRun, RunError};

const MAX_CONSECUTIVE_FAILURES: u64 = 3;

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Scheduler is already running")]
    AlreadyRunning,

    #[error("Scheduler is not running")]
    NotRunning,

    #[error(transparent)]
    Run(#[from] RunError),
}

pub struct DiaryScheduler {
    coordinator: Arc<DiaryCoordinator>,
    interval: Duration,
    running: Arc<AtomicBool>,
    stop_signal: Arc<Notify>,
    consecutive_failures: Arc<AtomicU64>,
    completed_runs: Arc<AtomicU64>,
}

impl DiaryScheduler {
    pub fn new(coordinator: Arc<DiaryCoordinator>, interval: Duration) -> Self {
        Self {
            coordinator,
            interval,
            running: Arc::new(AtomicBool::new(false)),
            stop_signal: Arc::new(Notify::new()),
            consecutive_failures: Arc::new(AtomicU64::new(0)),
            completed_runs: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn from_config(coordinator: Arc<DiaryCoordinator>, config: &ScheduleConfig) -> Self {
        Self::new(coordinator, Duration::from_secs(config.interval_seconds))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn consecutive_failures(&self) -> u64 {
        self.consecutive_failures.load(Ordering::SeqCst)
    }

    /// Cycles that finished without error since construction
    pub fn completed_runs(&self) -> u64 {
        self.completed_runs.load(Ordering::SeqCst)
    }

    /// Spawns the loop. The first cycle runs one interval after start.
    pub fn start(&self) -> Result<(), SchedulerError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(SchedulerError::AlreadyRunning);
        }

        let coordinator = Arc::clone(&self.coordinator);
        let interval = self.interval;
        let running = Arc::clone(&self.running);
        let stop_signal = Arc::clone(&self.stop_signal);
        let consecutive_failures = Arc::clone(&self.consecutive_failures);
        let completed_runs = Arc::clone(&self.completed_runs);

        tokio::spawn(async move {
            info!(interval_secs = interval.as_secs(), "Diary scheduler started");

            loop {
                tokio::select! {
                    _ = stop_signal.notified() => break,
                    _ = tokio::time::sleep(interval) => {
                        match coordinator.create_and_publish_diary().await {
                            Ok(run) => {
                                consecutive_failures.store(0, Ordering::SeqCst);
                                completed_runs.fetch_add(1, Ordering::SeqCst);
                                info!(
                                    title = run.diary.title(),
                                    outcome = %run.publish_result.summary(),
                                    "Scheduled diary published"
                                );
                            }
                            Err(e) => {
                                let failures = consecutive_failures.fetch_add(1, Ordering::SeqCst) + 1;
                                error!(error = %e, "Scheduled diary cycle failed");
                                if failures >= MAX_CONSECUTIVE_FAILURES {
                                    warn!(failures, "Diary cycle keeps failing");
                                }
                            }
                        }
                    }
                }
            }

            running.store(false, Ordering::SeqCst);
            info!("Diary scheduler stopped");
        });

        Ok(())
    }

    /// Signals the loop and waits until it exits. An in-flight cycle finishes
    /// first.
    pub async fn stop(&self) -> Result<(), SchedulerError> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        self.stop_signal.notify_one();
        while self.is_running() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        Ok(())
    }

    /// Runs one cycle immediately, independent of the loop timing.
    pub async fn run_now(&self) -> Result<DiaryRun, SchedulerError> {
        Ok(self.coordinator.create_and_publish_diary().await?)
    }
}
