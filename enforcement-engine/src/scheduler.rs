//! Background enforcement loop
//!
//! One scheduler instance runs per deployment. The running flag is
//! explicit, externally observable state checked each iteration before
//! re-scheduling; stop is graceful (an in-flight run finishes, no new run
//! starts). Scheduled and manual runs are serialized by one run guard, so
//! a "run now" can never overlap a ticked run.

use crate::config::EnforcementConfig;
use crate::engine::EnforcementEngine;
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use compliance_ledger::EnforcementExecution;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

/// Externally observable scheduler state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerStatus {
    /// Whether the loop is running
    pub running: bool,

    /// Start time of the most recent completed run
    pub last_run_at: Option<DateTime<Utc>>,

    /// Runs completed since construction
    pub runs_completed: u64,
}

/// Interval-driven enforcement scheduler
pub struct EnforcementScheduler {
    engine: Arc<EnforcementEngine>,
    interval: std::time::Duration,
    running: AtomicBool,
    run_guard: Mutex<()>,
    last_run_at: RwLock<Option<DateTime<Utc>>>,
    runs_completed: AtomicU64,
}

impl EnforcementScheduler {
    /// New scheduler over an engine
    pub fn new(engine: Arc<EnforcementEngine>, config: &EnforcementConfig) -> Self {
        Self {
            engine,
            interval: std::time::Duration::from_secs(config.interval_seconds),
            running: AtomicBool::new(false),
            run_guard: Mutex::new(()),
            last_run_at: RwLock::new(None),
            runs_completed: AtomicU64::new(0),
        }
    }

    /// Start the background loop
    ///
    /// Errors if the scheduler is already running; only one loop per
    /// deployment.
    pub fn start(self: Arc<Self>) -> Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(Error::AlreadyRunning);
        }

        let scheduler = self;
        tokio::spawn(async move {
            info!(
                interval_secs = scheduler.interval.as_secs(),
                "enforcement scheduler started"
            );

            let mut ticker = tokio::time::interval(scheduler.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // The first tick of a tokio interval fires immediately.
            ticker.tick().await;

            loop {
                if !scheduler.running.load(Ordering::SeqCst) {
                    break;
                }

                if let Err(e) = scheduler.run_now().await {
                    // The heartbeat survives a failed run (e.g. a policy
                    // outage); the next tick retries.
                    warn!(error = %e, "enforcement run failed, retrying at next interval");
                }

                ticker.tick().await;
            }

            info!("enforcement scheduler stopped");
        });

        Ok(())
    }

    /// Request a graceful stop: the in-flight run finishes, no new run
    /// starts
    pub fn stop(&self) {
        if self.running.swap(false, Ordering::SeqCst) {
            info!("enforcement scheduler stop requested");
        }
    }

    /// Manual trigger, serialized against scheduled runs
    pub async fn run_now(&self) -> Result<EnforcementExecution> {
        let _guard = self.run_guard.lock().await;

        let record = self.engine.run_once().await?;
        *self.last_run_at.write().await = Some(record.run_at);
        self.runs_completed.fetch_add(1, Ordering::SeqCst);

        Ok(record)
    }

    /// Current scheduler state
    pub async fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            running: self.running.load(Ordering::SeqCst),
            last_run_at: *self.last_run_at.read().await,
            runs_completed: self.runs_completed.load(Ordering::SeqCst),
        }
    }
}
