//! Daily cache refresh
//!
//! Once a day, at a fixed local time, the refresh job empties every cache and
//! pre-warms the two queries most requests ask for: today's saint, and the
//! explicit date query for today's day and month.

use crate::service::{SaintQuery, SaintService};
use chrono::{Local, NaiveDateTime, NaiveTime};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Outcome of one refresh job
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Queries resolved and stored
    pub warmed: usize,
    /// Queries whose resolution failed
    pub failed: usize,
}

/// When the refresh job fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshSchedule {
    /// Once a day at a local time of day
    DailyAt(NaiveTime),
    /// A fixed delay after startup and after each job
    Every(Duration),
}

impl RefreshSchedule {
    /// Delay from now until the next firing
    pub fn next_delay(&self) -> Duration {
        match self {
            Self::DailyAt(at) => duration_until_next(Local::now().naive_local(), *at),
            Self::Every(interval) => *interval,
        }
    }
}

/// Timer that runs the refresh job, once a day unless told otherwise
pub struct RefreshScheduler {
    service: Arc<SaintService>,
    schedule: RefreshSchedule,
}

/// Handle to a running scheduler
pub struct RefreshHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl RefreshHandle {
    /// Stops the scheduler and waits for its task to finish
    ///
    /// A job already in progress runs to completion first.
    pub async fn stop(self) {
        // The task may already be gone; there is nothing to signal then.
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            tracing::error!("Refresh scheduler task failed: {}", e);
        }
    }
}

impl RefreshScheduler {
    pub fn new(service: Arc<SaintService>, daily_at: NaiveTime) -> Self {
        Self::with_schedule(service, RefreshSchedule::DailyAt(daily_at))
    }

    pub fn with_schedule(service: Arc<SaintService>, schedule: RefreshSchedule) -> Self {
        Self { service, schedule }
    }

    /// Spawns the timer loop on the current runtime
    ///
    /// Dropping the returned handle also stops the loop.
    pub fn start(self) -> RefreshHandle {
        let (shutdown, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(self.run(shutdown_rx));
        RefreshHandle { shutdown, task }
    }

    /// Sleeps until the next firing, runs the job, and repeats until shutdown
    ///
    /// The job runs inside the loop, so a firing never overlaps the next one.
    /// The delay is recomputed from the wall clock each time around.
    async fn run(self, mut shutdown: oneshot::Receiver<()>) {
        tracing::info!("Refresh scheduler started ({:?})", self.schedule);

        loop {
            let delay = self.schedule.next_delay();
            tracing::debug!("Next cache refresh in {:?}", delay);

            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("Refresh scheduler stopped");
                    break;
                }
                _ = tokio::time::sleep(delay) => {
                    self.run_job().await;
                }
            }
        }
    }

    /// Clears all caches and pre-warms today's queries
    ///
    /// Each query is warmed independently; a failure is logged and does not
    /// stop the other.
    pub async fn run_job(&self) -> RefreshReport {
        tracing::info!("Starting daily cache refresh");

        self.service.clear_caches();

        let today = Local::now().date_naive();
        let mut report = RefreshReport::default();

        for query in [SaintQuery::Today, SaintQuery::for_date(today)] {
            match self.service.warm(query, today).await {
                Ok(count) => {
                    tracing::info!("Pre-warmed {:?} with {} saints", query, count);
                    report.warmed += 1;
                }
                Err(e) => {
                    tracing::error!("Failed to pre-warm {:?}: {}", query, e);
                    report.failed += 1;
                }
            }
        }

        tracing::info!(
            "Daily cache refresh finished: {} warmed, {} failed",
            report.warmed,
            report.failed
        );
        report
    }
}

/// Time from `now` until the next occurrence of `at`
///
/// If `now` is exactly `at`, the next occurrence is a day later.
///
/// The arithmetic is on naive local time, so across a DST change the timer
/// can fire up to an hour off; an early firing warms the previous date and
/// the following firing corrects it.
pub fn duration_until_next(now: NaiveDateTime, at: NaiveTime) -> Duration {
    let mut next = now.date().and_time(at);
    if next <= now {
        next += chrono::Duration::days(1);
    }
    (next - now).to_std().unwrap_or(Duration::ZERO)
}
