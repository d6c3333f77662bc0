use std::{collections::HashMap, fmt, sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono_tz::Tz;
use pillminder_models::reminder::{ReminderFireTime, ReminderId};
use tokio::{
    sync::{RwLock, watch},
    task::{self, JoinHandle},
};
use tokio_util::sync::CancellationToken;

use crate::clock::{Clock, next_fire_instant};

const CLEANUP_INTERVAL: Duration = Duration::from_secs(300);
const CANCEL_TIMEOUT: Duration = Duration::from_secs(5);

/// Identifies one daily job: a single fire time of a single reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JobKey {
    pub reminder_id: ReminderId,
    pub fire_at: ReminderFireTime,
}

impl JobKey {
    pub fn new(reminder_id: ReminderId, fire_at: ReminderFireTime) -> Self {
        Self {
            reminder_id,
            fire_at,
        }
    }
}

impl fmt::Display for JobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.reminder_id, self.fire_at)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireOutcome {
    Rearm,
    Stop,
}

#[async_trait]
pub trait FireHandler: Send + Sync + 'static {
    async fn handle_fire(&self, job: &JobKey) -> FireOutcome;
}

#[async_trait]
pub trait ReminderScheduler: Send + Sync + 'static {
    /// Starts a job that fires every day at `job.fire_at` local time.
    /// An existing job with the same key is replaced.
    ///
    /// Fails once the scheduler has been shut down.
    async fn register_daily(
        &self,
        job: JobKey,
        timezone: Tz,
        handler: Arc<dyn FireHandler>,
    ) -> anyhow::Result<()>;

    /// Returns `false` when no live job was registered under the key.
    async fn cancel(&self, job: &JobKey) -> bool;

    async fn scheduled_jobs(&self) -> Vec<JobKey>;
}

struct ScheduledJob {
    task: JoinHandle<()>,
    cancellation_token: CancellationToken,
}

impl ScheduledJob {
    async fn cancel(self, timeout: Duration) {
        self.cancellation_token.cancel();
        if tokio::time::timeout(timeout, self.task).await.is_err() {
            log::warn!("Job did not stop within {timeout:?} after cancellation");
        }
    }
}

struct CleanupTask(watch::Sender<()>);

type JobStore = RwLock<HashMap<JobKey, ScheduledJob>>;

pub struct DailyReminderScheduler {
    jobs: Arc<JobStore>,
    clock: Arc<dyn Clock>,
    shutdown_token: CancellationToken,
    cleanup_task: CleanupTask,
}

impl DailyReminderScheduler {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let jobs = Arc::new(RwLock::new(HashMap::new()));
        let cleanup_task = Self::spawn_cleanup_task(Arc::clone(&jobs));

        Self {
            jobs,
            clock,
            shutdown_token: CancellationToken::new(),
            cleanup_task,
        }
    }
}

impl Drop for DailyReminderScheduler {
    fn drop(&mut self) {
        self.shutdown_token.cancel();
        let _ = self.cleanup_task.0.send(());
    }
}

impl DailyReminderScheduler {
    /// Stops every job and refuses further registrations.
    pub async fn shutdown(&self) {
        self.shutdown_token.cancel();
        let _ = self.cleanup_task.0.send(());

        let jobs = std::mem::take(&mut *self.jobs.write().await);
        let stopped = jobs.len();
        for job in jobs.into_values() {
            job.cancel(CANCEL_TIMEOUT).await;
        }

        log::info!("Scheduler shut down, stopped {stopped} jobs");
    }

    fn spawn_job(&self, job: JobKey, timezone: Tz, handler: Arc<dyn FireHandler>) -> ScheduledJob {
        let cancellation_token = self.shutdown_token.child_token();
        let task_cancellation_token = cancellation_token.clone();
        let clock = Arc::clone(&self.clock);

        let task = task::spawn(async move {
            run_job(job, timezone, handler, clock, task_cancellation_token).await;
        });

        ScheduledJob {
            task,
            cancellation_token,
        }
    }

    fn spawn_cleanup_task(jobs: Arc<JobStore>) -> CleanupTask {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(());
        task::spawn(async move {
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(CLEANUP_INTERVAL) => {
                        Self::clean_finished_jobs(&jobs).await;
                    }
                    _ = shutdown_rx.changed() => {
                        log::info!("Cleanup task shutting down");
                        break;
                    }
                };
            }
        });

        CleanupTask(shutdown_tx)
    }

    async fn clean_finished_jobs(jobs: &JobStore) {
        let mut jobs = jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, job| !job.task.is_finished());
        let after = jobs.len();

        if before != after {
            log::info!("Cleaned up {} stopped jobs", before - after);
        }
    }
}

#[async_trait]
impl ReminderScheduler for DailyReminderScheduler {
    async fn register_daily(
        &self,
        job: JobKey,
        timezone: Tz,
        handler: Arc<dyn FireHandler>,
    ) -> anyhow::Result<()> {
        let mut jobs = self.jobs.write().await;
        if self.shutdown_token.is_cancelled() {
            anyhow::bail!("Scheduler is shut down, cannot register job {job}");
        }

        let scheduled_job = self.spawn_job(job, timezone, handler);
        let replaced = jobs.insert(job, scheduled_job);
        drop(jobs);

        log::info!("Registered daily job {job} in {timezone}");
        if let Some(previous) = replaced {
            log::info!("Replacing previously registered job {job}");
            previous.cancel(CANCEL_TIMEOUT).await;
        }

        Ok(())
    }

    async fn cancel(&self, job: &JobKey) -> bool {
        let removed = self.jobs.write().await.remove(job);

        match removed {
            Some(scheduled_job) => {
                let was_live = !scheduled_job.task.is_finished();
                scheduled_job.cancel(CANCEL_TIMEOUT).await;
                log::info!("Cancelled job {job}");
                was_live
            }
            None => false,
        }
    }

    async fn scheduled_jobs(&self) -> Vec<JobKey> {
        let mut jobs: Vec<JobKey> = self
            .jobs
            .read()
            .await
            .iter()
            .filter(|(_, job)| !job.task.is_finished())
            .map(|(key, _)| *key)
            .collect();
        jobs.sort();
        jobs
    }
}

async fn run_job(
    job: JobKey,
    timezone: Tz,
    handler: Arc<dyn FireHandler>,
    clock: Arc<dyn Clock>,
    cancellation_token: CancellationToken,
) {
    let mut after = clock.now();

    loop {
        let fire_at = next_fire_instant(job.fire_at, timezone, after);
        let delay = (fire_at - clock.now()).to_std().unwrap_or(Duration::ZERO);

        log::debug!("[SCHEDULE] Sleeping for {delay:?} until {fire_at}. Job {job}");

        tokio::select! {
            biased;
            _ = cancellation_token.cancelled() => {
                log::debug!("[CANCEL] Job {job} stopped while waiting");
                return;
            }
            _ = tokio::time::sleep(delay) => {}
        }

        log::info!("[FIRE] Job {job} fired for {fire_at}");

        if handler.handle_fire(&job).await == FireOutcome::Stop {
            log::info!("[STOP] Job {job} stopped by its handler");
            return;
        }

        after = clock.now().max(fire_at);
    }
}
