//! Timer jobs for scan schedules.
//!
//! [`JobScheduler`] owns one tokio task per job. Every schedule gets up to
//! two jobs: a one-shot at `schedule_time` and, for a recognized frequency,
//! a recurring job anchored on `schedule_time`. Each job holds a child of
//! the scheduler's root [`CancellationToken`], so [`JobScheduler::shutdown`]
//! stops them all.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use veille_core::frequency::{first_recurring_fire, Frequency};
use veille_core::types::{DbId, Timestamp};
use veille_db::models::scan_schedule::ScanSchedule;

/// What a job does when its timer fires.
#[async_trait]
pub trait ScheduleTrigger: Send + Sync {
    async fn fire(&self, schedule_id: DbId);
}

/// The timing inputs of a schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleTiming {
    pub schedule_id: DbId,
    pub schedule_time: Timestamp,
    /// `None` for an unrecognized frequency: no recurring job.
    pub frequency: Option<Frequency>,
}

impl From<&ScanSchedule> for ScheduleTiming {
    fn from(schedule: &ScanSchedule) -> Self {
        Self {
            schedule_id: schedule.id,
            schedule_time: schedule.schedule_time,
            frequency: schedule.frequency(),
        }
    }
}

pub fn once_job_id(schedule_id: DbId) -> String {
    format!("schedule-{schedule_id}-once")
}

pub fn recurring_job_id(schedule_id: DbId) -> String {
    format!("schedule-{schedule_id}-recurring")
}

struct Job {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Job {
    fn stop(self) {
        self.cancel.cancel();
        self.handle.abort();
    }
}

pub struct JobScheduler {
    trigger: Arc<dyn ScheduleTrigger>,
    jobs: Mutex<HashMap<String, Job>>,
    cancel: CancellationToken,
}

impl JobScheduler {
    pub fn new(trigger: Arc<dyn ScheduleTrigger>) -> Self {
        Self {
            trigger,
            jobs: Mutex::new(HashMap::new()),
            cancel: CancellationToken::new(),
        }
    }

    fn jobs(&self) -> MutexGuard<'_, HashMap<String, Job>> {
        // A poisoned map only means a panic elsewhere; the entries are still valid.
        self.jobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Install the jobs for a schedule, replacing any it already has.
    ///
    /// Returns the ids of the jobs now installed.
    pub fn register(&self, timing: &ScheduleTiming) -> Vec<String> {
        let id = timing.schedule_id;
        let now = Utc::now();
        let mut jobs = self.jobs();
        let mut installed = Vec::new();

        for job_id in [once_job_id(id), recurring_job_id(id)] {
            if let Some(job) = jobs.remove(&job_id) {
                job.stop();
            }
        }

        if timing.schedule_time > now {
            let delay = until(timing.schedule_time, now);
            let job_id = once_job_id(id);
            jobs.insert(job_id.clone(), self.spawn_once(id, delay));
            installed.push(job_id);
        } else {
            tracing::debug!(schedule_id = id, "Schedule time already passed, no one-shot job");
        }

        if let Some(frequency) = timing.frequency {
            let interval = frequency.interval();
            let first = first_recurring_fire(timing.schedule_time, interval, now);
            let period = interval.to_std().unwrap_or(Duration::from_secs(1));
            let job_id = recurring_job_id(id);
            jobs.insert(
                job_id.clone(),
                self.spawn_recurring(id, until(first, now), period),
            );
            installed.push(job_id);
        }

        tracing::info!(schedule_id = id, jobs = ?installed, "Schedule registered");
        installed
    }

    /// Cancel both jobs of a schedule. Returns how many were installed;
    /// zero is not an error.
    pub fn unregister(&self, schedule_id: DbId) -> usize {
        let mut jobs = self.jobs();
        let mut removed = 0;
        for job_id in [once_job_id(schedule_id), recurring_job_id(schedule_id)] {
            if let Some(job) = jobs.remove(&job_id) {
                job.stop();
                removed += 1;
            }
        }
        tracing::info!(schedule_id, removed, "Schedule unregistered");
        removed
    }

    /// Ids of jobs that are still pending or running, sorted.
    pub fn job_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .jobs()
            .iter()
            .filter(|(_, job)| !job.handle.is_finished())
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Stop every job. The scheduler accepts no further firings.
    pub fn shutdown(&self) {
        self.cancel.cancel();
        let mut jobs = self.jobs();
        let count = jobs.len();
        for (_, job) in jobs.drain() {
            job.stop();
        }
        tracing::info!(jobs = count, "Scheduler shut down");
    }

    fn spawn_once(&self, schedule_id: DbId, delay: Duration) -> Job {
        let cancel = self.cancel.child_token();
        let token = cancel.clone();
        let trigger = Arc::clone(&self.trigger);

        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    tracing::debug!(schedule_id, "One-shot job firing");
                    trigger.fire(schedule_id).await;
                }
            }
        });

        Job { cancel, handle }
    }

    fn spawn_recurring(&self, schedule_id: DbId, first: Duration, period: Duration) -> Job {
        let cancel = self.cancel.child_token();
        let token = cancel.clone();
        let trigger = Arc::clone(&self.trigger);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + first, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        tracing::debug!(schedule_id, "Recurring job firing");
                        trigger.fire(schedule_id).await;
                    }
                }
            }
        });

        Job { cancel, handle }
    }
}

impl Drop for JobScheduler {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn until(at: Timestamp, now: Timestamp) -> Duration {
    (at - now).to_std().unwrap_or(Duration::ZERO)
}
