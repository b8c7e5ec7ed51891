//! Turning a schedule firing into a pending scan.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use veille_core::frequency::next_scan_time;
use veille_core::naming::scheduled_scan_name;
use veille_core::types::DbId;
use veille_db::models::scan::Scan;
use veille_db::repositories::{ScanRepo, ScheduleRepo};
use veille_events::{EventBus, PlatformEvent};

use crate::error::PipelineError;
use crate::scheduler::{JobScheduler, ScheduleTiming, ScheduleTrigger};

/// Production [`ScheduleTrigger`]: records a scan for the schedule and
/// hands it to the ingestor over the bus.
pub struct ScheduleRunner {
    pool: PgPool,
    bus: Arc<EventBus>,
}

impl ScheduleRunner {
    pub fn new(pool: PgPool, bus: Arc<EventBus>) -> Self {
        Self { pool, bus }
    }

    /// Create the scan for one firing of a schedule.
    ///
    /// The scan, the schedule's last run and its next run time are written
    /// in one transaction. Returns `None` when the schedule was deleted.
    pub async fn create_scan(&self, schedule_id: DbId) -> Result<Option<Scan>, PipelineError> {
        let Some(schedule) = ScheduleRepo::find_by_id(&self.pool, schedule_id).await? else {
            return Ok(None);
        };

        let fired_at = Utc::now();
        let name = scheduled_scan_name(schedule.name.as_deref(), fired_at);
        let next = next_scan_time(&schedule.frequency, fired_at);
        if next.is_none() {
            tracing::warn!(
                schedule_id,
                frequency = %schedule.frequency,
                "Unrecognized frequency, schedule will not run again",
            );
        }

        let Some((_, scan)) =
            ScanRepo::create_for_schedule(&self.pool, schedule_id, &name, fired_at, next).await?
        else {
            return Ok(None);
        };

        tracing::info!(schedule_id, scan_id = scan.id, next_scan_time = ?next, "Scheduled scan created");
        self.bus.publish(PlatformEvent::scan_created(scan.id));
        Ok(Some(scan))
    }
}

#[async_trait]
impl ScheduleTrigger for ScheduleRunner {
    async fn fire(&self, schedule_id: DbId) {
        match self.create_scan(schedule_id).await {
            Ok(Some(_)) => {}
            Ok(None) => tracing::info!(schedule_id, "Schedule deleted before firing, nothing to do"),
            Err(e) => tracing::error!(schedule_id, error = %e, "Scheduled scan creation failed"),
        }
    }
}

/// Register jobs for every stored schedule. Called once at startup.
pub async fn restore_schedules(
    scheduler: &JobScheduler,
    pool: &PgPool,
) -> Result<usize, sqlx::Error> {
    let schedules = ScheduleRepo::list(pool).await?;
    for schedule in &schedules {
        scheduler.register(&ScheduleTiming::from(schedule));
    }
    tracing::info!(count = schedules.len(), "Schedules restored");
    Ok(schedules.len())
}
