//! Repository for `scan_schedules` and its site links.

use sqlx::PgPool;
use veille_core::types::DbId;

use crate::models::scan_schedule::{CreateScanSchedule, ScanSchedule};

const COLUMNS: &str = "id, name, schedule_time, frequency, keywords, last_run_id, \
                       next_scan_time, created_at, updated_at";

pub struct ScheduleRepo;

impl ScheduleRepo {
    /// Insert a schedule and its site set in one transaction.
    ///
    /// The first `next_scan_time` is the schedule time itself.
    pub async fn create(
        pool: &PgPool,
        input: &CreateScanSchedule,
    ) -> Result<ScanSchedule, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO scan_schedules (name, schedule_time, frequency, keywords, next_scan_time)
             VALUES ($1, $2, $3, $4, $2)
             RETURNING {COLUMNS}"
        );
        let schedule = sqlx::query_as::<_, ScanSchedule>(&query)
            .bind(&input.name)
            .bind(input.schedule_time)
            .bind(input.frequency.trim().to_lowercase())
            .bind(&input.keywords)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO scan_schedule_sites (schedule_id, site_id)
             SELECT $1, UNNEST($2::BIGINT[])
             ON CONFLICT DO NOTHING",
        )
        .bind(schedule.id)
        .bind(&input.site_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(schedule)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ScanSchedule>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM scan_schedules WHERE id = $1");
        sqlx::query_as::<_, ScanSchedule>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all schedules, oldest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<ScanSchedule>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM scan_schedules ORDER BY id");
        sqlx::query_as::<_, ScanSchedule>(&query)
            .fetch_all(pool)
            .await
    }

    pub async fn site_ids(pool: &PgPool, schedule_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT site_id FROM scan_schedule_sites WHERE schedule_id = $1 ORDER BY site_id",
        )
        .bind(schedule_id)
        .fetch_all(pool)
        .await
    }

    /// Delete a schedule. Spawned scans survive with `schedule_id` nulled.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM scan_schedules WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
