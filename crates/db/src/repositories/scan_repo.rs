//! Repository for `scans` and their site links.

use sqlx::PgPool;
use veille_core::types::{DbId, Timestamp};

use crate::models::scan::{CreateScan, Scan};
use crate::models::scan_schedule::ScanSchedule;

const COLUMNS: &str = "id, name, schedule_id, scan_start_date, scan_end_date, status, \
                       keywords, failure_reason";

const SCHEDULE_COLUMNS: &str = "id, name, schedule_time, frequency, keywords, last_run_id, \
                                next_scan_time, created_at, updated_at";

pub struct ScanRepo;

impl ScanRepo {
    /// Insert a pending scan and its site set in one transaction.
    pub async fn create(pool: &PgPool, input: &CreateScan) -> Result<Scan, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO scans (name, schedule_id, keywords, status)
             VALUES ($1, $2, $3, 'pending')
             RETURNING {COLUMNS}"
        );
        let scan = sqlx::query_as::<_, Scan>(&query)
            .bind(&input.name)
            .bind(input.schedule_id)
            .bind(&input.keywords)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO scan_sites (scan_id, site_id)
             SELECT $1, UNNEST($2::BIGINT[])
             ON CONFLICT DO NOTHING",
        )
        .bind(scan.id)
        .bind(&input.site_ids)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(scan)
    }

    /// Record one firing of a schedule.
    ///
    /// In a single transaction: stores `next_scan_time` on the schedule,
    /// inserts a pending scan copying the schedule's keywords and site set,
    /// and points the schedule's `last_run_id` at it. Returns `None` when
    /// the schedule no longer exists.
    pub async fn create_for_schedule(
        pool: &PgPool,
        schedule_id: DbId,
        name: &str,
        fired_at: Timestamp,
        next_scan_time: Option<Timestamp>,
    ) -> Result<Option<(ScanSchedule, Scan)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let keywords: Option<Option<String>> = sqlx::query_scalar(
            "UPDATE scan_schedules SET next_scan_time = $2, updated_at = NOW()
             WHERE id = $1
             RETURNING keywords",
        )
        .bind(schedule_id)
        .bind(next_scan_time)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(keywords) = keywords else {
            return Ok(None);
        };

        let query = format!(
            "INSERT INTO scans (name, schedule_id, scan_start_date, keywords, status)
             VALUES ($1, $2, $3, $4, 'pending')
             RETURNING {COLUMNS}"
        );
        let scan = sqlx::query_as::<_, Scan>(&query)
            .bind(name)
            .bind(schedule_id)
            .bind(fired_at)
            .bind(&keywords)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO scan_sites (scan_id, site_id)
             SELECT $1, site_id FROM scan_schedule_sites WHERE schedule_id = $2",
        )
        .bind(scan.id)
        .bind(schedule_id)
        .execute(&mut *tx)
        .await?;

        let query = format!(
            "UPDATE scan_schedules SET last_run_id = $2 WHERE id = $1 RETURNING {SCHEDULE_COLUMNS}"
        );
        let schedule = sqlx::query_as::<_, ScanSchedule>(&query)
            .bind(schedule_id)
            .bind(scan.id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some((schedule, scan)))
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Scan>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM scans WHERE id = $1");
        sqlx::query_as::<_, Scan>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all scans, most recent first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Scan>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM scans ORDER BY scan_start_date DESC, id DESC");
        sqlx::query_as::<_, Scan>(&query).fetch_all(pool).await
    }

    /// Scans started within `[from, to)`, oldest first.
    pub async fn list_started_between(
        pool: &PgPool,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<Scan>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM scans
             WHERE scan_start_date >= $1 AND scan_start_date < $2
             ORDER BY scan_start_date, id"
        );
        sqlx::query_as::<_, Scan>(&query)
            .bind(from)
            .bind(to)
            .fetch_all(pool)
            .await
    }

    pub async fn site_ids(pool: &PgPool, scan_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT site_id FROM scan_sites WHERE scan_id = $1 ORDER BY site_id")
            .bind(scan_id)
            .fetch_all(pool)
            .await
    }

    /// The run of the same schedule immediately before `scan_id`.
    pub async fn previous_run(
        pool: &PgPool,
        schedule_id: DbId,
        scan_id: DbId,
    ) -> Result<Option<Scan>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM scans
             WHERE schedule_id = $1 AND id < $2
             ORDER BY id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, Scan>(&query)
            .bind(schedule_id)
            .bind(scan_id)
            .fetch_optional(pool)
            .await
    }

    /// Move a pending scan to `completed` and stamp its end date.
    ///
    /// Returns `false` if the scan is missing or no longer pending.
    pub async fn mark_completed(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE scans SET status = 'completed', scan_end_date = NOW()
             WHERE id = $1 AND status = 'pending'",
        )
        .bind(id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Move a pending scan to `failed`, recording why. The end date stays null.
    pub async fn mark_failed(pool: &PgPool, id: DbId, reason: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE scans SET status = 'failed', failure_reason = $2
             WHERE id = $1 AND status = 'pending'",
        )
        .bind(id)
        .bind(reason)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a scan. Results, alerts and false alerts cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM scans WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
