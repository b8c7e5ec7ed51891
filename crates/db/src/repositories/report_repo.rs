//! Repository for `reports`, their scan/alert links and recipients.

use chrono::NaiveDate;
use sqlx::PgPool;
use veille_core::types::DbId;

use crate::models::report::{Report, ReportRecipient};

const COLUMNS: &str = "id, name, report_start_date, report_end_date, file_path, created_at";

pub struct ReportRepo;

impl ReportRepo {
    /// Insert a report with its links and recipients in one transaction.
    pub async fn create(
        pool: &PgPool,
        name: &str,
        start: NaiveDate,
        end: NaiveDate,
        scan_ids: &[DbId],
        alert_ids: &[DbId],
        recipients: &[String],
    ) -> Result<Report, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO reports (name, report_start_date, report_end_date)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        let report = sqlx::query_as::<_, Report>(&query)
            .bind(name)
            .bind(start)
            .bind(end)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO report_scans (report_id, scan_id)
             SELECT $1, UNNEST($2::BIGINT[])
             ON CONFLICT DO NOTHING",
        )
        .bind(report.id)
        .bind(scan_ids)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO report_alerts (report_id, alert_id)
             SELECT $1, UNNEST($2::BIGINT[])
             ON CONFLICT DO NOTHING",
        )
        .bind(report.id)
        .bind(alert_ids)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO report_recipients (report_id, email)
             SELECT $1, UNNEST($2::TEXT[])",
        )
        .bind(report.id)
        .bind(recipients)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(report)
    }

    /// Record the rendered file. Only applies while no file is set, so a
    /// written report is never repointed.
    pub async fn set_file_path(
        pool: &PgPool,
        id: DbId,
        file_path: &str,
    ) -> Result<Option<Report>, sqlx::Error> {
        let query = format!(
            "UPDATE reports SET file_path = $2
             WHERE id = $1 AND file_path IS NULL
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Report>(&query)
            .bind(id)
            .bind(file_path)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Report>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reports WHERE id = $1");
        sqlx::query_as::<_, Report>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List reports by most recent range start first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Report>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM reports ORDER BY report_start_date DESC, id DESC"
        );
        sqlx::query_as::<_, Report>(&query).fetch_all(pool).await
    }

    pub async fn recipients(
        pool: &PgPool,
        report_id: DbId,
    ) -> Result<Vec<ReportRecipient>, sqlx::Error> {
        sqlx::query_as::<_, ReportRecipient>(
            "SELECT id, report_id, email FROM report_recipients WHERE report_id = $1 ORDER BY id",
        )
        .bind(report_id)
        .fetch_all(pool)
        .await
    }

    pub async fn linked_scan_ids(pool: &PgPool, report_id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar("SELECT scan_id FROM report_scans WHERE report_id = $1 ORDER BY scan_id")
            .bind(report_id)
            .fetch_all(pool)
            .await
    }

    pub async fn linked_alert_ids(
        pool: &PgPool,
        report_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT alert_id FROM report_alerts WHERE report_id = $1 ORDER BY alert_id",
        )
        .bind(report_id)
        .fetch_all(pool)
        .await
    }

    /// Delete a report, returning the removed row so the caller can clean
    /// up its file.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<Option<Report>, sqlx::Error> {
        let query = format!("DELETE FROM reports WHERE id = $1 RETURNING {COLUMNS}");
        sqlx::query_as::<_, Report>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
