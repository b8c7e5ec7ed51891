//! Repository for the `alerts` table.

use sqlx::PgPool;
use veille_core::types::{DbId, Timestamp};

use crate::models::alert::{Alert, AlertWithSource, NewAlert};

const COLUMNS: &str =
    "id, scan_result_id, severity, message, recommendations, resolved, alert_date, updated_at";

/// Same columns, qualified for joins against `alerts a`.
const A_COLUMNS: &str = "a.id, a.scan_result_id, a.severity, a.message, a.recommendations, \
                         a.resolved, a.alert_date, a.updated_at";

pub struct AlertRepo;

impl AlertRepo {
    /// Raise an alert on a scan result unless one already exists.
    ///
    /// Returns the new row, or `None` when the result already carries an
    /// alert. Only a `Some` return counts as "newly created".
    pub async fn create_if_absent(
        pool: &PgPool,
        input: &NewAlert,
    ) -> Result<Option<Alert>, sqlx::Error> {
        let query = format!(
            "INSERT INTO alerts (scan_result_id, severity, message, recommendations)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (scan_result_id) DO NOTHING
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(input.scan_result_id)
            .bind(input.severity.as_str())
            .bind(&input.message)
            .bind(&input.recommendations)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Alert>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM alerts WHERE id = $1");
        sqlx::query_as::<_, Alert>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_scan_result(
        pool: &PgPool,
        scan_result_id: DbId,
    ) -> Result<Option<Alert>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM alerts WHERE scan_result_id = $1");
        sqlx::query_as::<_, Alert>(&query)
            .bind(scan_result_id)
            .fetch_optional(pool)
            .await
    }

    /// Load an alert with its result's source and details.
    pub async fn find_with_source(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<AlertWithSource>, sqlx::Error> {
        sqlx::query_as::<_, AlertWithSource>(
            "SELECT a.id, a.scan_result_id, a.severity, a.message, a.recommendations,
                    a.alert_date, r.source, r.details
             FROM alerts a
             JOIN scan_results r ON r.id = a.scan_result_id
             WHERE a.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Unresolved alerts without a false-alert marker, newest first.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<Alert>, sqlx::Error> {
        let query = format!(
            "SELECT {A_COLUMNS} FROM alerts a
             LEFT JOIN false_alerts f ON f.alert_id = a.id
             WHERE a.resolved = FALSE AND f.id IS NULL
             ORDER BY a.alert_date DESC, a.id DESC"
        );
        sqlx::query_as::<_, Alert>(&query).fetch_all(pool).await
    }

    /// Alerts raised within `[from, to)`, with their source, oldest first.
    pub async fn list_raised_between(
        pool: &PgPool,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<AlertWithSource>, sqlx::Error> {
        sqlx::query_as::<_, AlertWithSource>(
            "SELECT a.id, a.scan_result_id, a.severity, a.message, a.recommendations,
                    a.alert_date, r.source, r.details
             FROM alerts a
             JOIN scan_results r ON r.id = a.scan_result_id
             WHERE a.alert_date >= $1 AND a.alert_date < $2
             ORDER BY a.alert_date, a.id",
        )
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
    }

    /// Mark an alert resolved. Returns `None` if it does not exist.
    pub async fn resolve(pool: &PgPool, id: DbId) -> Result<Option<Alert>, sqlx::Error> {
        let query = format!(
            "UPDATE alerts SET resolved = TRUE, updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM alerts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
