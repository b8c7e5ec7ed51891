//! Repository for the `false_alerts` table.

use sqlx::PgPool;
use veille_core::types::DbId;

use crate::models::alert::FalseAlert;

const COLUMNS: &str = "id, alert_id, reason, created_at";

pub struct FalseAlertRepo;

impl FalseAlertRepo {
    /// Flag an alert as a false positive unless it already is.
    ///
    /// Returns `None` when a marker already exists; the existing marker is
    /// left untouched.
    pub async fn create_if_absent(
        pool: &PgPool,
        alert_id: DbId,
        reason: &str,
    ) -> Result<Option<FalseAlert>, sqlx::Error> {
        let query = format!(
            "INSERT INTO false_alerts (alert_id, reason)
             VALUES ($1, $2)
             ON CONFLICT (alert_id) DO NOTHING
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, FalseAlert>(&query)
            .bind(alert_id)
            .bind(reason)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_alert(
        pool: &PgPool,
        alert_id: DbId,
    ) -> Result<Option<FalseAlert>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM false_alerts WHERE alert_id = $1");
        sqlx::query_as::<_, FalseAlert>(&query)
            .bind(alert_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn count_for_alert(pool: &PgPool, alert_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM false_alerts WHERE alert_id = $1")
            .bind(alert_id)
            .fetch_one(pool)
            .await
    }
}
