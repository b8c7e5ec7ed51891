//! Aggregate counts for the operator dashboard.

use sqlx::PgPool;

use crate::models::dashboard::DashboardCounts;

pub struct DashboardRepo;

impl DashboardRepo {
    pub async fn counts(pool: &PgPool) -> Result<DashboardCounts, sqlx::Error> {
        sqlx::query_as::<_, DashboardCounts>(
            "SELECT
                (SELECT COUNT(*) FROM scans) AS scans_count,
                (SELECT COUNT(*) FROM alerts WHERE resolved = FALSE) AS unresolved_alerts_count,
                (SELECT COUNT(*) FROM false_alerts) AS false_alerts_count",
        )
        .fetch_one(pool)
        .await
    }
}
