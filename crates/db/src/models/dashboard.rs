//! Dashboard aggregate counts.

use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DashboardCounts {
    pub scans_count: i64,
    /// Unresolved alerts, false-flagged ones included.
    pub unresolved_alerts_count: i64,
    pub false_alerts_count: i64,
}
