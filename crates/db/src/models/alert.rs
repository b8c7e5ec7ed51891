//! Alert and false-alert entity models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use veille_core::severity::Severity;
use veille_core::types::{DbId, Timestamp};

/// A row from the `alerts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Alert {
    pub id: DbId,
    pub scan_result_id: DbId,
    pub severity: String,
    pub message: String,
    pub recommendations: String,
    pub resolved: bool,
    pub alert_date: Timestamp,
    pub updated_at: Timestamp,
}

impl Alert {
    pub fn severity(&self) -> Option<Severity> {
        Severity::parse(&self.severity)
    }
}

/// Input for raising an alert on a scan result.
#[derive(Debug, Clone)]
pub struct NewAlert {
    pub scan_result_id: DbId,
    pub severity: Severity,
    pub message: String,
    pub recommendations: String,
}

/// An alert joined with the scan-result fields used in notifications.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AlertWithSource {
    pub id: DbId,
    pub scan_result_id: DbId,
    pub severity: String,
    pub message: String,
    pub recommendations: String,
    pub alert_date: Timestamp,
    pub source: String,
    pub details: String,
}

/// A row from the `false_alerts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FalseAlert {
    pub id: DbId,
    pub alert_id: DbId,
    pub reason: String,
    pub created_at: Timestamp,
}

/// DTO for flagging an alert as a false positive.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarkFalseAlert {
    #[serde(default)]
    pub reason: String,
}
