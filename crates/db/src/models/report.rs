//! Report entity model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use veille_core::types::{DbId, Timestamp};

/// A row from the `reports` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Report {
    pub id: DbId,
    pub name: String,
    pub report_start_date: NaiveDate,
    pub report_end_date: NaiveDate,
    /// Rendered PDF, once written.
    pub file_path: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for compiling a report.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReport {
    #[serde(default = "default_report_name")]
    pub name: String,
    pub report_start_date: NaiveDate,
    pub report_end_date: NaiveDate,
    /// Comma-separated email addresses.
    #[serde(default)]
    pub recipients: String,
}

fn default_report_name() -> String {
    "Rapport".to_string()
}

/// A row from the `report_recipients` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReportRecipient {
    pub id: DbId,
    pub report_id: DbId,
    pub email: String,
}
