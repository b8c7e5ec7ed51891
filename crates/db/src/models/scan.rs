//! Scan entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use veille_core::scan_status::ScanStatus;
use veille_core::types::{DbId, Timestamp};

/// A row from the `scans` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Scan {
    pub id: DbId,
    pub name: Option<String>,
    pub schedule_id: Option<DbId>,
    pub scan_start_date: Timestamp,
    /// Set only when the scan completes.
    pub scan_end_date: Option<Timestamp>,
    pub status: String,
    pub keywords: Option<String>,
    pub failure_reason: Option<String>,
}

impl Scan {
    pub fn status(&self) -> Option<ScanStatus> {
        ScanStatus::parse(&self.status)
    }
}

/// DTO for creating a scan. The scan always starts `pending`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateScan {
    pub name: Option<String>,
    #[serde(default)]
    pub site_ids: Vec<DbId>,
    pub schedule_id: Option<DbId>,
    pub keywords: Option<String>,
}
