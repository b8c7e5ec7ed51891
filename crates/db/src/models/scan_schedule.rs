//! Scan schedule entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use veille_core::frequency::Frequency;
use veille_core::types::{DbId, Timestamp};

/// A row from the `scan_schedules` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ScanSchedule {
    pub id: DbId,
    pub name: Option<String>,
    /// First firing.
    pub schedule_time: Timestamp,
    /// Stored label; see [`ScanSchedule::frequency`].
    pub frequency: String,
    pub keywords: Option<String>,
    /// Scan spawned by the most recent firing.
    pub last_run_id: Option<DbId>,
    /// `None` once a firing found the frequency unrecognized.
    pub next_scan_time: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ScanSchedule {
    /// Parsed frequency, or `None` if the stored label is unrecognized.
    pub fn frequency(&self) -> Option<Frequency> {
        Frequency::parse(&self.frequency)
    }
}

/// DTO for creating a schedule.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateScanSchedule {
    pub name: Option<String>,
    #[serde(default)]
    pub site_ids: Vec<DbId>,
    pub schedule_time: Timestamp,
    pub frequency: String,
    pub keywords: Option<String>,
}
