//! Recurrence frequencies for scan schedules and next-run arithmetic.
//!
//! Intervals are fixed durations: a "monthly" schedule fires every 30 days
//! regardless of calendar month length.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// How often a scan schedule fires after its first run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

/// Every accepted frequency label, in ascending interval order.
pub const VALID_FREQUENCIES: &[&str] = &["hourly", "daily", "weekly", "monthly"];

impl Frequency {
    /// Parse a stored frequency label. Unknown labels return `None`.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "hourly" => Some(Self::Hourly),
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "monthly" => Some(Self::Monthly),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }

    /// Fixed interval between two firings.
    pub fn interval(self) -> Duration {
        match self {
            Self::Hourly => Duration::hours(1),
            Self::Daily => Duration::hours(24),
            Self::Weekly => Duration::days(7),
            Self::Monthly => Duration::days(30),
        }
    }
}

/// Compute the next run after a firing at `fired_at`.
///
/// Returns `None` for an unrecognized frequency label; such a schedule is
/// terminal and never fires again.
pub fn next_scan_time(frequency: &str, fired_at: Timestamp) -> Option<Timestamp> {
    Frequency::parse(frequency).map(|f| fired_at + f.interval())
}

/// First tick of a recurring job anchored on `anchor`.
///
/// Returns the earliest `anchor + k * interval` (k >= 1) that is strictly
/// later than `now`.
pub fn first_recurring_fire(anchor: Timestamp, interval: Duration, now: Timestamp) -> Timestamp {
    let step = interval.num_seconds().max(1);
    if anchor > now {
        return anchor + interval;
    }
    let elapsed = (now - anchor).num_seconds();
    let periods = elapsed / step + 1;
    anchor + Duration::seconds(step * periods)
}
