//! Naming conventions for generated scans and report files.

use crate::types::{DbId, Timestamp};

/// Name of a scan spawned by a schedule firing.
///
/// Convention: `{schedule name} - {YYYY-MM-DD HH:MM:SS}`. Schedules without
/// a name use `Scheduled scan`.
pub fn scheduled_scan_name(schedule_name: Option<&str>, fired_at: Timestamp) -> String {
    let base = schedule_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or("Scheduled scan");
    format!("{base} - {}", fired_at.format("%Y-%m-%d %H:%M:%S"))
}

/// Name of an ad-hoc quick scan.
pub fn quick_scan_name(keywords: &str) -> String {
    format!("Quick Scan: {}", keywords.trim())
}

/// File name of a rendered report.
pub fn report_file_name(report_id: DbId) -> String {
    format!("report-{report_id}.pdf")
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    #[test]
    fn scheduled_name_appends_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 1, 8, 6, 30, 5).unwrap();
        assert_eq!(
            scheduled_scan_name(Some("Bank watch"), at),
            "Bank watch - 2024-01-08 06:30:05"
        );
    }

    #[test]
    fn unnamed_schedule_gets_default_base() {
        let at = Utc.with_ymd_and_hms(2024, 1, 8, 0, 0, 0).unwrap();
        assert_eq!(
            scheduled_scan_name(None, at),
            "Scheduled scan - 2024-01-08 00:00:00"
        );
        assert_eq!(
            scheduled_scan_name(Some("  "), at),
            "Scheduled scan - 2024-01-08 00:00:00"
        );
    }

    #[test]
    fn quick_scan_name_uses_keywords() {
        assert_eq!(quick_scan_name(" phishing  "), "Quick Scan: phishing");
    }

    #[test]
    fn report_file_name_uses_id() {
        assert_eq!(report_file_name(42), "report-42.pdf");
    }
}
