//! Report date ranges and recipient lists.

use chrono::{Days, NaiveDate, NaiveTime};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Validate an inclusive report date range.
pub fn validate_range(start: NaiveDate, end: NaiveDate) -> Result<(), CoreError> {
    if start > end {
        return Err(CoreError::Validation(format!(
            "Report start date {start} is after end date {end}"
        )));
    }
    Ok(())
}

/// Convert an inclusive date range into a half-open UTC timestamp range
/// `[start 00:00, day after end 00:00)`.
pub fn range_bounds(start: NaiveDate, end: NaiveDate) -> (Timestamp, Timestamp) {
    let lower = start.and_time(NaiveTime::MIN).and_utc();
    let upper = end
        .checked_add_days(Days::new(1))
        .unwrap_or(end)
        .and_time(NaiveTime::MIN)
        .and_utc();
    (lower, upper)
}

/// Split a comma-separated recipient list, dropping blanks.
pub fn parse_recipients(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn start_after_end_is_rejected() {
        assert!(validate_range(date(2024, 2, 1), date(2024, 1, 1)).is_err());
        assert!(validate_range(date(2024, 1, 1), date(2024, 1, 1)).is_ok());
    }

    #[test]
    fn bounds_include_whole_end_day() {
        let (lower, upper) = range_bounds(date(2024, 1, 1), date(2024, 1, 31));
        assert_eq!(lower, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(upper, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn recipients_are_trimmed_and_blanks_dropped() {
        assert_eq!(
            parse_recipients(" soc@bank.cm, ,ciso@bank.cm,"),
            vec!["soc@bank.cm".to_string(), "ciso@bank.cm".to_string()]
        );
        assert!(parse_recipients("").is_empty());
    }
}
