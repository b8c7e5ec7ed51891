//! Input validation for operator-created entities.

use crate::error::CoreError;
use crate::frequency::{Frequency, VALID_FREQUENCIES};
use crate::keywords::build_query;

/// Maximum length of site, schedule, scan and report names.
pub const MAX_NAME_LEN: usize = 100;

/// Validate a display name: non-blank and at most [`MAX_NAME_LEN`] chars.
pub fn validate_name(field: &str, name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Validate a schedule frequency label.
pub fn validate_frequency(label: &str) -> Result<Frequency, CoreError> {
    Frequency::parse(label).ok_or_else(|| {
        CoreError::Validation(format!(
            "Unknown frequency '{label}', expected one of: {}",
            VALID_FREQUENCIES.join(", ")
        ))
    })
}

/// Validate that a keyword string yields a searchable query.
pub fn validate_keywords(keywords: &str) -> Result<(), CoreError> {
    build_query(keywords)
        .map(|_| ())
        .ok_or_else(|| CoreError::Validation("keywords must not be empty".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_name_is_rejected() {
        assert!(validate_name("name", "  ").is_err());
        assert!(validate_name("name", "Le Monde").is_ok());
    }

    #[test]
    fn overlong_name_is_rejected() {
        let long = "x".repeat(MAX_NAME_LEN + 1);
        let err = validate_name("name", &long).unwrap_err();
        assert!(err.to_string().contains("at most 100"));
    }

    #[test]
    fn frequency_must_be_enumerated() {
        assert_eq!(validate_frequency("weekly").unwrap(), Frequency::Weekly);
        let err = validate_frequency("fortnightly").unwrap_err();
        assert!(err.to_string().contains("hourly, daily, weekly, monthly"));
    }

    #[test]
    fn keywords_must_be_searchable() {
        assert!(validate_keywords("bank").is_ok());
        assert!(validate_keywords(" , ").is_err());
    }
}
