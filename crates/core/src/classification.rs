//! Parsing of severity verdicts returned by the text-generation service.
//!
//! The service is asked for `{"severity": ..., "recommendations": [...]}`
//! but often wraps it in a markdown code fence. Anything that does not
//! decode into a recognized verdict falls back to severity `none`.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::severity::Severity;

/// Code fences (with an optional `json` tag) and line breaks.
static FENCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```(?:json|JSON)?|\r?\n").expect("valid fence pattern"));

/// Remediation advice attached to a verdict, in whichever shape the model
/// produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recommendations {
    List(Vec<String>),
    Text(String),
}

impl Recommendations {
    /// Flatten to the single string stored on an alert.
    ///
    /// List items are joined with `", "`; text is kept verbatim.
    pub fn to_alert_text(&self) -> String {
        match self {
            Self::List(items) => items.join(", "),
            Self::Text(text) => text.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::List(items) => items.is_empty(),
            Self::Text(text) => text.is_empty(),
        }
    }
}

impl Default for Recommendations {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

/// A classifier verdict for one piece of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub severity: Severity,
    pub recommendations: Recommendations,
    /// `true` when the verdict is the fail-safe default rather than an
    /// answer decoded from the service.
    pub fallback: bool,
}

impl Classification {
    /// The fail-safe verdict: severity `none`, no recommendations.
    pub fn fallback() -> Self {
        Self {
            severity: Severity::None,
            recommendations: Recommendations::default(),
            fallback: true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawVerdict {
    severity: Option<String>,
    #[serde(default)]
    recommendations: Option<Recommendations>,
}

/// Remove code fences and line breaks from generated text.
pub fn strip_fences(text: &str) -> String {
    FENCE_PATTERN.replace_all(text, "").trim().to_string()
}

/// Decode generated text into a verdict.
///
/// Returns `None` when the text is not a JSON object of the expected shape
/// or names an unknown severity. A missing severity reads as `none`.
pub fn parse_verdict(text: &str) -> Option<Classification> {
    let cleaned = strip_fences(text);
    let raw: RawVerdict = serde_json::from_str(&cleaned).ok()?;

    let severity = match raw.severity.as_deref() {
        None => Severity::None,
        Some(label) => Severity::parse(label)?,
    };

    Some(Classification {
        severity,
        recommendations: raw.recommendations.unwrap_or_default(),
        fallback: false,
    })
}

/// Build the classifier input for a scan result: details then title,
/// lower-cased.
pub fn classification_input(details: &str, title: Option<&str>) -> String {
    let combined = match title {
        Some(title) if !title.trim().is_empty() => format!("{details} {title}"),
        _ => details.to_string(),
    };
    combined.trim().to_lowercase()
}
