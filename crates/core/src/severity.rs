//! Severity tiers assigned to scan results by the classifier.

use serde::{Deserialize, Serialize};

/// Severity of a finding, ordered from harmless to critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    None,
    Low,
    Medium,
    High,
}

impl Severity {
    /// Parse a severity label, case-insensitively.
    ///
    /// Legacy French labels stored by earlier deployments are mapped onto
    /// the English tiers. Unknown labels return `None`.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "none" => Some(Self::None),
            "low" | "faible" => Some(Self::Low),
            "medium" | "moyen" | "moyenne" => Some(Self::Medium),
            "high" | "élevé" | "élevée" | "eleve" | "elevee" => Some(Self::High),
            _ => None,
        }
    }

    /// Canonical lowercase label, as stored in the `alerts.severity` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Whether a finding at this tier produces an alert.
    pub fn raises_alert(self) -> bool {
        self != Self::None
    }

    /// Whether an alert at this tier is emailed.
    pub fn is_notifiable(self) -> bool {
        self == Self::High
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
