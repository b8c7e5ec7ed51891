//! Scan status values and their state machine.
//!
//! A scan starts `pending` and moves exactly once to either `completed` or
//! `failed`. Both are terminal.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Pending,
    Completed,
    Failed,
}

impl ScanStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "pending" => Some(Self::Pending),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub mod state_machine {
    use super::ScanStatus;

    /// Statuses reachable from `from`. Terminal states return an empty slice.
    pub fn valid_transitions(from: ScanStatus) -> &'static [ScanStatus] {
        match from {
            ScanStatus::Pending => &[ScanStatus::Completed, ScanStatus::Failed],
            ScanStatus::Completed | ScanStatus::Failed => &[],
        }
    }

    pub fn can_transition(from: ScanStatus, to: ScanStatus) -> bool {
        valid_transitions(from).contains(&to)
    }

    /// Validate a state transition, returning an error message for invalid ones.
    pub fn validate_transition(from: ScanStatus, to: ScanStatus) -> Result<(), String> {
        if can_transition(from, to) {
            Ok(())
        } else {
            Err(format!("Invalid scan transition: {from} -> {to}"))
        }
    }
}
