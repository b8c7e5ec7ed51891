//! Domain logic shared by every Veille crate.
//!
//! Zero internal dependencies: severity tiers, schedule frequencies and
//! next-run arithmetic, the scan status state machine, keyword handling,
//! classifier response parsing and alert email composition.

pub mod classification;
pub mod error;
pub mod frequency;
pub mod keywords;
pub mod naming;
pub mod notification;
pub mod report;
pub mod scan_status;
pub mod severity;
pub mod types;
pub mod validation;
