pub mod alerts;
pub mod dashboard;
pub mod reports;
pub mod scans;
pub mod schedules;
pub mod sites;
