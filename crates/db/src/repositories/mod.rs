//! Repository layer: one zero-sized struct per table group, each exposing
//! async functions that take a `&PgPool`.

mod alert_repo;
mod dashboard_repo;
mod false_alert_repo;
mod report_repo;
mod scan_repo;
mod scan_result_repo;
mod schedule_repo;
mod site_repo;

pub use alert_repo::AlertRepo;
pub use dashboard_repo::DashboardRepo;
pub use false_alert_repo::FalseAlertRepo;
pub use report_repo::ReportRepo;
pub use scan_repo::ScanRepo;
pub use scan_result_repo::ScanResultRepo;
pub use schedule_repo::ScheduleRepo;
pub use site_repo::SiteRepo;
