pub mod alert;
pub mod dashboard;
pub mod report;
pub mod scan;
pub mod scan_result;
pub mod scan_schedule;
pub mod site;
