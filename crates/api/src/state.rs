use std::sync::Arc;

use veille_events::EventBus;
use veille_pipeline::report::ReportCompiler;
use veille_pipeline::scheduler::JobScheduler;

use crate::config::ServerConfig;

/// Shared application state available to all handlers via axum's `State`
/// extractor.
///
/// Cheaply cloneable: every field is either `Clone` (the pool) or behind an
/// `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Postgres connection pool.
    pub pool: veille_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Publishes `scan.created` for ad-hoc scans.
    pub event_bus: Arc<EventBus>,
    /// Timer jobs for scan schedules.
    pub scheduler: Arc<JobScheduler>,
    /// Renders, stores and sends reports.
    pub reports: Arc<ReportCompiler>,
}
