pub mod alerts;
pub mod dashboard;
pub mod health;
pub mod reports;
pub mod scans;
pub mod schedules;
pub mod sites;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /sites                        list, create
/// /sites/{id}                   delete
///
/// /schedules                    list, create (registers jobs)
/// /schedules/{id}               get, delete (unregisters jobs)
///
/// /scans                        list, create ad-hoc scan
/// /scans/quick                  quick scan from keywords
/// /scans/{id}                   get with results, delete
///
/// /alerts                       list active
/// /alerts/{id}                  get, delete
/// /alerts/{id}/resolve          resolve (POST)
/// /alerts/{id}/false            mark as false alert (POST)
///
/// /reports                      list, create (compile + send)
/// /reports/{id}                 get, delete
///
/// /dashboard                    counts
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/sites", sites::router())
        .nest("/schedules", schedules::router())
        .nest("/scans", scans::router())
        .nest("/alerts", alerts::router())
        .nest("/reports", reports::router())
        .nest("/dashboard", dashboard::router())
}
