use axum::routing::{get, post};
use axum::Router;

use crate::handlers::alerts;
use crate::state::AppState;

/// Routes mounted at `/alerts`.
///
/// ```text
/// GET    /               -> list_active_alerts
/// GET    /{id}           -> get_alert
/// DELETE /{id}           -> delete_alert
/// POST   /{id}/resolve   -> resolve_alert
/// POST   /{id}/false     -> mark_false_alert
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(alerts::list_active_alerts))
        .route("/{id}", get(alerts::get_alert).delete(alerts::delete_alert))
        .route("/{id}/resolve", post(alerts::resolve_alert))
        .route("/{id}/false", post(alerts::mark_false_alert))
}
