use axum::routing::{get, post};
use axum::Router;

use crate::handlers::scans;
use crate::state::AppState;

/// Routes mounted at `/scans`.
///
/// ```text
/// GET    /        -> list_scans
/// POST   /        -> create_scan
/// POST   /quick   -> quick_scan
/// GET    /{id}    -> get_scan
/// DELETE /{id}    -> delete_scan
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(scans::list_scans).post(scans::create_scan))
        .route("/quick", post(scans::quick_scan))
        .route("/{id}", get(scans::get_scan).delete(scans::delete_scan))
}
