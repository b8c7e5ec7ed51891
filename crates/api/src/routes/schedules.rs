use axum::routing::get;
use axum::Router;

use crate::handlers::schedules;
use crate::state::AppState;

/// Routes mounted at `/schedules`.
///
/// ```text
/// GET    /        -> list_schedules
/// POST   /        -> create_schedule
/// GET    /{id}    -> get_schedule
/// DELETE /{id}    -> delete_schedule
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(schedules::list_schedules).post(schedules::create_schedule),
        )
        .route(
            "/{id}",
            get(schedules::get_schedule).delete(schedules::delete_schedule),
        )
}
