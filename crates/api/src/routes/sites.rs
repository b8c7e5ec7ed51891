use axum::routing::{delete, get};
use axum::Router;

use crate::handlers::sites;
use crate::state::AppState;

/// Routes mounted at `/sites`.
///
/// ```text
/// GET    /        -> list_sites
/// POST   /        -> create_site
/// DELETE /{id}    -> delete_site
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(sites::list_sites).post(sites::create_site))
        .route("/{id}", delete(sites::delete_site))
}
