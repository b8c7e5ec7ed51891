use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use veille_db::repositories::DashboardRepo;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/dashboard
///
/// Total scans, unresolved alerts and false alerts.
pub async fn get_counts(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let counts = DashboardRepo::counts(&state.pool).await?;
    Ok(Json(DataResponse { data: counts }))
}
