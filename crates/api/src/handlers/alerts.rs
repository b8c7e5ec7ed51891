//! Handlers for alerts and false-alert markers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use veille_core::error::CoreError;
use veille_core::types::DbId;
use veille_db::models::alert::MarkFalseAlert;
use veille_db::repositories::{AlertRepo, FalseAlertRepo};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

fn alert_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Alert",
        id,
    })
}

/// GET /api/v1/alerts
///
/// Unresolved alerts not flagged as false, newest first.
pub async fn list_active_alerts(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let alerts = AlertRepo::list_active(&state.pool).await?;
    Ok(Json(DataResponse { data: alerts }))
}

/// GET /api/v1/alerts/{id}
pub async fn get_alert(
    State(state): State<AppState>,
    Path(alert_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let alert = AlertRepo::find_with_source(&state.pool, alert_id)
        .await?
        .ok_or_else(|| alert_not_found(alert_id))?;
    Ok(Json(DataResponse { data: alert }))
}

/// POST /api/v1/alerts/{id}/resolve
pub async fn resolve_alert(
    State(state): State<AppState>,
    Path(alert_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let alert = AlertRepo::resolve(&state.pool, alert_id)
        .await?
        .ok_or_else(|| alert_not_found(alert_id))?;
    tracing::info!(alert_id, "Alert resolved");
    Ok(Json(DataResponse { data: alert }))
}

/// POST /api/v1/alerts/{id}/false
///
/// Flags the alert as a false positive. A second call returns the existing
/// marker with 200 and creates nothing.
pub async fn mark_false_alert(
    State(state): State<AppState>,
    Path(alert_id): Path<DbId>,
    body: Option<Json<MarkFalseAlert>>,
) -> AppResult<impl IntoResponse> {
    let input = body.map(|Json(b)| b).unwrap_or_default();

    AlertRepo::find_by_id(&state.pool, alert_id)
        .await?
        .ok_or_else(|| alert_not_found(alert_id))?;

    if let Some(marker) =
        FalseAlertRepo::create_if_absent(&state.pool, alert_id, input.reason.trim()).await?
    {
        tracing::info!(alert_id, "Alert marked as false positive");
        return Ok((StatusCode::CREATED, Json(DataResponse { data: marker })));
    }

    let existing = FalseAlertRepo::find_by_alert(&state.pool, alert_id)
        .await?
        .ok_or_else(|| alert_not_found(alert_id))?;
    tracing::debug!(alert_id, "Alert already marked as false positive");
    Ok((StatusCode::OK, Json(DataResponse { data: existing })))
}

/// DELETE /api/v1/alerts/{id}
pub async fn delete_alert(
    State(state): State<AppState>,
    Path(alert_id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !AlertRepo::delete(&state.pool, alert_id).await? {
        return Err(alert_not_found(alert_id));
    }
    tracing::info!(alert_id, "Alert deleted");
    Ok(StatusCode::NO_CONTENT)
}
