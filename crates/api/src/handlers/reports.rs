//! Handlers for compiled reports.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use veille_core::error::CoreError;
use veille_core::types::DbId;
use veille_db::models::report::{CreateReport, Report, ReportRecipient};
use veille_db::repositories::ReportRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// A report with its recipients and the scans and alerts it covers.
#[derive(Debug, Serialize)]
pub struct ReportDetail {
    #[serde(flatten)]
    pub report: Report,
    pub recipients: Vec<ReportRecipient>,
    pub scan_ids: Vec<DbId>,
    pub alert_ids: Vec<DbId>,
}

/// GET /api/v1/reports
///
/// Newest range first.
pub async fn list_reports(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let reports = ReportRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: reports }))
}

/// POST /api/v1/reports
///
/// Compiles the report inside the request: gathers the period's scans and
/// alerts, renders the PDF and emails it. Rendering and mail failures leave
/// a report without a file rather than failing the request.
pub async fn create_report(
    State(state): State<AppState>,
    Json(input): Json<CreateReport>,
) -> AppResult<impl IntoResponse> {
    let report = state.reports.compile(&input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: report })))
}

/// GET /api/v1/reports/{id}
pub async fn get_report(
    State(state): State<AppState>,
    Path(report_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let report = ReportRepo::find_by_id(&state.pool, report_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Report",
            id: report_id,
        }))?;
    let recipients = ReportRepo::recipients(&state.pool, report_id).await?;
    let scan_ids = ReportRepo::linked_scan_ids(&state.pool, report_id).await?;
    let alert_ids = ReportRepo::linked_alert_ids(&state.pool, report_id).await?;

    Ok(Json(DataResponse {
        data: ReportDetail {
            report,
            recipients,
            scan_ids,
            alert_ids,
        },
    }))
}

/// DELETE /api/v1/reports/{id}
pub async fn delete_report(
    State(state): State<AppState>,
    Path(report_id): Path<DbId>,
) -> AppResult<StatusCode> {
    state
        .reports
        .delete(report_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Report",
            id: report_id,
        }))?;
    Ok(StatusCode::NO_CONTENT)
}
