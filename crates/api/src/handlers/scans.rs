//! Handlers for scans.
//!
//! Ad-hoc and quick scans publish `scan.created`; the ingestor picks them up
//! from the bus.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use veille_core::error::CoreError;
use veille_core::naming::quick_scan_name;
use veille_core::types::DbId;
use veille_core::validation::{validate_keywords, validate_name};
use veille_db::models::scan::{CreateScan, Scan};
use veille_db::models::scan_result::ScanResult;
use veille_db::repositories::{ScanRepo, ScanResultRepo};
use veille_events::PlatformEvent;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `POST /scans/quick`.
#[derive(Debug, Deserialize)]
pub struct QuickScanRequest {
    pub keywords: String,
    #[serde(default)]
    pub site_ids: Vec<DbId>,
}

/// A scan with its sites and stored results.
#[derive(Debug, Serialize)]
pub struct ScanDetail {
    #[serde(flatten)]
    pub scan: Scan,
    pub site_ids: Vec<DbId>,
    pub results: Vec<ScanResult>,
}

/// GET /api/v1/scans
pub async fn list_scans(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let scans = ScanRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: scans }))
}

/// POST /api/v1/scans
pub async fn create_scan(
    State(state): State<AppState>,
    Json(input): Json<CreateScan>,
) -> AppResult<impl IntoResponse> {
    if let Some(name) = &input.name {
        validate_name("name", name)?;
    }

    let scan = ScanRepo::create(&state.pool, &input).await?;
    state.event_bus.publish(PlatformEvent::scan_created(scan.id));
    tracing::info!(scan_id = scan.id, "Ad-hoc scan created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: scan })))
}

/// POST /api/v1/scans/quick
///
/// Creates a scan named `Quick Scan: {keywords}` from the given keywords.
pub async fn quick_scan(
    State(state): State<AppState>,
    Json(input): Json<QuickScanRequest>,
) -> AppResult<impl IntoResponse> {
    validate_keywords(&input.keywords)?;

    let create = CreateScan {
        name: Some(quick_scan_name(&input.keywords)),
        site_ids: input.site_ids,
        schedule_id: None,
        keywords: Some(input.keywords.trim().to_string()),
    };
    let scan = ScanRepo::create(&state.pool, &create).await?;
    state.event_bus.publish(PlatformEvent::scan_created(scan.id));
    tracing::info!(scan_id = scan.id, "Quick scan created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: scan })))
}

/// GET /api/v1/scans/{id}
pub async fn get_scan(
    State(state): State<AppState>,
    Path(scan_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let scan = ScanRepo::find_by_id(&state.pool, scan_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Scan",
            id: scan_id,
        }))?;
    let site_ids = ScanRepo::site_ids(&state.pool, scan_id).await?;
    let results = ScanResultRepo::list_by_scan(&state.pool, scan_id).await?;

    Ok(Json(DataResponse {
        data: ScanDetail {
            scan,
            site_ids,
            results,
        },
    }))
}

/// DELETE /api/v1/scans/{id}
///
/// Results and their alerts go with the scan.
pub async fn delete_scan(
    State(state): State<AppState>,
    Path(scan_id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !ScanRepo::delete(&state.pool, scan_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Scan",
            id: scan_id,
        }));
    }
    tracing::info!(scan_id, "Scan deleted");
    Ok(StatusCode::NO_CONTENT)
}
