//! Handlers for monitored sites.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use veille_core::error::CoreError;
use veille_core::types::DbId;
use veille_core::validation::validate_name;
use veille_db::models::site::CreateSite;
use veille_db::repositories::SiteRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/sites
pub async fn list_sites(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let sites = SiteRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: sites }))
}

/// POST /api/v1/sites
pub async fn create_site(
    State(state): State<AppState>,
    Json(input): Json<CreateSite>,
) -> AppResult<impl IntoResponse> {
    validate_name("name", &input.name)?;

    let site = SiteRepo::create(&state.pool, &input).await?;
    tracing::info!(site_id = site.id, name = %site.name, "Site created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: site })))
}

/// DELETE /api/v1/sites/{id}
pub async fn delete_site(
    State(state): State<AppState>,
    Path(site_id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !SiteRepo::delete(&state.pool, site_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Site",
            id: site_id,
        }));
    }
    tracing::info!(site_id, "Site deleted");
    Ok(StatusCode::NO_CONTENT)
}
