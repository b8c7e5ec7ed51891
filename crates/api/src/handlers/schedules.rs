//! Handlers for scan schedules.
//!
//! Creating a schedule registers its timer jobs; deleting it unregisters
//! them before the row goes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use veille_core::error::CoreError;
use veille_core::types::DbId;
use veille_core::validation::{validate_frequency, validate_keywords, validate_name};
use veille_db::models::scan_schedule::{CreateScanSchedule, ScanSchedule};
use veille_db::repositories::ScheduleRepo;
use veille_pipeline::scheduler::{once_job_id, recurring_job_id, ScheduleTiming};

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

/// A schedule with its sites and live timer jobs.
#[derive(Debug, Serialize)]
pub struct ScheduleDetail {
    #[serde(flatten)]
    pub schedule: ScanSchedule,
    pub site_ids: Vec<DbId>,
    pub jobs: Vec<String>,
}

fn live_jobs(state: &AppState, schedule_id: DbId) -> Vec<String> {
    let ids = [once_job_id(schedule_id), recurring_job_id(schedule_id)];
    state
        .scheduler
        .job_ids()
        .into_iter()
        .filter(|job| ids.contains(job))
        .collect()
}

/// GET /api/v1/schedules
pub async fn list_schedules(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let schedules = ScheduleRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: schedules }))
}

/// POST /api/v1/schedules
///
/// Validates name, frequency and keywords, stores the schedule and
/// registers its one-shot and recurring jobs.
pub async fn create_schedule(
    State(state): State<AppState>,
    Json(input): Json<CreateScanSchedule>,
) -> AppResult<impl IntoResponse> {
    if let Some(name) = &input.name {
        validate_name("name", name)?;
    }
    let frequency = validate_frequency(&input.frequency)?;
    if let Some(keywords) = &input.keywords {
        validate_keywords(keywords)?;
    }

    let normalized = CreateScanSchedule {
        frequency: frequency.as_str().to_string(),
        ..input
    };
    let schedule = ScheduleRepo::create(&state.pool, &normalized).await?;
    let jobs = state.scheduler.register(&ScheduleTiming::from(&schedule));
    let site_ids = ScheduleRepo::site_ids(&state.pool, schedule.id).await?;

    tracing::info!(
        schedule_id = schedule.id,
        frequency = %schedule.frequency,
        jobs = jobs.len(),
        "Schedule created",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: ScheduleDetail {
                schedule,
                site_ids,
                jobs,
            },
        }),
    ))
}

/// GET /api/v1/schedules/{id}
pub async fn get_schedule(
    State(state): State<AppState>,
    Path(schedule_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let schedule = ScheduleRepo::find_by_id(&state.pool, schedule_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "ScanSchedule",
            id: schedule_id,
        }))?;
    let site_ids = ScheduleRepo::site_ids(&state.pool, schedule_id).await?;
    let jobs = live_jobs(&state, schedule_id);

    Ok(Json(DataResponse {
        data: ScheduleDetail {
            schedule,
            site_ids,
            jobs,
        },
    }))
}

/// DELETE /api/v1/schedules/{id}
///
/// The row goes first so a failed delete keeps its timers. Unregistering
/// jobs that do not exist is a no-op, so deleting twice only differs in the
/// status code.
pub async fn delete_schedule(
    State(state): State<AppState>,
    Path(schedule_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let deleted = ScheduleRepo::delete(&state.pool, schedule_id).await?;
    let removed_jobs = state.scheduler.unregister(schedule_id);

    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "ScanSchedule",
            id: schedule_id,
        }));
    }
    tracing::info!(schedule_id, removed_jobs, "Schedule deleted");
    Ok(StatusCode::NO_CONTENT)
}
