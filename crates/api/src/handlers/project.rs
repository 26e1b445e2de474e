//! Handlers for the `/projects` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use prodesk_core::error::CoreError;
use prodesk_core::pagination::Page;
use prodesk_core::types::DbId;
use prodesk_db::models::project::{CreateProject, Project, SaveOutcome, UpdateProject};
use prodesk_db::repositories::ProjectRepo;

use crate::error::{AppError, AppResult};
use crate::query::ListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Message returned when a version-checked update loses the race.
const CONFLICT_MESSAGE: &str =
    "Somebody else has updated the record while you were making changes";

/// GET /api/v1/projects
///
/// Paged, sorted, filtered listing. Returns the page envelope with the
/// filtered total so clients can compute page counts.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Page<Project>>> {
    let sort = params.sort().map_err(AppError::BadRequest)?;
    let page = ProjectRepo::list(
        &state.pool,
        &params.page_request(),
        &sort,
        &params.filter(),
    )
    .await?;
    Ok(Json(page))
}

/// POST /api/v1/projects
pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateProject>,
) -> AppResult<(StatusCode, Json<Project>)> {
    let project = ProjectRepo::create(&state.pool, &input).await?;
    tracing::info!(id = project.id, "Project created");
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/v1/projects/count
pub async fn count(State(state): State<AppState>) -> AppResult<Json<DataResponse<i64>>> {
    let total = ProjectRepo::count(&state.pool).await?;
    Ok(Json(DataResponse { data: total }))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Project>> {
    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;
    Ok(Json(project))
}

/// PUT /api/v1/projects/{id}
///
/// Version-checked full update. The body carries the complete desired
/// state plus the version the caller last read; a stale version answers
/// 409 and changes nothing.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProject>,
) -> AppResult<Json<Project>> {
    match ProjectRepo::update(&state.pool, id, &input).await? {
        SaveOutcome::Saved(project) => {
            tracing::info!(id, version = project.version, "Project updated");
            Ok(Json(project))
        }
        SaveOutcome::VersionConflict => Err(AppError::Core(CoreError::Conflict(
            CONFLICT_MESSAGE.to_string(),
        ))),
        SaveOutcome::Missing => Err(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        })),
    }
}

/// DELETE /api/v1/projects/{id}
///
/// Permanently removes the record. Deleting a nonexistent id is a no-op
/// success, so the endpoint is idempotent.
pub async fn delete(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<StatusCode> {
    let deleted = ProjectRepo::delete(&state.pool, id).await?;
    if deleted {
        tracing::info!(id, "Project deleted");
    } else {
        tracing::debug!(id, "Delete of nonexistent project treated as no-op");
    }
    Ok(StatusCode::NO_CONTENT)
}
