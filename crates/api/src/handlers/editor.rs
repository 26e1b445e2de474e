//! Handlers for the editor route convention.
//!
//! The editor surface is addressable by an optional record id plus an
//! `edit` marker. Navigating to an id that no longer exists answers a
//! redirect back to the list route with a user-visible notice, so stale
//! bookmarks and deleted-by-someone-else records degrade gracefully.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use prodesk_core::collaboration::record_topic;
use prodesk_core::types::DbId;
use prodesk_db::models::project::Project;
use prodesk_db::repositories::ProjectRepo;
use serde::Serialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::ws::protocol::not_found_notice;

/// Where the editor sends clients that asked for a record that is gone.
const LIST_ROUTE: &str = "/api/v1/projects";

/// Editor state payload: the loaded record (if any) and the collaboration
/// topic that scopes its presence and field traffic.
#[derive(Debug, Serialize)]
pub struct EditorView {
    pub project: Option<Project>,
    pub topic: Option<String>,
}

/// GET /api/v1/editor — the blank (empty-selection) editor state.
pub async fn blank() -> Json<DataResponse<EditorView>> {
    Json(DataResponse {
        data: EditorView {
            project: None,
            topic: None,
        },
    })
}

/// GET /api/v1/editor/{id}/edit
///
/// Returns the editor state for one record, or a `303 See Other` back to
/// the list route (with an `x-notice` header) when the id is unknown.
pub async fn edit(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<Response> {
    match ProjectRepo::find_by_id(&state.pool, id).await? {
        Some(project) => Ok(Json(DataResponse {
            data: EditorView {
                topic: Some(record_topic(project.id)),
                project: Some(project),
            },
        })
        .into_response()),
        None => {
            tracing::info!(id, "Requested project not found, redirecting to list");
            Ok((
                [("x-notice", not_found_notice(id))],
                Redirect::to(LIST_ROUTE),
            )
                .into_response())
        }
    }
}
