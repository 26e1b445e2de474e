//! Route definitions for the editor surface.

use axum::routing::get;
use axum::Router;

use crate::handlers::editor;
use crate::state::AppState;

/// Routes mounted at `/editor`.
///
/// ```text
/// GET /            -> blank editor state
/// GET /{id}/edit   -> editor state for a record (303 to list if missing)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(editor::blank))
        .route("/{id}/edit", get(editor::edit))
}
