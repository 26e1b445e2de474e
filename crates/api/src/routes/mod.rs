pub mod editor;
pub mod health;
pub mod project;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                      WebSocket (presence + editor sessions)
///
/// /projects                list, create
/// /projects/count          total record count
/// /projects/{id}           get, update, delete
///
/// /editor                  blank editor state
/// /editor/{id}/edit        editor state for a record (303 to list if missing)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/projects", project::router())
        .nest("/editor", editor::router())
}
