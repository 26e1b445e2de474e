use std::sync::Arc;

use prodesk_events::{PresenceRegistry, TopicBus};

use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: prodesk_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// WebSocket connection manager (browser clients).
    pub ws_manager: Arc<WsManager>,
    /// Who is viewing which record.
    pub presence: Arc<PresenceRegistry>,
    /// Record-scoped publish/subscribe hub for presence and field traffic.
    pub collab_bus: Arc<TopicBus>,
}
