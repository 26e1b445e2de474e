use std::sync::Arc;
use std::time::Duration;

use prodesk_core::collaboration::CollabMessage;
use prodesk_events::{PresenceRegistry, TopicBus, TopicEvent};

use crate::ws::manager::WsManager;

/// Interval between heartbeat ticks (in seconds).
const HEARTBEAT_INTERVAL_SECS: u64 = 30;

/// Spawn a background task that keeps the collaboration layer honest.
///
/// Every tick it pings all connected WebSocket clients (whose Pongs refresh
/// presence liveness), sweeps presence entries for sessions that vanished
/// without a leave, broadcasts the shrunken rosters, and prunes topic
/// channels nobody subscribes to anymore.
///
/// The returned `JoinHandle` is aborted during graceful shutdown.
pub fn start_heartbeat(
    ws_manager: Arc<WsManager>,
    presence: Arc<PresenceRegistry>,
    collab_bus: Arc<TopicBus>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(HEARTBEAT_INTERVAL_SECS));

        loop {
            interval.tick().await;
            let count = ws_manager.connection_count().await;
            tracing::debug!(count, "WebSocket heartbeat ping");
            ws_manager.ping_all().await;

            for (topic, users) in presence.sweep_stale().await {
                collab_bus
                    .publish(TopicEvent::new(
                        &topic,
                        CollabMessage::PresenceUpdate {
                            topic: topic.clone(),
                            users,
                        },
                    ))
                    .await;
            }

            collab_bus.prune().await;
        }
    })
}
