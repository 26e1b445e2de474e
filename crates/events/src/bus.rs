//! Topic-keyed event bus backed by `tokio::sync::broadcast` channels.
//!
//! [`TopicBus`] is the publish/subscribe hub for collaboration traffic. One
//! channel exists per record topic, created lazily when the first session
//! subscribes, so sessions viewing different records never receive each
//! other's messages. Designed to be shared via `Arc<TopicBus>`.

use std::collections::HashMap;

use chrono::Utc;
use prodesk_core::collaboration::CollabMessage;
use prodesk_core::types::Timestamp;
use tokio::sync::{broadcast, RwLock};

/// Buffer capacity for each topic channel.
///
/// When the buffer is full, the oldest un-consumed messages are dropped and
/// slow receivers observe a `RecvError::Lagged`; field sync is
/// last-write-wins so skipped intermediate values are acceptable.
const TOPIC_CHANNEL_CAPACITY: usize = 256;

/// A collaboration event scoped to one topic.
#[derive(Debug, Clone)]
pub struct TopicEvent {
    pub topic: String,
    /// Session that caused the event. Subscribers typically skip events
    /// they originated themselves.
    pub origin: Option<String>,
    pub message: CollabMessage,
    /// When the event was published (UTC).
    pub timestamp: Timestamp,
}

impl TopicEvent {
    /// Create an event with no origin session.
    pub fn new(topic: impl Into<String>, message: CollabMessage) -> Self {
        Self {
            topic: topic.into(),
            origin: None,
            message,
            timestamp: Utc::now(),
        }
    }

    /// Attach the originating session to the event.
    pub fn with_origin(mut self, session_id: impl Into<String>) -> Self {
        self.origin = Some(session_id.into());
        self
    }
}

/// Topic-keyed in-process fan-out bus.
pub struct TopicBus {
    topics: RwLock<HashMap<String, broadcast::Sender<TopicEvent>>>,
}

impl TopicBus {
    /// Create a bus with no topics.
    pub fn new() -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
        }
    }

    /// Subscribe to all events published on a topic, creating the topic's
    /// channel if this is the first subscriber.
    pub async fn subscribe(&self, topic: &str) -> broadcast::Receiver<TopicEvent> {
        let mut topics = self.topics.write().await;
        topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(TOPIC_CHANNEL_CAPACITY).0)
            .subscribe()
    }

    /// Publish an event to all current subscribers of its topic.
    ///
    /// If the topic has no channel or no active subscribers the event is
    /// silently dropped.
    pub async fn publish(&self, event: TopicEvent) {
        let topics = self.topics.read().await;
        if let Some(sender) = topics.get(&event.topic) {
            // Ignore the SendError — it only means there are zero receivers.
            let _ = sender.send(event);
        }
    }

    /// Drop topics whose channels no longer have any receivers.
    ///
    /// Called periodically by the heartbeat task so topics for records
    /// nobody is viewing anymore do not accumulate.
    pub async fn prune(&self) {
        let mut topics = self.topics.write().await;
        let before = topics.len();
        topics.retain(|_, sender| sender.receiver_count() > 0);
        let pruned = before - topics.len();
        if pruned > 0 {
            tracing::debug!(pruned, "Pruned idle collaboration topics");
        }
    }

    /// Number of live topic channels.
    pub async fn topic_count(&self) -> usize {
        self.topics.read().await.len()
    }
}

impl Default for TopicBus {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
