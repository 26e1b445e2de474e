//! In-memory presence rosters, one per collaboration topic.
//!
//! Tracks which sessions are currently viewing which record so the editor
//! surface can show avatar groups. Thread-safe via interior `RwLock`;
//! designed to be wrapped in `Arc` and shared across the application.
//! Presence is ephemeral by design — it never touches storage.

use std::collections::HashMap;

use chrono::{Duration, Utc};
use prodesk_core::collaboration::{PresenceUser, PRESENCE_STALE_TIMEOUT_SECS};
use prodesk_core::types::Timestamp;
use tokio::sync::RwLock;

struct PresenceEntry {
    user: PresenceUser,
    last_seen_at: Timestamp,
}

/// Roster bookkeeping for all topics.
pub struct PresenceRegistry {
    topics: RwLock<HashMap<String, HashMap<String, PresenceEntry>>>,
}

impl PresenceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
        }
    }

    /// Add a session to a topic's roster. Re-joining refreshes the entry.
    ///
    /// Returns the roster after the join, for broadcasting.
    pub async fn join(&self, topic: &str, user: PresenceUser) -> Vec<PresenceUser> {
        let mut topics = self.topics.write().await;
        let roster = topics.entry(topic.to_string()).or_default();
        roster.insert(
            user.session_id.clone(),
            PresenceEntry {
                user,
                last_seen_at: Utc::now(),
            },
        );
        sorted_users(roster)
    }

    /// Remove a session from a topic's roster; empty rosters are dropped.
    ///
    /// Returns the roster after the leave, for broadcasting.
    pub async fn leave(&self, topic: &str, session_id: &str) -> Vec<PresenceUser> {
        let mut topics = self.topics.write().await;
        let Some(roster) = topics.get_mut(topic) else {
            return Vec::new();
        };
        roster.remove(session_id);
        let users = sorted_users(roster);
        if roster.is_empty() {
            topics.remove(topic);
        }
        users
    }

    /// The current roster of a topic.
    pub async fn roster(&self, topic: &str) -> Vec<PresenceUser> {
        let topics = self.topics.read().await;
        topics.get(topic).map(sorted_users).unwrap_or_default()
    }

    /// Refresh liveness for a session in every topic it has joined.
    pub async fn touch(&self, session_id: &str) {
        let now = Utc::now();
        let mut topics = self.topics.write().await;
        for roster in topics.values_mut() {
            if let Some(entry) = roster.get_mut(session_id) {
                entry.last_seen_at = now;
            }
        }
    }

    /// Remove a session from every roster it appears in.
    ///
    /// Returns each affected topic with its roster after removal, for
    /// broadcasting. Used on disconnect.
    pub async fn leave_all(&self, session_id: &str) -> Vec<(String, Vec<PresenceUser>)> {
        let mut topics = self.topics.write().await;
        let mut affected = Vec::new();
        topics.retain(|topic, roster| {
            if roster.remove(session_id).is_some() {
                affected.push((topic.clone(), sorted_users(roster)));
            }
            !roster.is_empty()
        });
        affected
    }

    /// Drop entries that have not been seen within the stale timeout.
    ///
    /// Returns each affected topic with its roster after the sweep. Covers
    /// sessions that vanished without a leave (crashed client, dropped
    /// socket).
    pub async fn sweep_stale(&self) -> Vec<(String, Vec<PresenceUser>)> {
        let cutoff = Utc::now() - Duration::seconds(PRESENCE_STALE_TIMEOUT_SECS);
        self.sweep_older_than(cutoff).await
    }

    async fn sweep_older_than(&self, cutoff: Timestamp) -> Vec<(String, Vec<PresenceUser>)> {
        let mut topics = self.topics.write().await;
        let mut affected = Vec::new();
        topics.retain(|topic, roster| {
            let before = roster.len();
            roster.retain(|_, entry| entry.last_seen_at >= cutoff);
            if roster.len() != before {
                affected.push((topic.clone(), sorted_users(roster)));
            }
            !roster.is_empty()
        });
        if !affected.is_empty() {
            tracing::debug!(topics = affected.len(), "Swept stale presence entries");
        }
        affected
    }
}

impl Default for PresenceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Roster snapshot in a deterministic order.
fn sorted_users(roster: &HashMap<String, PresenceEntry>) -> Vec<PresenceUser> {
    let mut users: Vec<PresenceUser> = roster.values().map(|e| e.user.clone()).collect();
    users.sort_by(|a, b| a.session_id.cmp(&b.session_id));
    users
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn user(session_id: &str, name: &str) -> PresenceUser {
        PresenceUser {
            session_id: session_id.to_string(),
            display_name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn join_and_roster() {
        let registry = PresenceRegistry::new();

        let roster = registry.join("projects/1", user("a", "Ada")).await;
        assert_eq!(roster.len(), 1);

        let roster = registry.join("projects/1", user("b", "Ben")).await;
        assert_eq!(roster.len(), 2);
        assert_eq!(roster[0].session_id, "a");
        assert_eq!(roster[1].session_id, "b");

        assert_eq!(registry.roster("projects/1").await.len(), 2);
        assert!(registry.roster("projects/2").await.is_empty());
    }

    #[tokio::test]
    async fn rejoin_does_not_duplicate() {
        let registry = PresenceRegistry::new();
        registry.join("projects/1", user("a", "Ada")).await;
        let roster = registry.join("projects/1", user("a", "Ada")).await;
        assert_eq!(roster.len(), 1);
    }

    #[tokio::test]
    async fn leave_drops_empty_topics() {
        let registry = PresenceRegistry::new();
        registry.join("projects/1", user("a", "Ada")).await;

        let roster = registry.leave("projects/1", "a").await;
        assert!(roster.is_empty());
        assert!(registry.roster("projects/1").await.is_empty());
    }

    #[tokio::test]
    async fn leave_unknown_topic_is_noop() {
        let registry = PresenceRegistry::new();
        assert!(registry.leave("projects/9", "ghost").await.is_empty());
    }

    #[tokio::test]
    async fn leave_all_reports_each_topic() {
        let registry = PresenceRegistry::new();
        registry.join("projects/1", user("a", "Ada")).await;
        registry.join("projects/1", user("b", "Ben")).await;
        registry.join("projects/2", user("a", "Ada")).await;

        let mut affected = registry.leave_all("a").await;
        affected.sort_by(|(t1, _), (t2, _)| t1.cmp(t2));

        assert_eq!(affected.len(), 2);
        assert_eq!(affected[0].0, "projects/1");
        assert_eq!(affected[0].1.len(), 1);
        assert_eq!(affected[1].0, "projects/2");
        assert!(affected[1].1.is_empty());

        // projects/2 became empty and was dropped entirely.
        assert!(registry.roster("projects/2").await.is_empty());
        assert_eq!(registry.roster("projects/1").await.len(), 1);
    }

    #[tokio::test]
    async fn sweep_removes_only_stale_entries() {
        let registry = PresenceRegistry::new();
        registry.join("projects/1", user("old", "Old")).await;
        registry.join("projects/1", user("fresh", "Fresh")).await;

        // Backdate one entry past any cutoff we pick.
        {
            let mut topics = registry.topics.write().await;
            let roster = topics.get_mut("projects/1").unwrap();
            roster.get_mut("old").unwrap().last_seen_at =
                Utc::now() - Duration::seconds(PRESENCE_STALE_TIMEOUT_SECS * 2);
        }

        let affected = registry.sweep_stale().await;
        assert_eq!(affected.len(), 1);
        assert_eq!(affected[0].1.len(), 1);
        assert_eq!(affected[0].1[0].session_id, "fresh");
    }

    #[tokio::test]
    async fn touch_keeps_entry_alive() {
        let registry = PresenceRegistry::new();
        registry.join("projects/1", user("a", "Ada")).await;

        // Backdate, then touch to refresh.
        {
            let mut topics = registry.topics.write().await;
            let roster = topics.get_mut("projects/1").unwrap();
            roster.get_mut("a").unwrap().last_seen_at =
                Utc::now() - Duration::seconds(PRESENCE_STALE_TIMEOUT_SECS * 2);
        }
        registry.touch("a").await;

        assert!(registry.sweep_stale().await.is_empty());
        assert_eq!(registry.roster("projects/1").await.len(), 1);
    }
}
