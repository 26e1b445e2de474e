//! Collaboration topics, field whitelist, and the shared wire protocol.
//!
//! This module lives in `core` (zero internal deps) so that the events bus,
//! the WebSocket handlers, and the editor session all reference the same
//! topic naming, field names, and message protocol.

use serde::{Deserialize, Serialize};

use crate::types::DbId;

// ---------------------------------------------------------------------------
// Topics
// ---------------------------------------------------------------------------

/// Prefix for record-scoped collaboration topics.
pub const TOPIC_PREFIX: &str = "projects/";

/// Presence entries older than this many seconds are considered stale.
pub const PRESENCE_STALE_TIMEOUT_SECS: i64 = 120;

/// Build the collaboration topic for one persisted record.
///
/// Presence and field-change traffic for a record is scoped to this name,
/// so two editors looking at different records never see each other.
pub fn record_topic(id: DbId) -> String {
    format!("{TOPIC_PREFIX}{id}")
}

/// Validate a topic string and extract the record id it refers to.
pub fn parse_topic(topic: &str) -> Result<DbId, String> {
    let id = topic
        .strip_prefix(TOPIC_PREFIX)
        .and_then(|rest| rest.parse::<DbId>().ok())
        .ok_or_else(|| format!("Invalid topic '{topic}'. Expected '{TOPIC_PREFIX}<id>'"))?;
    if id <= 0 {
        return Err(format!("Topic record id must be positive, got {id}"));
    }
    Ok(id)
}

// ---------------------------------------------------------------------------
// Editable fields
// ---------------------------------------------------------------------------

/// Field names that may appear in `field.changed` messages and form edits.
pub mod fields {
    pub const PROJECT_NUMBER: &str = "project_number";
    pub const PROJECT_NAME: &str = "project_name";
    pub const START_DATE: &str = "start_date";
    pub const PROJECT_MANAGER: &str = "project_manager";
    pub const NET_PRICE: &str = "net_price";
    pub const GROSS_PRICE: &str = "gross_price";
    pub const STATUS: &str = "status";
    pub const COMMENTS: &str = "comments";
}

/// The set of all editable field names, in form order.
pub const EDITABLE_FIELDS: &[&str] = &[
    fields::PROJECT_NUMBER,
    fields::PROJECT_NAME,
    fields::START_DATE,
    fields::PROJECT_MANAGER,
    fields::NET_PRICE,
    fields::GROSS_PRICE,
    fields::STATUS,
    fields::COMMENTS,
];

/// Returns `true` if the given field name is editable.
pub fn is_editable_field(field: &str) -> bool {
    EDITABLE_FIELDS.contains(&field)
}

// ---------------------------------------------------------------------------
// Wire protocol
// ---------------------------------------------------------------------------

/// Messages broadcast to every subscriber of a topic.
///
/// Serialized as JSON with an internally-tagged `"type"` discriminator so
/// that clients can route messages by type string. Per-field delivery is
/// last-write-wins; there is no cross-subscriber ordering guarantee.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum CollabMessage {
    /// Updated roster of sessions viewing a topic.
    #[serde(rename = "presence.update")]
    PresenceUpdate {
        topic: String,
        users: Vec<PresenceUser>,
    },

    /// One form field changed value. `value: None` means the field was
    /// cleared.
    #[serde(rename = "field.changed")]
    FieldChanged {
        topic: String,
        field: String,
        value: Option<String>,
        session_id: String,
    },
}

/// One participant in a presence roster. The display name is self-reported;
/// the session id is server-assigned and unique per connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PresenceUser {
    pub session_id: String,
    pub display_name: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
