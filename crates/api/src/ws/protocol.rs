//! Editor-session message types carried over WebSocket.
//!
//! Presence rosters and field changes travel as
//! [`CollabMessage`](prodesk_core::collaboration::CollabMessage); the types
//! here are the editor commands and replies, which carry [`Project`]
//! payloads and therefore live in the api crate rather than core. Both
//! families use an internally-tagged `"type"` discriminator so clients
//! route by one type string.

use prodesk_core::types::DbId;
use prodesk_db::models::project::Project;
use serde::{Deserialize, Serialize};

use crate::editor::form::FieldError;

/// Notice shown after a successful save.
pub const NOTICE_SAVED: &str = "Data updated";

/// Notice shown when a save loses the optimistic-lock race.
pub const NOTICE_CONFLICT: &str =
    "Error updating the data. Somebody else has updated the record while you were making changes.";

/// Notice shown when the draft fails validation.
pub const NOTICE_INVALID: &str =
    "Failed to update the data. Check again that all values are valid";

/// Build the notice for a record that could not be found.
pub fn not_found_notice(id: DbId) -> String {
    format!("The requested project was not found, ID = {id}")
}

/// Commands a client sends to drive its editor session.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ClientCommand {
    /// Select a list row: load the record and join its topic.
    #[serde(rename = "record.select")]
    RecordSelect { id: DbId },

    /// Apply one field edit to the draft (and broadcast it).
    #[serde(rename = "field.edit")]
    FieldEdit {
        field: String,
        value: Option<String>,
    },

    /// Validate the draft and persist it.
    #[serde(rename = "record.save")]
    RecordSave,

    /// Discard the draft and deselect.
    #[serde(rename = "record.cancel")]
    RecordCancel,

    /// View a record's presence without opening it in the editor.
    #[serde(rename = "presence.join")]
    PresenceJoin { topic: String },

    /// Stop viewing. The editor commands leave implicitly.
    #[serde(rename = "presence.leave")]
    PresenceLeave,
}

/// Replies the server sends to the commanding client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// The selected record, with the topic the session now shares.
    #[serde(rename = "record.loaded")]
    RecordLoaded { project: Project, topic: String },

    /// The requested record does not exist (anymore). The client should
    /// clear its selection and refresh the list.
    #[serde(rename = "record.not_found")]
    RecordNotFound { id: DbId, notice: String },

    /// Save succeeded; the session is back to the blank state and the
    /// client should refresh the list.
    #[serde(rename = "record.saved")]
    RecordSaved { project: Project, notice: String },

    /// The session returned to the blank state without saving.
    #[serde(rename = "record.cleared")]
    RecordCleared,

    /// Save rejected: optimistic-lock conflict. The draft is untouched.
    #[serde(rename = "save.conflict")]
    SaveConflict { notice: String },

    /// Save rejected: field conversion failed. The draft is untouched.
    #[serde(rename = "save.invalid")]
    SaveInvalid {
        notice: String,
        errors: Vec<FieldError>,
    },

    /// A malformed or out-of-place command.
    #[serde(rename = "error")]
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_command_parses_by_type_tag() {
        let cmd: ClientCommand =
            serde_json::from_str(r#"{"type":"record.select","id":7}"#).unwrap();
        assert!(matches!(cmd, ClientCommand::RecordSelect { id: 7 }));

        let cmd: ClientCommand =
            serde_json::from_str(r#"{"type":"field.edit","field":"status","value":"active"}"#)
                .unwrap();
        assert!(matches!(cmd, ClientCommand::FieldEdit { .. }));

        let cmd: ClientCommand = serde_json::from_str(r#"{"type":"record.save"}"#).unwrap();
        assert!(matches!(cmd, ClientCommand::RecordSave));
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        assert!(serde_json::from_str::<ClientCommand>(r#"{"type":"record.explode"}"#).is_err());
    }

    #[test]
    fn test_server_message_tags() {
        let json = serde_json::to_string(&ServerMessage::SaveConflict {
            notice: NOTICE_CONFLICT.to_string(),
        })
        .unwrap();
        assert!(json.contains(r#""type":"save.conflict"#));

        let json = serde_json::to_string(&ServerMessage::RecordCleared).unwrap();
        assert!(json.contains(r#""type":"record.cleared"#));
    }
}
