use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use prodesk_core::collaboration::{is_editable_field, parse_topic, CollabMessage, PresenceUser};
use serde::Deserialize;

use crate::editor::{EditorSaveOutcome, EditorSession, SelectOutcome};
use crate::state::AppState;
use crate::ws::protocol::{
    not_found_notice, ClientCommand, ServerMessage, NOTICE_CONFLICT, NOTICE_INVALID, NOTICE_SAVED,
};

/// Query parameters accepted on the WebSocket upgrade.
#[derive(Debug, Deserialize)]
pub struct WsParams {
    /// Display name shown in presence rosters.
    pub name: Option<String>,
}

/// HTTP handler that upgrades the connection to WebSocket.
///
/// After the upgrade the connection is registered with `WsManager`, gets
/// its own [`EditorSession`], and is managed by two tasks (sender +
/// receiver).
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsParams>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let display_name = params
        .name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "Anonymous".to_string());
    ws.on_upgrade(move |socket| handle_socket(socket, state, display_name))
}

/// Per-connection context: identity plus the topic currently shared.
struct ConnCtx {
    state: AppState,
    user: PresenceUser,
    /// The one topic this session is subscribed to, with its relay task.
    /// Selecting or viewing a different record replaces it.
    subscription: Option<(String, tokio::task::JoinHandle<()>)>,
}

impl ConnCtx {
    fn session_id(&self) -> &str {
        &self.user.session_id
    }

    /// Push an editor reply to this connection.
    async fn send(&self, message: &ServerMessage) {
        match serde_json::to_string(message) {
            Ok(text) => {
                self.state
                    .ws_manager
                    .send_to(self.session_id(), Message::Text(text.into()))
                    .await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to serialize server message"),
        }
    }

    /// Join a topic: register presence, subscribe to the bus, and spawn the
    /// relay task that forwards topic traffic to this connection. Any
    /// previous topic is left first.
    async fn join_topic(&mut self, topic: &str) {
        if self.subscription.as_ref().is_some_and(|(t, _)| t == topic) {
            return;
        }
        self.leave_topic().await;

        let mut rx = self.state.collab_bus.subscribe(topic).await;
        let roster = self
            .state
            .presence
            .join(topic, self.user.clone())
            .await;

        // Relay: forward topic events to the socket, skipping events this
        // session originated (its own edits are already applied locally).
        let ws_manager = Arc::clone(&self.state.ws_manager);
        let session_id = self.user.session_id.clone();
        let relay = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => {
                        if event.origin.as_deref() == Some(session_id.as_str()) {
                            continue;
                        }
                        match serde_json::to_string(&event.message) {
                            Ok(text) => {
                                if !ws_manager
                                    .send_to(&session_id, Message::Text(text.into()))
                                    .await
                                {
                                    break;
                                }
                            }
                            Err(e) => {
                                tracing::error!(error = %e, "Failed to serialize topic event")
                            }
                        }
                    }
                    // Field sync is last-write-wins; skipped intermediate
                    // values are fine.
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "Topic relay lagged");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        self.subscription = Some((topic.to_string(), relay));
        self.broadcast_roster(topic, roster).await;
        tracing::debug!(session_id = %self.session_id(), topic, "Joined topic");
    }

    /// Leave the current topic, if any, and broadcast the shrunken roster.
    async fn leave_topic(&mut self) {
        let Some((topic, relay)) = self.subscription.take() else {
            return;
        };
        relay.abort();
        let roster = self.state.presence.leave(&topic, self.session_id()).await;
        self.broadcast_roster(&topic, roster).await;
        tracing::debug!(session_id = %self.session_id(), topic = %topic, "Left topic");
    }

    /// Publish a presence roster update to everyone on a topic.
    async fn broadcast_roster(&self, topic: &str, users: Vec<PresenceUser>) {
        let message = CollabMessage::PresenceUpdate {
            topic: topic.to_string(),
            users,
        };
        self.state
            .collab_bus
            .publish(prodesk_events::TopicEvent::new(topic, message))
            .await;
    }
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with `WsManager`.
///   2. Spawns a sender task that forwards messages from the manager channel.
///   3. Dispatches inbound commands into the connection's editor session.
///   4. Cleans up presence and tasks on disconnect.
async fn handle_socket(socket: WebSocket, state: AppState, display_name: String) {
    let session_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(session_id = %session_id, display_name = %display_name, "WebSocket connected");

    let mut rx = state
        .ws_manager
        .add(session_id.clone(), display_name.clone())
        .await;

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward channel messages to the WebSocket sink.
    let sender_session_id = session_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(session_id = %sender_session_id, "WebSocket sink closed");
                break;
            }
        }
    });

    let mut ctx = ConnCtx {
        state: state.clone(),
        user: PresenceUser {
            session_id: session_id.clone(),
            display_name,
        },
        subscription: None,
    };
    let mut session = EditorSession::new();

    // Receiver loop: process inbound messages.
    while let Some(result) = stream.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientCommand>(&text) {
                Ok(command) => {
                    if let Err(e) = dispatch(&mut ctx, &mut session, command).await {
                        tracing::error!(session_id = %session_id, error = %e, "Storage error in editor command");
                        ctx.send(&ServerMessage::Error {
                            message: "A storage error occurred".to_string(),
                        })
                        .await;
                    }
                }
                Err(e) => {
                    ctx.send(&ServerMessage::Error {
                        message: format!("Unrecognized message: {e}"),
                    })
                    .await;
                }
            },
            Ok(Message::Pong(_)) => {
                ctx.state.presence.touch(&session_id).await;
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                tracing::debug!(session_id = %session_id, error = %e, "WebSocket receive error");
                break;
            }
        }
    }

    // Clean up: leave every roster, drop the connection, stop tasks.
    ctx.leave_topic().await;
    for (topic, roster) in state.presence.leave_all(&session_id).await {
        ctx.broadcast_roster(&topic, roster).await;
    }
    state.ws_manager.remove(&session_id).await;
    send_task.abort();
    tracing::info!(session_id = %session_id, "WebSocket disconnected");
}

/// Apply one client command to the connection's editor session, emitting
/// replies and collaboration side effects from the outcome.
async fn dispatch(
    ctx: &mut ConnCtx,
    session: &mut EditorSession,
    command: ClientCommand,
) -> Result<(), sqlx::Error> {
    match command {
        ClientCommand::RecordSelect { id } => {
            match session.select(&ctx.state.pool, id).await? {
                SelectOutcome::Loaded { project, topic } => {
                    ctx.join_topic(&topic).await;
                    ctx.send(&ServerMessage::RecordLoaded { project, topic }).await;
                }
                SelectOutcome::NotFound { id } => {
                    ctx.leave_topic().await;
                    ctx.send(&ServerMessage::RecordNotFound {
                        id,
                        notice: not_found_notice(id),
                    })
                    .await;
                }
            }
        }

        ClientCommand::FieldEdit { field, value } => {
            if !is_editable_field(&field) {
                ctx.send(&ServerMessage::Error {
                    message: format!("Unknown field '{field}'"),
                })
                .await;
                return Ok(());
            }
            match session.edit(&field, value.clone()) {
                Ok(()) => {
                    if let Some(topic) = session.topic() {
                        let message = CollabMessage::FieldChanged {
                            topic: topic.clone(),
                            field,
                            value,
                            session_id: ctx.session_id().to_string(),
                        };
                        ctx.state
                            .collab_bus
                            .publish(
                                prodesk_events::TopicEvent::new(&topic, message)
                                    .with_origin(ctx.session_id()),
                            )
                            .await;
                    }
                }
                Err(message) => ctx.send(&ServerMessage::Error { message }).await,
            }
        }

        ClientCommand::RecordSave => match session.save(&ctx.state.pool).await? {
            EditorSaveOutcome::Saved(project) => {
                ctx.leave_topic().await;
                ctx.send(&ServerMessage::RecordSaved {
                    project,
                    notice: NOTICE_SAVED.to_string(),
                })
                .await;
            }
            EditorSaveOutcome::Invalid(errors) => {
                ctx.send(&ServerMessage::SaveInvalid {
                    notice: NOTICE_INVALID.to_string(),
                    errors,
                })
                .await;
            }
            EditorSaveOutcome::Conflict => {
                ctx.send(&ServerMessage::SaveConflict {
                    notice: NOTICE_CONFLICT.to_string(),
                })
                .await;
            }
            EditorSaveOutcome::Deleted { id } => {
                ctx.leave_topic().await;
                ctx.send(&ServerMessage::RecordNotFound {
                    id,
                    notice: not_found_notice(id),
                })
                .await;
            }
        },

        ClientCommand::RecordCancel => {
            session.cancel();
            ctx.leave_topic().await;
            ctx.send(&ServerMessage::RecordCleared).await;
        }

        ClientCommand::PresenceJoin { topic } => match parse_topic(&topic) {
            Ok(_) => {
                // A viewer-only join abandons any in-progress edit.
                session.cancel();
                ctx.join_topic(&topic).await;
            }
            Err(message) => ctx.send(&ServerMessage::Error { message }).await,
        },

        ClientCommand::PresenceLeave => {
            session.cancel();
            ctx.leave_topic().await;
        }
    }
    Ok(())
}
