//! `WebSocket` handler: one task per connected client.
//!
//! Clients connect to `GET /ws` and exchange JSON text frames. Inbound
//! frames are [`ClientMessage`]s, outbound frames [`ServerMessage`]s.
//!
//! Each connection `select!`s between its socket and its outbox. Until the
//! client joins a game the task holds the only sender of that outbox; once
//! joined, the sender lives in the game's broadcaster. If the broadcaster
//! drops a slow client, the outbox closes and so does the socket.
//!
//! Direct replies (`Rejected`, `ProtocolError`) go straight to the socket
//! and never to other clients.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use codex_core::game::PlayerAction;
use codex_core::session::GameHandle;
use codex_types::{ClientMessage, ConnectionId, ServerMessage};
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::state::AppState;

/// Upgrade an HTTP request to a `WebSocket` game connection.
///
/// # Route
///
/// `GET /ws`
pub async fn ws_game(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_ws(socket, state))
}

/// Drive one connection until either side closes it.
async fn handle_ws(socket: WebSocket, state: Arc<AppState>) {
    let (outbox, mut rx) = mpsc::channel(state.outbound_buffer);
    let mut connection = Connection::new(state, outbox);
    let id = connection.id;
    info!(connection = %id, "client connected");

    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            outbound = rx.recv() => {
                let Some(message) = outbound else {
                    debug!(connection = %id, "outbox closed, disconnecting");
                    break;
                };
                if send(&mut sender, &message).await.is_err() {
                    debug!(connection = %id, "client disconnected (send failed)");
                    break;
                }
            }
            inbound = receiver.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        let reply = connection.on_text(text.as_str()).await;
                        let sent = match reply {
                            Some(reply) => send(&mut sender, &reply).await,
                            None => Ok(()),
                        };
                        if sent.is_err() {
                            break;
                        }
                        if connection.too_many_errors() {
                            warn!(connection = %id, "too many protocol errors, closing");
                            break;
                        }
                    }
                    Some(Ok(Message::Binary(_))) => {
                        let reply = connection.protocol_error("binary frames are not supported");
                        if send(&mut sender, &reply).await.is_err()
                            || connection.too_many_errors()
                        {
                            break;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            debug!(connection = %id, "client disconnected (pong failed)");
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(connection = %id, "client disconnected");
                        break;
                    }
                    Some(Err(e)) => {
                        debug!(connection = %id, "WebSocket error: {e}");
                        break;
                    }
                    Some(Ok(Message::Pong(_))) => {}
                }
            }
        }
    }

    connection.leave().await;
    info!(connection = %id, "client connection closed");
}

async fn send(
    sender: &mut SplitSink<WebSocket, Message>,
    message: &ServerMessage,
) -> Result<(), axum::Error> {
    let json = match serde_json::to_string(message) {
        Ok(j) => j,
        Err(e) => {
            warn!("Failed to serialize server message: {e}");
            return Ok(());
        }
    };
    sender.send(Message::Text(json.into())).await
}

/// Per-connection protocol state, independent of the socket.
struct Connection {
    id: ConnectionId,
    state: Arc<AppState>,
    /// Held until a join hands it to the game.
    outbox: Option<mpsc::Sender<ServerMessage>>,
    game: Option<GameHandle>,
    protocol_errors: u32,
}

impl Connection {
    fn new(state: Arc<AppState>, outbox: mpsc::Sender<ServerMessage>) -> Self {
        Self {
            id: ConnectionId::new(),
            state,
            outbox: Some(outbox),
            game: None,
            protocol_errors: 0,
        }
    }

    /// Handle one inbound text frame; returns the direct reply, if any.
    async fn on_text(&mut self, text: &str) -> Option<ServerMessage> {
        let message: ClientMessage = match serde_json::from_str(text) {
            Ok(message) => message,
            Err(e) => return Some(self.protocol_error(&format!("malformed message: {e}"))),
        };
        let kind = message.kind();
        debug!(connection = %self.id, action = ?kind, "message received");

        match message {
            ClientMessage::CreateGame {
                game_name,
                player_count,
                player_name,
            } => {
                let outbox = match self.join_outbox() {
                    Ok(outbox) => outbox,
                    Err(reply) => return Some(reply),
                };
                let created = self
                    .state
                    .lobby
                    .create(&game_name, player_count, player_name, self.id, outbox)
                    .await;
                match created {
                    Ok((handle, _)) => {
                        self.joined(handle);
                        None
                    }
                    Err(err) => Some(ServerMessage::rejected(kind, err.reason())),
                }
            }
            ClientMessage::JoinGame {
                game_name,
                player_name,
            } => {
                let outbox = match self.join_outbox() {
                    Ok(outbox) => outbox,
                    Err(reply) => return Some(reply),
                };
                let joined = self
                    .state
                    .lobby
                    .join(&game_name, player_name, self.id, outbox)
                    .await;
                match joined {
                    Ok((handle, _)) => {
                        self.joined(handle);
                        None
                    }
                    Err(err) => Some(ServerMessage::rejected(kind, err.reason())),
                }
            }
            other => {
                let Some(handle) = self.game.as_ref() else {
                    return Some(self.protocol_error("join a game before acting"));
                };
                let action = PlayerAction::from_message(&other)?;
                match handle.act(self.id, action).await {
                    Ok(()) => None,
                    Err(err) => Some(ServerMessage::rejected(kind, err.reason())),
                }
            }
        }
    }

    /// A sender for a join, or the protocol error for a second join.
    fn join_outbox(&mut self) -> Result<mpsc::Sender<ServerMessage>, ServerMessage> {
        let outbox = self.outbox.clone().filter(|_| self.game.is_none());
        outbox.ok_or_else(|| self.protocol_error("already joined a game"))
    }

    fn joined(&mut self, handle: GameHandle) {
        info!(connection = %self.id, game = handle.name(), "joined game");
        self.outbox = None;
        self.game = Some(handle);
    }

    fn protocol_error(&mut self, message: &str) -> ServerMessage {
        self.protocol_errors = self.protocol_errors.saturating_add(1);
        warn!(
            connection = %self.id,
            count = self.protocol_errors,
            "protocol error: {message}"
        );
        ServerMessage::ProtocolError {
            message: String::from(message),
        }
    }

    fn too_many_errors(&self) -> bool {
        self.protocol_errors >= self.state.max_protocol_errors
    }

    async fn leave(&self) {
        if let Some(handle) = &self.game {
            handle.leave(self.id).await;
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use codex_core::config::CodexConfig;
    use codex_core::lobby::Lobby;
    use codex_rules::CardCatalog;
    use codex_types::{Phase, RejectionReason};

    fn state() -> Arc<AppState> {
        let config = CodexConfig::default();
        let catalog = Arc::new(CardCatalog::standard().unwrap());
        let lobby = Arc::new(Lobby::new(config.game, &config.server, catalog));
        Arc::new(AppState::new(lobby, &config.server))
    }

    fn connect(state: &Arc<AppState>) -> (Connection, mpsc::Receiver<ServerMessage>) {
        let (tx, rx) = mpsc::channel(16);
        (Connection::new(Arc::clone(state), tx), rx)
    }

    #[tokio::test]
    async fn create_join_and_act() {
        let state = state();
        let (mut alice, mut alice_rx) = connect(&state);
        let (mut bob, _bob_rx) = connect(&state);

        let reply = alice
            .on_text(r#"{"action":"CreateGame","game_name":"g1","player_count":2,"player_name":"Alice"}"#)
            .await;
        assert!(reply.is_none());
        assert!(matches!(
            alice_rx.recv().await,
            Some(ServerMessage::Welcome { seat: 0, .. })
        ));
        assert!(matches!(
            alice_rx.recv().await,
            Some(ServerMessage::Snapshot { view }) if view.phase == Phase::WaitingForPlayers
        ));

        let reply = bob
            .on_text(r#"{"action":"JoinGame","game_name":"g1","player_name":"Bob"}"#)
            .await;
        assert!(reply.is_none());
        assert!(matches!(
            alice_rx.recv().await,
            Some(ServerMessage::Snapshot { view }) if view.phase == Phase::Setup
        ));

        // Acting out of phase is a rejection, not a protocol error.
        let reply = bob
            .on_text(r#"{"action":"DrawCard","source":{"Deck":{"deck":"Gold"}}}"#)
            .await;
        assert!(matches!(
            reply,
            Some(ServerMessage::Rejected { reason: RejectionReason::WrongPhase, .. })
        ));
        assert_eq!(bob.protocol_errors, 0);
    }

    #[tokio::test]
    async fn protocol_errors_are_counted() {
        let state = state();
        let (mut conn, _rx) = connect(&state);

        let reply = conn.on_text("{not json").await;
        assert!(matches!(reply, Some(ServerMessage::ProtocolError { .. })));

        let reply = conn
            .on_text(r#"{"action":"ChooseObjective","objective_id":1}"#)
            .await;
        assert!(matches!(reply, Some(ServerMessage::ProtocolError { .. })));
        assert_eq!(conn.protocol_errors, 2);
        assert!(!conn.too_many_errors());

        for _ in 0..3 {
            let _ = conn.on_text("[]").await;
        }
        assert!(conn.too_many_errors());
    }

    #[tokio::test]
    async fn second_join_is_a_protocol_error() {
        let state = state();
        let (mut conn, _rx) = connect(&state);
        let create = r#"{"action":"CreateGame","game_name":"g2","player_count":2,"player_name":"Ann"}"#;
        assert!(conn.on_text(create).await.is_none());
        let again = conn
            .on_text(r#"{"action":"JoinGame","game_name":"g2","player_name":"Ann2"}"#)
            .await;
        assert!(matches!(again, Some(ServerMessage::ProtocolError { .. })));
    }

    #[tokio::test]
    async fn rejected_join_keeps_the_connection_usable() {
        let state = state();
        let (mut conn, _rx) = connect(&state);
        let reply = conn
            .on_text(r#"{"action":"JoinGame","game_name":"missing","player_name":"Ann"}"#)
            .await;
        assert!(matches!(
            reply,
            Some(ServerMessage::Rejected { reason: RejectionReason::UnknownGame, .. })
        ));
        let create = r#"{"action":"CreateGame","game_name":"g3","player_count":2,"player_name":"Ann"}"#;
        assert!(conn.on_text(create).await.is_none());
    }
}
