//! One task per game.
//!
//! The session task owns the [`Game`] and is the only code that mutates it.
//! Connections talk to it through a [`GameHandle`], which queues
//! [`GameCommand`]s on a bounded channel. Commands are applied strictly in
//! arrival order; after each committed mutation the session publishes a
//! snapshot to every sink before it reads the next command.
//!
//! A session stops once its game has ended and the last connection has
//! left. The lobby prunes stopped sessions.

use std::collections::BTreeMap;
use std::sync::Arc;

use codex_types::{ConnectionId, GameView, Phase, RejectionReason, ServerMessage};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, info, warn};

use crate::broadcast::{self, BroadcastHandle};
use crate::error::{ActionError, SessionError};
use crate::game::{Game, JoinOutcome, PlayerAction};
use crate::notify::{LatestView, Notifier};

/// A request queued for a game session.
#[derive(Debug)]
pub enum GameCommand {
    /// Seat or reconnect a player and attach `connection` to the seat.
    Join {
        /// Requested player name.
        player_name: String,
        /// The joining connection.
        connection: ConnectionId,
        /// Where the connection's messages go.
        outbox: mpsc::Sender<ServerMessage>,
        /// Outcome of the join.
        reply: oneshot::Sender<Result<JoinOutcome, RejectionReason>>,
    },
    /// Apply an in-game action for the seat attached to `connection`.
    Act {
        /// The acting connection.
        connection: ConnectionId,
        /// What to do.
        action: PlayerAction,
        /// Outcome of the action.
        reply: oneshot::Sender<Result<(), RejectionReason>>,
    },
    /// Detach `connection`; its seat becomes disconnected.
    Leave {
        /// The leaving connection.
        connection: ConnectionId,
    },
}

/// Cloneable handle to a running game session.
#[derive(Debug, Clone)]
pub struct GameHandle {
    name: Arc<str>,
    commands: mpsc::Sender<GameCommand>,
    latest: watch::Receiver<Option<Arc<GameView>>>,
}

impl GameHandle {
    /// Name of the game.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The most recently published snapshot.
    pub fn latest(&self) -> Option<Arc<GameView>> {
        self.latest.borrow().clone()
    }

    /// Whether the session task has stopped.
    pub fn is_stopped(&self) -> bool {
        self.commands.is_closed()
    }

    /// Wait until the session task stops.
    pub async fn stopped(&self) {
        self.commands.closed().await;
    }

    /// Seat `player_name` and attach `connection` with its outbox.
    ///
    /// On success the outbox receives a `Welcome` followed by a snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Rejected`] if the game refuses the join and
    /// [`SessionError::Closed`] if the session has stopped.
    pub async fn join(
        &self,
        player_name: String,
        connection: ConnectionId,
        outbox: mpsc::Sender<ServerMessage>,
    ) -> Result<JoinOutcome, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(GameCommand::Join {
            player_name,
            connection,
            outbox,
            reply,
        })
        .await?;
        let outcome = rx.await.ok().ok_or_else(|| self.closed())?;
        outcome.map_err(SessionError::Rejected)
    }

    /// Apply `action` for the seat attached to `connection`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Rejected`] if the action breaks a rule and
    /// [`SessionError::Closed`] if the session has stopped.
    pub async fn act(
        &self,
        connection: ConnectionId,
        action: PlayerAction,
    ) -> Result<(), SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(GameCommand::Act {
            connection,
            action,
            reply,
        })
        .await?;
        let outcome = rx.await.ok().ok_or_else(|| self.closed())?;
        outcome.map_err(SessionError::Rejected)
    }

    /// Detach `connection`. Does nothing if the session has stopped.
    pub async fn leave(&self, connection: ConnectionId) {
        if self
            .commands
            .send(GameCommand::Leave { connection })
            .await
            .is_err()
        {
            debug!(game = %self.name, %connection, "leave after session stopped");
        }
    }

    async fn send(&self, command: GameCommand) -> Result<(), SessionError> {
        self.commands
            .send(command)
            .await
            .ok()
            .ok_or_else(|| self.closed())
    }

    fn closed(&self) -> SessionError {
        SessionError::Closed(String::from(self.name()))
    }
}

/// Start the session task for `game` with a command queue of `capacity`.
///
/// The initial snapshot is published before this returns, so
/// [`GameHandle::latest`] is never empty.
pub fn spawn_session(game: Game, capacity: usize) -> GameHandle {
    let (commands, rx) = mpsc::channel(capacity.max(1));
    let (latest, latest_rx) = LatestView::new();
    let (broadcaster, subscriptions) = broadcast::channel();

    let mut notifier = Notifier::new();
    notifier.register(Box::new(latest));
    notifier.register(Box::new(broadcaster));

    let name: Arc<str> = Arc::from(game.name());
    let mut session = Session {
        game,
        notifier,
        subscriptions,
        connections: BTreeMap::new(),
    };
    session.publish();

    tokio::spawn(async move { session.run(rx).await });
    info!(game = %name, "game session started");

    GameHandle {
        name,
        commands,
        latest: latest_rx,
    }
}

struct Session {
    game: Game,
    notifier: Notifier,
    subscriptions: BroadcastHandle,
    connections: BTreeMap<ConnectionId, u32>,
}

impl Session {
    async fn run(mut self, mut rx: mpsc::Receiver<GameCommand>) {
        while let Some(command) = rx.recv().await {
            self.handle(command);
            if self.finished() {
                break;
            }
        }
        info!(game = %self.game.name(), "game session stopped");
    }

    fn handle(&mut self, command: GameCommand) {
        match command {
            GameCommand::Join {
                player_name,
                connection,
                outbox,
                reply,
            } => {
                let outcome = self.join(&player_name, connection, outbox);
                if reply.send(outcome).is_err() {
                    debug!(%connection, "join reply receiver dropped");
                }
            }
            GameCommand::Act {
                connection,
                action,
                reply,
            } => {
                let outcome = self.act(connection, action);
                if reply.send(outcome).is_err() {
                    debug!(%connection, "action reply receiver dropped");
                }
            }
            GameCommand::Leave { connection } => self.leave(connection),
        }
    }

    fn join(
        &mut self,
        player_name: &str,
        connection: ConnectionId,
        outbox: mpsc::Sender<ServerMessage>,
    ) -> Result<JoinOutcome, RejectionReason> {
        if self.connections.contains_key(&connection) {
            return Err(RejectionReason::AlreadyDone);
        }
        let outcome = self.game.join(player_name).map_err(|err| self.report(&err))?;

        let welcome = ServerMessage::Welcome {
            game_name: String::from(self.game.name()),
            seat: outcome.seat,
            player_name: String::from(player_name.trim()),
            reconnected: outcome.reconnected,
        };
        if outbox.try_send(welcome).is_err() {
            warn!(%connection, "could not queue welcome");
        }
        self.connections.insert(connection, outcome.seat);
        self.subscriptions
            .subscribe(connection, outcome.seat, outbox);
        self.publish();
        Ok(outcome)
    }

    fn act(
        &mut self,
        connection: ConnectionId,
        action: PlayerAction,
    ) -> Result<(), RejectionReason> {
        let seat = *self
            .connections
            .get(&connection)
            .ok_or(RejectionReason::NotSeated)?;
        self.game
            .apply(seat, action)
            .map_err(|err| self.report(&err))?;
        self.publish();
        Ok(())
    }

    fn leave(&mut self, connection: ConnectionId) {
        self.subscriptions.unsubscribe(connection);
        let Some(seat) = self.connections.remove(&connection) else {
            return;
        };
        if self.game.disconnect(seat) {
            self.publish();
        }
    }

    /// Ended, with nobody left to read the standings.
    fn finished(&self) -> bool {
        self.game.phase() == Phase::Ended && self.connections.is_empty()
    }

    /// Log a failed command and reduce it to what the issuer is told.
    fn report(&self, err: &ActionError) -> RejectionReason {
        match err {
            ActionError::Rejected(reason) => {
                debug!(game = %self.game.name(), ?reason, "command rejected");
            }
            ActionError::Fault(fault) => {
                error!(game = %self.game.name(), error = %fault, "command failed");
            }
        }
        err.reason()
    }

    /// Notify every sink, disconnecting seats whose clients were dropped.
    fn publish(&mut self) {
        loop {
            let (view, delivery) = self.notifier.notify(&self.game);
            debug!(game = %self.game.name(), version = view.version, "snapshot published");
            let mut changed = false;
            for connection in delivery.dropped {
                if let Some(seat) = self.connections.remove(&connection) {
                    changed |= self.game.disconnect(seat);
                }
            }
            if !changed {
                break;
            }
        }
    }
}
