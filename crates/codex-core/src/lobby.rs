//! Registry of running games.
//!
//! Finished games stop their own sessions; every lookup first prunes the
//! entries whose session has stopped.

use std::collections::BTreeMap;
use std::sync::Arc;

use codex_rules::CardCatalog;
use codex_types::{ConnectionId, GameSummary, RejectionReason, ServerMessage};
use tokio::sync::{Mutex, mpsc};
use tracing::info;

use crate::config::{GameConfig, ServerSettings};
use crate::error::SessionError;
use crate::game::{Game, JoinOutcome};
use crate::session::{GameHandle, spawn_session};

/// All games hosted by this process, keyed by name.
#[derive(Debug)]
pub struct Lobby {
    config: GameConfig,
    action_queue_capacity: usize,
    catalog: Arc<CardCatalog>,
    inner: Mutex<LobbyInner>,
}

#[derive(Debug, Default)]
struct LobbyInner {
    games: BTreeMap<String, GameHandle>,
    created: u64,
}

impl LobbyInner {
    fn prune(&mut self) {
        self.games.retain(|name, handle| {
            let stopped = handle.is_stopped();
            if stopped {
                info!(game = %name, "finished game removed");
            }
            !stopped
        });
    }
}

impl Lobby {
    /// An empty lobby whose games use `config` and `catalog`.
    pub fn new(config: GameConfig, server: &ServerSettings, catalog: Arc<CardCatalog>) -> Self {
        Self {
            config,
            action_queue_capacity: server.action_queue_capacity,
            catalog,
            inner: Mutex::new(LobbyInner::default()),
        }
    }

    /// Open a game and seat its creator.
    ///
    /// # Errors
    ///
    /// Rejects with [`RejectionReason::InvalidName`] for an empty game or
    /// player name, [`RejectionReason::GameExists`] for a taken game name
    /// and [`RejectionReason::InvalidPlayerCount`] for a bad seat count.
    pub async fn create(
        &self,
        game_name: &str,
        player_count: u32,
        player_name: String,
        connection: ConnectionId,
        outbox: mpsc::Sender<ServerMessage>,
    ) -> Result<(GameHandle, JoinOutcome), SessionError> {
        let game_name = game_name.trim();
        if game_name.is_empty() || player_name.trim().is_empty() {
            return Err(RejectionReason::InvalidName.into());
        }

        let handle = {
            let mut inner = self.inner.lock().await;
            inner.prune();
            if inner.games.contains_key(game_name) {
                return Err(RejectionReason::GameExists.into());
            }
            let seed = self.config.seed.wrapping_add(inner.created);
            let game = Game::new(
                game_name,
                player_count,
                self.config.clone(),
                Arc::clone(&self.catalog),
                seed,
            )?;
            inner.created = inner.created.wrapping_add(1);
            let handle = spawn_session(game, self.action_queue_capacity);
            inner
                .games
                .insert(String::from(game_name), handle.clone());
            info!(game = game_name, player_count, seed, "game created");
            handle
        };

        let outcome = handle.join(player_name, connection, outbox).await?;
        Ok((handle, outcome))
    }

    /// Seat a player in an existing game, or reconnect them.
    ///
    /// # Errors
    ///
    /// Rejects with [`RejectionReason::UnknownGame`] if no game has that
    /// name, otherwise with whatever the game rejects the join for.
    pub async fn join(
        &self,
        game_name: &str,
        player_name: String,
        connection: ConnectionId,
        outbox: mpsc::Sender<ServerMessage>,
    ) -> Result<(GameHandle, JoinOutcome), SessionError> {
        let handle = self
            .get(game_name.trim())
            .await
            .ok_or(RejectionReason::UnknownGame)?;
        let outcome = handle.join(player_name, connection, outbox).await?;
        Ok((handle, outcome))
    }

    /// Handle of the game called `name`.
    pub async fn get(&self, name: &str) -> Option<GameHandle> {
        let mut inner = self.inner.lock().await;
        inner.prune();
        inner.games.get(name).cloned()
    }

    /// One summary per game, ordered by name.
    pub async fn summaries(&self) -> Vec<GameSummary> {
        let handles: Vec<GameHandle> = {
            let mut inner = self.inner.lock().await;
            inner.prune();
            inner.games.values().cloned().collect()
        };
        handles
            .iter()
            .filter_map(GameHandle::latest)
            .map(|view| GameSummary::from(view.as_ref()))
            .collect()
    }
}
