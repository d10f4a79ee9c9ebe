//! Game state machine, snapshots and per-game sessions for the Codex server.
//!
//! Each game runs as a single tokio task that owns its [`Game`] and applies
//! commands one at a time. After every committed mutation the session
//! projects a [`GameView`] and pushes it to every connected client.
//!
//! # Modules
//!
//! - [`broadcast`] -- Snapshot fan-out to per-connection outboxes.
//! - [`config`] -- Configuration loading from `codex-config.yaml` into
//!   strongly-typed structs.
//! - [`error`] -- Action, session and internal fault types.
//! - [`game`] -- The phase and turn state machine.
//! - [`lobby`] -- Registry of running games.
//! - [`notify`] -- [`SnapshotSink`] trait and the post-commit notifier.
//! - [`player`] -- Per-seat state.
//! - [`session`] -- The per-game task and its [`GameHandle`].
//! - [`view`] -- Projection of a game into its snapshot.
//!
//! [`Game`]: game::Game
//! [`GameView`]: codex_types::GameView
//! [`SnapshotSink`]: notify::SnapshotSink
//! [`GameHandle`]: session::GameHandle

pub mod broadcast;
pub mod config;
pub mod error;
pub mod game;
pub mod lobby;
pub mod notify;
pub mod player;
pub mod session;
pub mod view;
