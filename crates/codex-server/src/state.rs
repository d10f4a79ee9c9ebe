//! Shared application state for the game server.
//!
//! [`AppState`] holds the [`Lobby`] of running games plus the per-connection
//! limits read from configuration. All game state lives inside the game
//! sessions; the server only routes messages to them and reads their latest
//! snapshots.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use codex_core::config::ServerSettings;
use codex_core::lobby::Lobby;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Debug)]
pub struct AppState {
    /// Every running game.
    pub lobby: Arc<Lobby>,
    /// Capacity of each connection's outbound queue.
    pub outbound_buffer: usize,
    /// Protocol errors tolerated before a connection is closed.
    pub max_protocol_errors: u32,
    /// When the server started.
    pub started_at: DateTime<Utc>,
}

impl AppState {
    /// Create the application state around `lobby`.
    pub fn new(lobby: Arc<Lobby>, settings: &ServerSettings) -> Self {
        Self {
            lobby,
            outbound_buffer: settings.outbound_buffer.max(1),
            max_protocol_errors: settings.max_protocol_errors,
            started_at: Utc::now(),
        }
    }

    /// Seconds since the server started.
    pub fn uptime_seconds(&self) -> i64 {
        Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }
}
