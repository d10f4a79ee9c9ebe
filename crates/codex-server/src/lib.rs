//! Game server for the Codex tableau card game.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws`) where clients create or join a game
//!   and then send placements, draws and objective choices. Every committed
//!   change is pushed back as a full snapshot.
//! - **REST endpoints** for reading game summaries and the latest snapshot
//!   of a game.
//! - **Minimal HTML status page** (`GET /`).
//!
//! # Architecture
//!
//! Games run as sessions inside [`codex_core`]. Each `WebSocket` connection
//! is one task that forwards parsed messages to its game's session and
//! relays that game's snapshots back to the client. REST reads only touch
//! the latest published snapshot, so they never wait on a game.

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use startup::spawn_server;
pub use state::AppState;
