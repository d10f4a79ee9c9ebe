//! Axum router construction for the game server.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for browser clients on other origins.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /ws` -- `WebSocket` game connection
/// - `GET /api/games` -- list games
/// - `GET /api/games/{name}` -- latest snapshot of one game
///
/// CORS is configured to allow any origin.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws", get(ws::ws_game))
        // REST API
        .route("/api/games", get(handlers::list_games))
        .route("/api/games/{name}", get(handlers::get_game))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
