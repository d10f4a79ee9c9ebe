//! REST endpoint handlers.
//!
//! Every handler reads the latest published snapshot of a game. Nothing
//! here can change game state; that only happens over the `WebSocket`.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/games` | Summaries of all games |
//! | `GET` | `/api/games/{name}` | Latest snapshot of one game |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse};
use codex_types::GameSummary;
use minijinja::{Environment, context};

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Status page template. The `.html` name turns on HTML auto-escaping, so
/// client-chosen game names render as text.
const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");

/// Serve a minimal HTML page listing the running games.
pub async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, ApiError> {
    let games = state.lobby.summaries().await;
    let page = render_index(&games, state.uptime_seconds())?;
    Ok(Html(page))
}

fn render_index(games: &[GameSummary], uptime: i64) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template("index.html", INDEX_TEMPLATE)?;
    env.get_template("index.html")?
        .render(context! { games => games, uptime => uptime })
}

// ---------------------------------------------------------------------------
// GET /api/games -- list games
// ---------------------------------------------------------------------------

/// List every game with its phase and seated players, ordered by name.
pub async fn list_games(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let games = state.lobby.summaries().await;
    Json(serde_json::json!({
        "count": games.len(),
        "games": games,
    }))
}

// ---------------------------------------------------------------------------
// GET /api/games/{name} -- latest snapshot
// ---------------------------------------------------------------------------

/// Return the latest snapshot of one game.
pub async fn get_game(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state
        .lobby
        .get(&name)
        .await
        .and_then(|handle| handle.latest())
        .ok_or_else(|| ApiError::NotFound(format!("game {name}")))?;
    Ok(Json(serde_json::to_value(view.as_ref())?))
}
