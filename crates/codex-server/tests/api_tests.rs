//! Integration tests for the REST endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server. Games are created through the lobby, the same
//! way a `WebSocket` client would create them.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use codex_core::config::CodexConfig;
use codex_core::lobby::Lobby;
use codex_rules::CardCatalog;
use codex_server::router::build_router;
use codex_server::state::AppState;
use codex_types::{ConnectionId, GameView, ServerMessage};
use serde_json::Value;
use tokio::sync::mpsc;
use tower::ServiceExt;

async fn make_test_state() -> (Arc<AppState>, mpsc::Receiver<ServerMessage>) {
    let config = CodexConfig::default();
    let catalog = Arc::new(CardCatalog::standard().unwrap());
    let lobby = Arc::new(Lobby::new(config.game, &config.server, catalog));

    let (tx, rx) = mpsc::channel(16);
    lobby
        .create("table-one", 2, String::from("Alice"), ConnectionId::new(), tx)
        .await
        .unwrap();

    (Arc::new(AppState::new(lobby, &config.server)), rx)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_index_returns_html() {
    let (state, _rx) = make_test_state().await;
    let app = build_router(state);

    let response = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(html.contains("Codex Server"));
    assert!(html.contains("table-one"));
}

#[tokio::test]
async fn test_list_games() {
    let (state, _rx) = make_test_state().await;
    let app = build_router(state);

    let response = app
        .oneshot(Request::get("/api/games").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["games"][0]["game_name"], "table-one");
    assert_eq!(json["games"][0]["phase"], "WaitingForPlayers");
    assert_eq!(json["games"][0]["players"][0], "Alice");
}

#[tokio::test]
async fn test_get_game_snapshot() {
    let (state, _rx) = make_test_state().await;
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::get("/api/games/table-one")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    let view: GameView = serde_json::from_value(json).unwrap();
    assert_eq!(view.game_name, "table-one");
    assert_eq!(view.player_count, 2);
    assert_eq!(view.version, 1);
    assert_eq!(view.players.len(), 1);
    assert_eq!(view.current_player.as_deref(), Some("Alice"));
}

#[tokio::test]
async fn test_get_game_not_found() {
    let (state, _rx) = make_test_state().await;
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::get("/api/games/nowhere")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], 404);
}

#[tokio::test]
async fn test_ws_route_requires_upgrade() {
    let (state, _rx) = make_test_state().await;
    let app = build_router(state);

    let response = app
        .oneshot(Request::get("/ws").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn test_index_escapes_game_names() {
    let (state, _rx) = make_test_state().await;
    let (tx, _eve_rx) = mpsc::channel(16);
    state
        .lobby
        .create(
            "<script>alert(1)</script>",
            2,
            String::from("Eve"),
            ConnectionId::new(),
            tx,
        )
        .await
        .unwrap();
    let app = build_router(state);

    let response = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let html = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(!html.contains("<script>"));
    assert!(html.contains("&lt;script&gt;alert(1)"));
    assert!(html.contains("href=\"/api/games/%3Cscript%3E"));
    assert!(html.contains("table-one"));
}
