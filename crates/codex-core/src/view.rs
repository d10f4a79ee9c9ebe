//! Projection of a [`Game`] into the serializable [`GameView`].
//!
//! The projection is a pure function of the game: two calls on the same
//! state give equal views, which is what lets a reconnecting client resync
//! from one snapshot.

use std::sync::Arc;

use codex_rules::{PlayerBoard, SharedDecks};
use codex_types::{
    Card, CardBack, DeckKind, GameView, GlobalBoardView, PlacedCardView, PlayerBoardView, PlayerView,
};

use crate::game::Game;
use crate::player::Player;

/// Build the full snapshot of `game`.
pub fn project(game: &Game) -> GameView {
    let current_seat = game.current_seat();
    let current_player = current_seat
        .and_then(|seat| game.players().iter().find(|p| p.seat() == seat))
        .map(|p| String::from(p.name()));

    GameView {
        game_name: String::from(game.name()),
        version: game.version(),
        phase: game.phase(),
        player_count: game.player_count(),
        current_player,
        current_seat,
        turn_stage: game.turn_stage(),
        end_triggered: game.end_triggered(),
        global: project_decks(game.decks()),
        players: game
            .players()
            .iter()
            .map(|p| project_player(p, current_seat))
            .collect(),
        public_objectives: game.public_objectives().to_vec(),
        standings: game.standings().map(<[_]>::to_vec),
    }
}

fn project_player(player: &Player, current_seat: Option<u32>) -> PlayerView {
    PlayerView {
        name: String::from(player.name()),
        seat: player.seat(),
        connected: player.is_connected(),
        is_current: current_seat == Some(player.seat()),
        hand: player.hand().iter().map(owned).collect(),
        hand_backs: player
            .hand()
            .iter()
            .map(|card| CardBack {
                kind: card.kind,
                kingdom: card.kingdom,
            })
            .collect(),
        pending_starter: player.pending_starter().map(owned),
        objective_choices: player.objective_choices().to_vec(),
        objective: player.objective().cloned(),
        setup_complete: player.setup_complete(),
        board: project_board(player.board()),
    }
}

/// Snapshot of one tableau, cards in placement order.
pub fn project_board(board: &PlayerBoard) -> PlayerBoardView {
    let mut cards: Vec<PlacedCardView> = board
        .iter()
        .map(|(coordinate, placement)| PlacedCardView {
            coordinate,
            card: owned(placement.card()),
            side: placement.side(),
            covered: placement.covered_positions().collect(),
            order: placement.order(),
            points: placement.points(),
        })
        .collect();
    cards.sort_by_key(|c| c.order);

    PlayerBoardView {
        cards,
        resources: board.resources().to_map(),
        covered_corners: board.covered_corners(),
        points: board.points(),
    }
}

fn project_decks(decks: &SharedDecks) -> GlobalBoardView {
    let size = |deck| u32::try_from(decks.pile(deck).len()).unwrap_or(u32::MAX);
    let slots = |deck| -> Vec<Option<Card>> {
        decks
            .visible(deck)
            .iter()
            .map(|slot| slot.as_deref().cloned())
            .collect()
    };
    GlobalBoardView {
        resource_deck_top: decks.top_kingdom(DeckKind::Resource),
        resource_deck_size: size(DeckKind::Resource),
        gold_deck_top: decks.top_kingdom(DeckKind::Gold),
        gold_deck_size: size(DeckKind::Gold),
        visible_resource: slots(DeckKind::Resource),
        visible_gold: slots(DeckKind::Gold),
    }
}

fn owned(card: &Arc<Card>) -> Card {
    Card::clone(card)
}
