//! Board coordinates and the immutable snapshot views sent to clients.
//!
//! Views are built fresh by the projector after every accepted mutation and
//! never changed afterwards. They hold plain data only, so any codec can
//! encode them and any number of readers can share one behind an `Arc`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::cards::{Card, ObjectiveCard};
use crate::enums::{CardKind, CornerPosition, Kingdom, Phase, Side, Symbol, TurnStage};

// ---------------------------------------------------------------------------
// Coordinate
// ---------------------------------------------------------------------------

/// A cell of a player's tableau.
///
/// The grid is sparse and unbounded. Cards touch only along diagonals, so
/// every card of a board lies on cells with the same `x + y` parity as the
/// origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Coordinate {
    /// Horizontal position, growing to the right.
    pub x: i32,
    /// Vertical position, growing upwards.
    pub y: i32,
}

impl Coordinate {
    /// Where every starter card goes.
    pub const ORIGIN: Self = Self { x: 0, y: 0 };

    /// Create a coordinate.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The coordinate shifted by `(dx, dy)`, or `None` on overflow.
    pub const fn offset(self, dx: i32, dy: i32) -> Option<Self> {
        match (self.x.checked_add(dx), self.y.checked_add(dy)) {
            (Some(x), Some(y)) => Some(Self { x, y }),
            _ => None,
        }
    }

    /// The diagonal neighbour in the direction of `position`.
    pub const fn neighbor(self, position: CornerPosition) -> Option<Self> {
        let (dx, dy) = position.offset();
        self.offset(dx, dy)
    }
}

impl core::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// One card as it lies on a board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlacedCardView {
    /// Cell the card occupies.
    pub coordinate: Coordinate,
    /// The card definition.
    pub card: Card,
    /// Which face is up.
    pub side: Side,
    /// Corners of this card that later placements have covered.
    pub covered: Vec<CornerPosition>,
    /// Zero for the starter, then one more for each later placement.
    pub order: u32,
    /// Points the face scored when it was placed.
    pub points: u32,
}

/// Snapshot of one player's tableau.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlayerBoardView {
    /// Placed cards in placement order.
    pub cards: Vec<PlacedCardView>,
    /// Visible symbol counts.
    pub resources: BTreeMap<Symbol, u32>,
    /// Corners covered anywhere on the board.
    pub covered_corners: u32,
    /// Points scored by placed faces so far.
    pub points: u32,
}

/// The back of a hand card: what every player at the table can see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CardBack {
    /// Resource or gold.
    pub kind: CardKind,
    /// Kingdom printed on the back.
    pub kingdom: Option<Kingdom>,
}

/// Snapshot of one seat.
///
/// Every client receives the same view. Fields marked *owner only* carry
/// information a renderer should show to the seat's owner alone; for
/// everyone else it draws [`Self::hand_backs`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlayerView {
    /// Player name, unique within the game.
    pub name: String,
    /// Seat index in join order.
    pub seat: u32,
    /// Whether a client is attached to this seat.
    pub connected: bool,
    /// Whether this seat holds the turn.
    pub is_current: bool,
    /// Cards in hand. Owner only.
    pub hand: Vec<Card>,
    /// Backs of the cards in hand, in hand order. Public.
    pub hand_backs: Vec<CardBack>,
    /// Starter card still waiting to be placed during setup. Owner only.
    pub pending_starter: Option<Card>,
    /// Candidate objectives offered during setup. Owner only.
    pub objective_choices: Vec<ObjectiveCard>,
    /// The chosen secret objective. Owner only.
    pub objective: Option<ObjectiveCard>,
    /// Whether the seat has finished both setup steps.
    pub setup_complete: bool,
    /// The player's tableau.
    pub board: PlayerBoardView,
}

/// Snapshot of the shared decks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GlobalBoardView {
    /// Kingdom printed on the back of the top resource card.
    pub resource_deck_top: Option<Kingdom>,
    /// Cards left in the resource pile.
    pub resource_deck_size: u32,
    /// Kingdom printed on the back of the top gold card.
    pub gold_deck_top: Option<Kingdom>,
    /// Cards left in the gold pile.
    pub gold_deck_size: u32,
    /// Face-up resource slots; `None` when a slot could not be refilled.
    pub visible_resource: Vec<Option<Card>>,
    /// Face-up gold slots.
    pub visible_gold: Vec<Option<Card>>,
}

/// Final result for one seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Standing {
    /// Seat index.
    pub seat: u32,
    /// Player name.
    pub name: String,
    /// Points from placed faces.
    pub board_points: u32,
    /// Points from the secret and public objectives.
    pub objective_points: u32,
    /// Sum of both.
    pub total: u32,
    /// How many objectives paid at least once (tie-breaker).
    pub objectives_met: u32,
    /// One for the winner; equal results share a rank.
    pub rank: u32,
}

/// Snapshot of a whole game, sent to every connected client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GameView {
    /// Game name.
    pub game_name: String,
    /// Number of committed mutations this snapshot reflects.
    pub version: u64,
    /// Lifecycle phase.
    pub phase: Phase,
    /// Declared number of seats.
    pub player_count: u32,
    /// Name of the player holding the turn.
    pub current_player: Option<String>,
    /// Seat holding the turn.
    pub current_seat: Option<u32>,
    /// Half of the turn, while turns are being taken.
    pub turn_stage: Option<TurnStage>,
    /// Whether the end of the game has been triggered.
    pub end_triggered: bool,
    /// Shared decks.
    pub global: GlobalBoardView,
    /// One view per seat, in seating order.
    pub players: Vec<PlayerView>,
    /// Objectives shared by everyone.
    pub public_objectives: Vec<ObjectiveCard>,
    /// Final standings, present once the game has ended.
    pub standings: Option<Vec<Standing>>,
}

impl GameView {
    /// The view of the seat called `name`.
    pub fn player(&self, name: &str) -> Option<&PlayerView> {
        self.players.iter().find(|p| p.name == name)
    }
}

/// Listing entry for a running game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GameSummary {
    /// Game name.
    pub game_name: String,
    /// Lifecycle phase.
    pub phase: Phase,
    /// Declared number of seats.
    pub player_count: u32,
    /// Names of the seated players, in join order.
    pub players: Vec<String>,
    /// Snapshot version.
    pub version: u64,
}

impl From<&GameView> for GameSummary {
    fn from(view: &GameView) -> Self {
        Self {
            game_name: view.game_name.clone(),
            phase: view.phase,
            player_count: view.player_count,
            players: view.players.iter().map(|p| p.name.clone()).collect(),
            version: view.version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbors_are_diagonal() {
        let origin = Coordinate::ORIGIN;
        assert_eq!(
            origin.neighbor(CornerPosition::TopRight),
            Some(Coordinate::new(1, 1))
        );
        assert_eq!(
            origin.neighbor(CornerPosition::BottomLeft),
            Some(Coordinate::new(-1, -1))
        );
    }

    #[test]
    fn offset_overflow_is_none() {
        let edge = Coordinate::new(i32::MAX, 0);
        assert_eq!(edge.neighbor(CornerPosition::TopRight), None);
    }

    #[test]
    fn coordinates_order_by_x_then_y() {
        let mut cells = vec![
            Coordinate::new(1, -1),
            Coordinate::new(-1, 1),
            Coordinate::new(1, -3),
        ];
        cells.sort();
        assert_eq!(
            cells,
            vec![
                Coordinate::new(-1, 1),
                Coordinate::new(1, -3),
                Coordinate::new(1, -1)
            ]
        );
    }
}
