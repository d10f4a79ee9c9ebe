//! Enumeration types for the Codex tableau game.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Symbols
// ---------------------------------------------------------------------------

/// A resource or item kind that can appear on a corner or in a face centre.
///
/// The four kingdoms double as card colours; the three items only ever
/// appear on corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Symbol {
    /// Red kingdom.
    Fungi,
    /// Green kingdom.
    Plant,
    /// Blue kingdom.
    Animal,
    /// Purple kingdom.
    Insect,
    /// Item.
    Quill,
    /// Item.
    Inkwell,
    /// Item.
    Manuscript,
}

impl Symbol {
    /// Every symbol, kingdoms first.
    pub const ALL: [Self; 7] = [
        Self::Fungi,
        Self::Plant,
        Self::Animal,
        Self::Insect,
        Self::Quill,
        Self::Inkwell,
        Self::Manuscript,
    ];

    /// Whether this symbol is one of the four kingdoms.
    pub const fn is_kingdom(self) -> bool {
        matches!(self, Self::Fungi | Self::Plant | Self::Animal | Self::Insect)
    }
}

/// The kingdom (colour) of a resource or gold card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Kingdom {
    /// Red.
    Fungi,
    /// Green.
    Plant,
    /// Blue.
    Animal,
    /// Purple.
    Insect,
}

impl Kingdom {
    /// The resource symbol printed on the back of cards of this kingdom.
    pub const fn symbol(self) -> Symbol {
        match self {
            Self::Fungi => Symbol::Fungi,
            Self::Plant => Symbol::Plant,
            Self::Animal => Symbol::Animal,
            Self::Insect => Symbol::Insect,
        }
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

/// One of the four diagonal corners of a card face.
///
/// Cards sit on a diagonal lattice, so each corner position also names the
/// direction of the neighbouring cell it overlaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum CornerPosition {
    /// Up and to the left (`-x`, `+y`).
    TopLeft,
    /// Up and to the right (`+x`, `+y`).
    TopRight,
    /// Down and to the left (`-x`, `-y`).
    BottomLeft,
    /// Down and to the right (`+x`, `-y`).
    BottomRight,
}

impl CornerPosition {
    /// All four positions in catalog order.
    pub const ALL: [Self; 4] = [
        Self::TopLeft,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomRight,
    ];

    /// The corner of a neighbour that overlaps this one.
    pub const fn opposite(self) -> Self {
        match self {
            Self::TopLeft => Self::BottomRight,
            Self::TopRight => Self::BottomLeft,
            Self::BottomLeft => Self::TopRight,
            Self::BottomRight => Self::TopLeft,
        }
    }

    /// Grid offset `(dx, dy)` of the neighbour in this direction.
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::TopLeft => (-1, 1),
            Self::TopRight => (1, 1),
            Self::BottomLeft => (-1, -1),
            Self::BottomRight => (1, -1),
        }
    }

    /// Stable index in `0..4`, matching [`Self::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Self::TopLeft => 0,
            Self::TopRight => 1,
            Self::BottomLeft => 2,
            Self::BottomRight => 3,
        }
    }
}

/// Which face of a card is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Side {
    /// The printed front: scoring rule, requirement, mixed corners.
    Front,
    /// The plain back: kingdom centre symbol, empty corners.
    Back,
}

// ---------------------------------------------------------------------------
// Cards and decks
// ---------------------------------------------------------------------------

/// The family a playable card belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum CardKind {
    /// Dealt one per player and placed at the origin during setup.
    Starter,
    /// Cheap cards that mostly provide resources.
    Resource,
    /// Cards whose front requires resources and scores more.
    Gold,
}

/// One of the two shared draw piles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum DeckKind {
    /// The resource card pile.
    Resource,
    /// The gold card pile.
    Gold,
}

impl DeckKind {
    /// The other pile, used to refill an empty face-up slot.
    pub const fn other(self) -> Self {
        match self {
            Self::Resource => Self::Gold,
            Self::Gold => Self::Resource,
        }
    }
}

/// Where a player draws a card from at the end of their turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum DrawSource {
    /// The top of a draw pile (face down).
    Deck {
        /// Which pile.
        deck: DeckKind,
    },
    /// One of the face-up cards next to a pile.
    Visible {
        /// Which pile the slot belongs to.
        deck: DeckKind,
        /// Slot index, starting at zero.
        slot: u32,
    },
}

// ---------------------------------------------------------------------------
// Game flow
// ---------------------------------------------------------------------------

/// Lifecycle phase of a game instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Phase {
    /// Seats are still open.
    WaitingForPlayers,
    /// Players place starters and choose their secret objective.
    Setup,
    /// Normal turns.
    Playing,
    /// The end has been triggered; everyone gets one final turn.
    LastRound,
    /// Scores are final.
    Ended,
}

impl Phase {
    /// Whether turns are being taken in this phase.
    pub const fn is_turn_based(self) -> bool {
        matches!(self, Self::Playing | Self::LastRound)
    }
}

/// Which half of a turn the current player is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum TurnStage {
    /// Waiting for the turn's single placement.
    Place,
    /// Waiting for the turn's single draw.
    Draw,
}

/// The kind of an inbound action, echoed back with rejections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ActionKind {
    /// `CreateGame`.
    CreateGame,
    /// `JoinGame`.
    JoinGame,
    /// `PlaceCard`.
    PlaceCard,
    /// `DrawCard`.
    DrawCard,
    /// `ChooseObjective`.
    ChooseObjective,
}

/// Why an action was rejected. State is never changed by a rejected action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum RejectionReason {
    /// A card already sits at the target coordinate.
    Occupied,
    /// The target touches no card, or would cover a hidden or covered corner.
    NoLegalAdjacency,
    /// The face requires more resources than the player holds.
    InsufficientResources,
    /// The action is not valid in the current phase.
    WrongPhase,
    /// Another player holds the turn.
    NotYourTurn,
    /// The action does not match the current half of the turn.
    WrongStage,
    /// The hand index does not point at a card.
    InvalidHandIndex,
    /// The objective is not one of the player's candidates.
    UnknownObjective,
    /// This setup step has already been done.
    AlreadyDone,
    /// The requested draw source has no card.
    EmptySource,
    /// The starter card must go to the origin.
    StarterOffOrigin,
    /// No game exists with that name.
    UnknownGame,
    /// A game with that name already exists.
    GameExists,
    /// Every seat is taken.
    GameFull,
    /// A connected player already uses that name.
    NameTaken,
    /// The declared player count is outside the allowed range.
    InvalidPlayerCount,
    /// The game or player name is empty.
    InvalidName,
    /// The game has stopped accepting commands.
    GameClosed,
    /// The connection holds no seat in this game.
    NotSeated,
    /// The server failed while applying the action.
    Internal,
}

impl RejectionReason {
    /// Short human-readable description for clients and logs.
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Occupied => "that position is already occupied",
            Self::NoLegalAdjacency => "the card must cover at least one visible, uncovered corner",
            Self::InsufficientResources => "not enough resources to play this face",
            Self::WrongPhase => "that action is not allowed in this phase",
            Self::NotYourTurn => "it is not your turn",
            Self::WrongStage => "that action does not fit this part of the turn",
            Self::InvalidHandIndex => "no card at that hand index",
            Self::UnknownObjective => "that objective is not one of your choices",
            Self::AlreadyDone => "you already did that",
            Self::EmptySource => "nothing to draw there",
            Self::StarterOffOrigin => "the starter card goes at (0, 0)",
            Self::UnknownGame => "no game with that name",
            Self::GameExists => "a game with that name already exists",
            Self::GameFull => "the game is full",
            Self::NameTaken => "that player name is taken",
            Self::InvalidPlayerCount => "unsupported player count",
            Self::InvalidName => "names must not be empty",
            Self::GameClosed => "the game is no longer running",
            Self::NotSeated => "join a game before acting",
            Self::Internal => "internal server error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposite_is_an_involution() {
        for pos in CornerPosition::ALL {
            assert_eq!(pos.opposite().opposite(), pos);
            let (dx, dy) = pos.offset();
            let (ox, oy) = pos.opposite().offset();
            assert_eq!((dx + ox, dy + oy), (0, 0));
        }
    }

    #[test]
    fn corner_indices_match_all() {
        for (i, pos) in CornerPosition::ALL.iter().enumerate() {
            assert_eq!(pos.index(), i);
        }
    }

    #[test]
    fn kingdom_symbols_are_kingdoms() {
        for kingdom in [Kingdom::Fungi, Kingdom::Plant, Kingdom::Animal, Kingdom::Insect] {
            assert!(kingdom.symbol().is_kingdom());
        }
        assert!(!Symbol::Quill.is_kingdom());
    }

    #[test]
    fn draw_source_round_trips_through_json() {
        let source = DrawSource::Visible {
            deck: DeckKind::Gold,
            slot: 1,
        };
        let json = serde_json::to_string(&source).unwrap_or_default();
        let back: Result<DrawSource, _> = serde_json::from_str(&json);
        assert_eq!(back.ok(), Some(source));
    }
}
