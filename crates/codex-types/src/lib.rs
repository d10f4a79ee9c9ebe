//! Shared type definitions for the Codex tableau card game.
//!
//! This crate is the single source of truth for all types that cross crate
//! or process boundaries. Types flow downstream to `TypeScript` via `ts-rs`
//! so browser renderers can consume snapshots without hand-written mirrors.
//!
//! # Modules
//!
//! - [`ids`] -- Connection UUIDs and catalog numbers
//! - [`enums`] -- Symbols, corner geometry, phases, rejection reasons
//! - [`cards`] -- Immutable card, face, scoring and objective definitions
//! - [`structs`] -- Board coordinates and snapshot views
//! - [`messages`] -- Inbound actions and outbound server pushes

pub mod cards;
pub mod enums;
pub mod ids;
pub mod messages;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use cards::{Card, Corner, Corners, Face, ObjectiveCard, ObjectiveRule, PatternCell, Scoring};
pub use enums::{
    ActionKind, CardKind, CornerPosition, DeckKind, DrawSource, Kingdom, Phase, RejectionReason,
    Side, Symbol, TurnStage,
};
pub use ids::{CardId, ConnectionId, ObjectiveId};
pub use messages::{ClientMessage, ServerMessage};
pub use structs::{
    CardBack, Coordinate, GameSummary, GameView, GlobalBoardView, PlacedCardView, PlayerBoardView,
    PlayerView, Standing,
};
