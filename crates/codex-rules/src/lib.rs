//! Rules engine for the Codex tableau card game.
//!
//! Everything here is synchronous and deterministic. The crate knows nothing
//! about players, turns or connections; it answers "is this placement
//! legal", "what does this board hold" and "what is it worth".
//!
//! # Modules
//!
//! - [`board`] -- [`PlayerBoard`]: placement validation and atomic commits
//! - [`catalog`] -- [`CardCatalog`]: the embedded standard deck
//! - [`deck`] -- Shuffled draw piles and face-up slots
//! - [`error`] -- Catalog and bookkeeping errors
//! - [`objective`] -- Objective evaluation against a finished board
//! - [`scoring`] -- Face points at placement time
//! - [`store`] -- [`ResourceStore`]: checked symbol counts

pub mod board;
pub mod catalog;
pub mod deck;
pub mod error;
pub mod objective;
pub mod scoring;
pub mod store;

pub use board::{Cover, Placement, PlacementOutcome, PlayerBoard};
pub use catalog::CardCatalog;
pub use deck::{DrawPile, SharedDecks};
pub use error::{PlaceError, RulesError};
pub use objective::{evaluate, times_met};
pub use scoring::face_points;
pub use store::ResourceStore;
