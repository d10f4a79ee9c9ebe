//! Immutable card and objective definitions.
//!
//! These are loaded once from the deck catalog and never mutated. Where a
//! card lies on a board, which face is up and which of its corners are
//! covered is tracked by the placement engine, not here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{CardKind, CornerPosition, Kingdom, Side, Symbol};
use crate::ids::{CardId, ObjectiveId};

// ---------------------------------------------------------------------------
// Corners and faces
// ---------------------------------------------------------------------------

/// What a face shows at one of its corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Corner {
    /// No corner at all. Nothing can be placed over it.
    Hidden,
    /// A visible corner with no symbol.
    Empty,
    /// A visible corner carrying a symbol.
    Symbol(Symbol),
}

impl Corner {
    /// Whether another card may be placed over this corner.
    pub const fn is_visible(self) -> bool {
        !matches!(self, Self::Hidden)
    }

    /// The symbol this corner contributes while uncovered.
    pub const fn symbol(self) -> Option<Symbol> {
        match self {
            Self::Symbol(symbol) => Some(symbol),
            Self::Hidden | Self::Empty => None,
        }
    }
}

/// The four corners of a face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Corners {
    /// Top-left corner.
    pub top_left: Corner,
    /// Top-right corner.
    pub top_right: Corner,
    /// Bottom-left corner.
    pub bottom_left: Corner,
    /// Bottom-right corner.
    pub bottom_right: Corner,
}

impl Corners {
    /// Four empty corners, as printed on every resource and gold back.
    pub const EMPTY: Self = Self {
        top_left: Corner::Empty,
        top_right: Corner::Empty,
        bottom_left: Corner::Empty,
        bottom_right: Corner::Empty,
    };

    /// The corner at `position`.
    pub const fn get(&self, position: CornerPosition) -> Corner {
        match position {
            CornerPosition::TopLeft => self.top_left,
            CornerPosition::TopRight => self.top_right,
            CornerPosition::BottomLeft => self.bottom_left,
            CornerPosition::BottomRight => self.bottom_right,
        }
    }

    /// Iterate `(position, corner)` pairs in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = (CornerPosition, Corner)> + '_ {
        CornerPosition::ALL.into_iter().map(|pos| (pos, self.get(pos)))
    }
}

/// How a face scores when it is placed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Scoring {
    /// A constant number of points (often zero).
    Fixed(u32),
    /// `multiplier` points per corner covered on the owner's board.
    CoveredCorners {
        /// Points per covered corner.
        multiplier: u32,
    },
    /// `multiplier` points per complete set of `kinds` held in the store.
    Symbols {
        /// Symbols counted; the lowest count among them is used.
        kinds: Vec<Symbol>,
        /// Points per set.
        multiplier: u32,
    },
}

impl Scoring {
    /// A face that never scores.
    pub const ZERO: Self = Self::Fixed(0);
}

/// One printable side of a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Face {
    /// The four corners.
    pub corners: Corners,
    /// Permanent symbols printed in the middle; never covered.
    pub center: Vec<Symbol>,
    /// Points awarded when this face is placed.
    pub scoring: Scoring,
    /// Minimum symbol counts the owner must hold to place this face.
    pub requires: BTreeMap<Symbol, u32>,
}

impl Face {
    /// The standard back of a resource or gold card of `kingdom`.
    pub fn plain_back(kingdom: Kingdom) -> Self {
        Self {
            corners: Corners::EMPTY,
            center: vec![kingdom.symbol()],
            scoring: Scoring::ZERO,
            requires: BTreeMap::new(),
        }
    }

    /// Every symbol this face contributes while fully uncovered.
    pub fn contributions(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.center
            .iter()
            .copied()
            .chain(self.corners.iter().filter_map(|(_, corner)| corner.symbol()))
    }
}

/// An immutable playable card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Card {
    /// Catalog number.
    pub id: CardId,
    /// Card family.
    pub kind: CardKind,
    /// Colour of the card; `None` for starters.
    pub kingdom: Option<Kingdom>,
    /// Front face.
    pub front: Face,
    /// Back face.
    pub back: Face,
}

impl Card {
    /// The face showing when played on `side`.
    pub const fn face(&self, side: Side) -> &Face {
        match side {
            Side::Front => &self.front,
            Side::Back => &self.back,
        }
    }
}

// ---------------------------------------------------------------------------
// Objectives
// ---------------------------------------------------------------------------

/// One cell of a card pattern, relative to the pattern's anchor card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PatternCell {
    /// Horizontal offset from the anchor.
    pub dx: i32,
    /// Vertical offset from the anchor.
    pub dy: i32,
    /// Kingdom the card in this cell must have.
    pub kingdom: Kingdom,
}

/// The condition an objective card rewards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum ObjectiveRule {
    /// Pays once when every count is reached.
    Threshold {
        /// Minimum count per symbol.
        requires: BTreeMap<Symbol, u32>,
    },
    /// Pays once per complete set held.
    Sets {
        /// Symbols making up one set.
        per_set: BTreeMap<Symbol, u32>,
    },
    /// Pays once per disjoint occurrence of the pattern on the board.
    Pattern {
        /// Cells of the pattern; the first is the anchor at `(0, 0)`.
        cells: Vec<PatternCell>,
    },
}

/// An immutable objective card.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ObjectiveCard {
    /// Catalog number.
    pub id: ObjectiveId,
    /// Points won per satisfaction of the rule.
    pub points: u32,
    /// What the objective rewards.
    pub rule: ObjectiveRule,
}
