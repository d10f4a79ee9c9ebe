//! A player's tableau and the placement rules that govern it.
//!
//! The [`PlayerBoard`] owns every placement, the resource store derived from
//! them, the running count of covered corners and the running face-point
//! total. Validation never mutates; a successful placement is committed in a
//! single step after every fallible computation has already succeeded.
//!
//! # Geometry
//!
//! Cards sit on a diagonal lattice. A card at `p` touches the cards at
//! `p.neighbor(d)` for each [`CornerPosition`] `d`, and when placed over such
//! a neighbour it covers the neighbour's `d.opposite()` corner.

use std::collections::BTreeMap;
use std::sync::Arc;

use codex_types::{
    Card, Coordinate, CornerPosition, Face, Kingdom, RejectionReason, Side, Symbol,
};
use tracing::debug;

use crate::error::{PlaceError, RulesError};
use crate::scoring::face_points;
use crate::store::ResourceStore;

// ---------------------------------------------------------------------------
// Placement
// ---------------------------------------------------------------------------

/// A card lying on a board.
#[derive(Debug, Clone)]
pub struct Placement {
    card: Arc<Card>,
    side: Side,
    covered: [bool; 4],
    order: u32,
    points: u32,
}

impl Placement {
    /// The placed card.
    pub const fn card(&self) -> &Arc<Card> {
        &self.card
    }

    /// Which face is up.
    pub const fn side(&self) -> Side {
        self.side
    }

    /// The face that is up.
    pub fn face(&self) -> &Face {
        self.card.face(self.side)
    }

    /// The card's kingdom, if it has one.
    pub fn kingdom(&self) -> Option<Kingdom> {
        self.card.kingdom
    }

    /// Whether the corner at `position` has been covered.
    pub fn is_covered(&self, position: CornerPosition) -> bool {
        self.covered.get(position.index()).copied().unwrap_or(false)
    }

    /// Covered corner positions in catalog order.
    pub fn covered_positions(&self) -> impl Iterator<Item = CornerPosition> + '_ {
        CornerPosition::ALL
            .into_iter()
            .filter(|&pos| self.is_covered(pos))
    }

    /// Zero for the first card on the board, one more for each later card.
    pub const fn order(&self) -> u32 {
        self.order
    }

    /// Points the face scored when it was placed.
    pub const fn points(&self) -> u32 {
        self.points
    }

    fn cover(&mut self, position: CornerPosition) {
        if let Some(flag) = self.covered.get_mut(position.index()) {
            *flag = true;
        }
    }
}

/// A corner that a placement covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cover {
    /// The neighbour whose corner gets covered.
    pub at: Coordinate,
    /// Which of the neighbour's corners.
    pub corner: CornerPosition,
}

/// What a committed placement did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementOutcome {
    /// Where the card went.
    pub coordinate: Coordinate,
    /// Placement order on the board.
    pub order: u32,
    /// Corners newly covered by this card.
    pub covered: Vec<Cover>,
    /// Points the face scored.
    pub points: u32,
}

// ---------------------------------------------------------------------------
// PlayerBoard
// ---------------------------------------------------------------------------

/// One player's tableau.
#[derive(Debug, Clone, Default)]
pub struct PlayerBoard {
    cells: BTreeMap<Coordinate, Placement>,
    store: ResourceStore,
    covered_corners: u32,
    points: u32,
}

impl PlayerBoard {
    /// An empty board.
    pub const fn new() -> Self {
        Self {
            cells: BTreeMap::new(),
            store: ResourceStore::new(),
            covered_corners: 0,
            points: 0,
        }
    }

    /// Place the starter card at the origin.
    ///
    /// # Errors
    ///
    /// Returns [`RejectionReason::AlreadyDone`] if the board already holds a
    /// card, or a [`RulesError`] if the store overflows.
    pub fn place_starter(
        &mut self,
        card: Arc<Card>,
        side: Side,
    ) -> Result<PlacementOutcome, PlaceError> {
        if !self.cells.is_empty() {
            return Err(RejectionReason::AlreadyDone.into());
        }
        self.commit(card, side, Coordinate::ORIGIN, Vec::new())
    }

    /// Check whether `card` could be placed with `side` up at `coordinate`.
    ///
    /// On success returns the neighbour corners the placement would cover.
    ///
    /// # Errors
    ///
    /// Checks run in order and the first failure is returned:
    /// [`RejectionReason::Occupied`], then
    /// [`RejectionReason::NoLegalAdjacency`] (empty board, no neighbour, or
    /// a neighbour corner that is hidden or already covered), then
    /// [`RejectionReason::InsufficientResources`].
    pub fn validate(
        &self,
        card: &Card,
        side: Side,
        coordinate: Coordinate,
    ) -> Result<Vec<Cover>, RejectionReason> {
        if self.cells.contains_key(&coordinate) {
            return Err(RejectionReason::Occupied);
        }

        let mut covers = Vec::new();
        for direction in CornerPosition::ALL {
            let Some(at) = coordinate.neighbor(direction) else {
                continue;
            };
            let Some(neighbor) = self.cells.get(&at) else {
                continue;
            };
            let corner = direction.opposite();
            if !neighbor.face().corners.get(corner).is_visible() || neighbor.is_covered(corner) {
                return Err(RejectionReason::NoLegalAdjacency);
            }
            covers.push(Cover { at, corner });
        }
        if covers.is_empty() {
            return Err(RejectionReason::NoLegalAdjacency);
        }

        if !self.store.satisfies(&card.face(side).requires) {
            return Err(RejectionReason::InsufficientResources);
        }
        Ok(covers)
    }

    /// Validate and then place `card` with `side` up at `coordinate`.
    ///
    /// # Errors
    ///
    /// Returns [`PlaceError::Rejected`] for any rule violation (see
    /// [`Self::validate`]) and [`PlaceError::Rules`] if bookkeeping fails.
    /// The board is unchanged on every error.
    pub fn place(
        &mut self,
        card: Arc<Card>,
        side: Side,
        coordinate: Coordinate,
    ) -> Result<PlacementOutcome, PlaceError> {
        let covers = self.validate(&card, side, coordinate)?;
        self.commit(card, side, coordinate, covers)
    }

    fn commit(
        &mut self,
        card: Arc<Card>,
        side: Side,
        coordinate: Coordinate,
        covers: Vec<Cover>,
    ) -> Result<PlacementOutcome, PlaceError> {
        let face = card.face(side);

        let mut store = self.store.clone();
        for symbol in face.contributions() {
            store.add(symbol, 1)?;
        }
        for cover in &covers {
            let symbol = self
                .cells
                .get(&cover.at)
                .and_then(|p| p.face().corners.get(cover.corner).symbol());
            if let Some(symbol) = symbol {
                store.remove(symbol, 1)?;
            }
        }

        let covered_corners = u32::try_from(covers.len())
            .ok()
            .and_then(|n| self.covered_corners.checked_add(n))
            .ok_or_else(|| overflow("covered corners"))?;
        let order = u32::try_from(self.cells.len())
            .ok()
            .ok_or_else(|| overflow("placement order"))?;
        let points = face_points(face, coordinate, covered_corners, &store);
        let total = self
            .points
            .checked_add(points)
            .ok_or_else(|| overflow("board points"))?;

        for cover in &covers {
            if let Some(neighbor) = self.cells.get_mut(&cover.at) {
                neighbor.cover(cover.corner);
            }
        }
        self.cells.insert(
            coordinate,
            Placement {
                card,
                side,
                covered: [false; 4],
                order,
                points,
            },
        );
        self.store = store;
        self.covered_corners = covered_corners;
        self.points = total;

        debug!(%coordinate, order, points, covered = covers.len(), "card placed");
        Ok(PlacementOutcome {
            coordinate,
            order,
            covered: covers,
            points,
        })
    }

    /// Corners covered anywhere on the board.
    pub const fn covered_corners(&self) -> u32 {
        self.covered_corners
    }

    /// Visible symbol counts.
    pub const fn resources(&self) -> &ResourceStore {
        &self.store
    }

    /// Visible count of one symbol.
    pub fn count(&self, symbol: Symbol) -> u32 {
        self.store.count(symbol)
    }

    /// Running total of face points.
    pub const fn points(&self) -> u32 {
        self.points
    }

    /// The placement at `coordinate`.
    pub fn get(&self, coordinate: Coordinate) -> Option<&Placement> {
        self.cells.get(&coordinate)
    }

    /// Placements in coordinate order.
    pub fn iter(&self) -> impl Iterator<Item = (Coordinate, &Placement)> + '_ {
        self.cells.iter().map(|(&c, p)| (c, p))
    }

    /// Number of placed cards.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether no card has been placed yet.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Rebuild the store from the placements alone.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::ArithmeticOverflow`] if a count overflows.
    pub fn recompute_resources(&self) -> Result<ResourceStore, RulesError> {
        let mut store = ResourceStore::new();
        for placement in self.cells.values() {
            let face = placement.face();
            for &symbol in &face.center {
                store.add(symbol, 1)?;
            }
            for (position, corner) in face.corners.iter() {
                if placement.is_covered(position) {
                    continue;
                }
                if let Some(symbol) = corner.symbol() {
                    store.add(symbol, 1)?;
                }
            }
        }
        Ok(store)
    }
}

fn overflow(context: &str) -> RulesError {
    RulesError::ArithmeticOverflow {
        context: String::from(context),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use codex_types::{CardId, CardKind, Corner, Corners, Scoring};

    fn starter() -> Arc<Card> {
        Arc::new(Card {
            id: CardId(81),
            kind: CardKind::Starter,
            kingdom: None,
            front: Face {
                corners: Corners {
                    top_left: Corner::Empty,
                    top_right: Corner::Symbol(Symbol::Plant),
                    bottom_left: Corner::Symbol(Symbol::Insect),
                    bottom_right: Corner::Hidden,
                },
                center: vec![Symbol::Insect],
                scoring: Scoring::ZERO,
                requires: BTreeMap::new(),
            },
            back: Face {
                corners: Corners {
                    top_left: Corner::Symbol(Symbol::Fungi),
                    top_right: Corner::Symbol(Symbol::Plant),
                    bottom_left: Corner::Symbol(Symbol::Insect),
                    bottom_right: Corner::Symbol(Symbol::Animal),
                },
                center: Vec::new(),
                scoring: Scoring::ZERO,
                requires: BTreeMap::new(),
            },
        })
    }

    fn resource(id: u16, kingdom: Kingdom, corners: Corners, points: u32) -> Arc<Card> {
        Arc::new(Card {
            id: CardId(id),
            kind: CardKind::Resource,
            kingdom: Some(kingdom),
            front: Face {
                corners,
                center: Vec::new(),
                scoring: Scoring::Fixed(points),
                requires: BTreeMap::new(),
            },
            back: Face::plain_back(kingdom),
        })
    }

    fn gold(id: u16, scoring: Scoring, requires: &[(Symbol, u32)]) -> Arc<Card> {
        Arc::new(Card {
            id: CardId(id),
            kind: CardKind::Gold,
            kingdom: Some(Kingdom::Plant),
            front: Face {
                corners: Corners {
                    top_left: Corner::Empty,
                    top_right: Corner::Hidden,
                    bottom_left: Corner::Empty,
                    bottom_right: Corner::Hidden,
                },
                center: Vec::new(),
                scoring,
                requires: requires.iter().copied().collect(),
            },
            back: Face::plain_back(Kingdom::Plant),
        })
    }

    fn fungi_card(id: u16) -> Arc<Card> {
        resource(
            id,
            Kingdom::Fungi,
            Corners {
                top_left: Corner::Symbol(Symbol::Fungi),
                top_right: Corner::Empty,
                bottom_left: Corner::Symbol(Symbol::Fungi),
                bottom_right: Corner::Hidden,
            },
            0,
        )
    }

    fn board_with_starter(side: Side) -> PlayerBoard {
        let mut board = PlayerBoard::new();
        assert!(board.place_starter(starter(), side).is_ok());
        board
    }

    fn assert_store_consistent(board: &PlayerBoard) {
        let rebuilt = board.recompute_resources();
        assert!(rebuilt.is_ok());
        assert_eq!(rebuilt.ok().as_ref(), Some(board.resources()));
    }

    #[test]
    fn starter_contributes_its_visible_symbols() {
        let board = board_with_starter(Side::Front);
        assert_eq!(board.len(), 1);
        assert!(board.get(Coordinate::ORIGIN).is_some());
        assert_eq!(board.count(Symbol::Insect), 2);
        assert_eq!(board.count(Symbol::Plant), 1);
        assert_eq!(board.count(Symbol::Fungi), 0);
        assert_store_consistent(&board);
    }

    #[test]
    fn second_starter_is_rejected() {
        let mut board = board_with_starter(Side::Back);
        let result = board.place_starter(starter(), Side::Front);
        assert!(matches!(
            result,
            Err(PlaceError::Rejected(RejectionReason::AlreadyDone))
        ));
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn occupied_cell_is_rejected_without_change() {
        let mut board = board_with_starter(Side::Front);
        let before = board.resources().clone();
        let result = board.place(fungi_card(1), Side::Back, Coordinate::ORIGIN);
        assert!(matches!(
            result,
            Err(PlaceError::Rejected(RejectionReason::Occupied))
        ));
        assert_eq!(board.len(), 1);
        assert_eq!(board.resources(), &before);
        assert_eq!(board.covered_corners(), 0);
    }

    #[test]
    fn covering_an_empty_corner_counts_without_removing_symbols() {
        let mut board = board_with_starter(Side::Front);
        let before = board.resources().clone();
        // Starter's top-left corner is empty; its neighbour there is (-1, 1).
        let outcome = board.place(fungi_card(1), Side::Back, Coordinate::new(-1, 1));
        assert!(outcome.is_ok());
        assert_eq!(board.covered_corners(), 1);
        let origin = board.get(Coordinate::ORIGIN);
        assert_eq!(
            origin.map(|p| p.is_covered(CornerPosition::TopLeft)),
            Some(true)
        );
        // Only the back's centre symbol was added.
        assert_eq!(board.count(Symbol::Fungi), 1);
        assert_eq!(board.count(Symbol::Plant), before.count(Symbol::Plant));
        assert_eq!(board.count(Symbol::Insect), before.count(Symbol::Insect));
        assert_store_consistent(&board);
    }

    #[test]
    fn covering_a_symbol_corner_removes_it() {
        let mut board = board_with_starter(Side::Front);
        // Starter's top-right corner shows a plant.
        let result = board.place(fungi_card(1), Side::Front, Coordinate::new(1, 1));
        assert!(result.is_ok());
        assert_eq!(board.covered_corners(), 1);
        assert_eq!(board.count(Symbol::Plant), 0);
        assert_eq!(board.count(Symbol::Fungi), 2);
        assert_store_consistent(&board);
    }

    #[test]
    fn hidden_corner_blocks_placement() {
        let mut board = board_with_starter(Side::Front);
        // Starter's bottom-right corner is hidden.
        let result = board.place(fungi_card(1), Side::Back, Coordinate::new(1, -1));
        assert!(matches!(
            result,
            Err(PlaceError::Rejected(RejectionReason::NoLegalAdjacency))
        ));
        assert_eq!(board.len(), 1);
    }

    #[test]
    fn chained_placements_keep_store_consistent() {
        let mut board = board_with_starter(Side::Back);
        assert!(
            board
                .place(fungi_card(1), Side::Back, Coordinate::new(1, 1))
                .is_ok()
        );
        // (1, 1) is taken, so the starter's top-right corner is unreachable;
        // a card at (2, 0) covers the bottom-right corner of (1, 1).
        assert!(
            board
                .place(fungi_card(2), Side::Back, Coordinate::new(2, 0))
                .is_ok()
        );
        assert_eq!(board.covered_corners(), 2);
        assert_store_consistent(&board);
    }

    #[test]
    fn isolated_cell_is_rejected() {
        let mut board = board_with_starter(Side::Back);
        let result = board.place(fungi_card(1), Side::Back, Coordinate::new(4, 4));
        assert!(matches!(
            result,
            Err(PlaceError::Rejected(RejectionReason::NoLegalAdjacency))
        ));
        let empty = PlayerBoard::new();
        assert_eq!(
            empty.validate(&fungi_card(1), Side::Back, Coordinate::ORIGIN),
            Err(RejectionReason::NoLegalAdjacency)
        );
    }

    #[test]
    fn occupied_is_checked_before_adjacency_and_resources() {
        let board = board_with_starter(Side::Back);
        let expensive = gold(41, Scoring::Fixed(5), &[(Symbol::Plant, 5)]);
        assert_eq!(
            board.validate(&expensive, Side::Front, Coordinate::ORIGIN),
            Err(RejectionReason::Occupied)
        );
        assert_eq!(
            board.validate(&expensive, Side::Front, Coordinate::new(3, 3)),
            Err(RejectionReason::NoLegalAdjacency)
        );
        assert_eq!(
            board.validate(&expensive, Side::Front, Coordinate::new(1, 1)),
            Err(RejectionReason::InsufficientResources)
        );
        // Backs never require anything.
        assert!(
            board
                .validate(&expensive, Side::Back, Coordinate::new(1, 1))
                .is_ok()
        );
    }

    #[test]
    fn gold_scores_against_the_board_after_placement() {
        let mut board = board_with_starter(Side::Back);
        assert!(
            board
                .place(fungi_card(1), Side::Back, Coordinate::new(-1, 1))
                .is_ok()
        );
        let covering = gold(
            42,
            Scoring::CoveredCorners { multiplier: 2 },
            &[(Symbol::Fungi, 1)],
        );
        // (1, 1) covers the starter's top-right corner only: two covered in total.
        let outcome = board.place(covering, Side::Front, Coordinate::new(1, 1));
        assert_eq!(outcome.ok().map(|o| o.points), Some(4));
        assert_eq!(board.points(), 4);
        assert_eq!(
            board.get(Coordinate::new(1, 1)).map(Placement::points),
            Some(4)
        );
    }

    #[test]
    fn backs_score_nothing() {
        let mut board = board_with_starter(Side::Back);
        let rich = resource(9, Kingdom::Animal, Corners::EMPTY, 1);
        let outcome = board.place(rich, Side::Back, Coordinate::new(1, -1));
        assert_eq!(outcome.ok().map(|o| o.points), Some(0));
        assert_eq!(board.points(), 0);
    }

    #[test]
    fn placement_order_increases() {
        let mut board = board_with_starter(Side::Back);
        let first = board.place(fungi_card(1), Side::Back, Coordinate::new(1, 1));
        let second = board.place(fungi_card(2), Side::Back, Coordinate::new(-1, -1));
        assert_eq!(first.ok().map(|o| o.order), Some(1));
        assert_eq!(second.ok().map(|o| o.order), Some(2));
        assert_eq!(
            board.get(Coordinate::ORIGIN).map(Placement::order),
            Some(0)
        );
    }
}
