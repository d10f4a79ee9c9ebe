//! Shared draw piles and their face-up slots.
//!
//! Each of the two piles (resource and gold) has a row of face-up cards
//! next to it. Taking a face-up card refills its slot from the same pile,
//! falling back to the other pile, and leaves the slot empty when both piles
//! are exhausted.

use std::sync::Arc;

use codex_types::{Card, DeckKind, DrawSource, Kingdom, RejectionReason};
use rand::Rng;
use rand::seq::SliceRandom;

/// A face-down pile. The top card is the last element.
#[derive(Debug, Clone)]
pub struct DrawPile<T> {
    cards: Vec<T>,
}

impl<T> Default for DrawPile<T> {
    fn default() -> Self {
        Self { cards: Vec::new() }
    }
}

impl<T> DrawPile<T> {
    /// A pile holding `cards` in a random order.
    pub fn shuffled(mut cards: Vec<T>, rng: &mut impl Rng) -> Self {
        cards.shuffle(rng);
        Self { cards }
    }

    /// Take the top card.
    pub fn draw(&mut self) -> Option<T> {
        self.cards.pop()
    }

    /// Take up to `count` cards from the top.
    pub fn draw_many(&mut self, count: usize) -> Vec<T> {
        let keep = self.cards.len().saturating_sub(count);
        let mut drawn = self.cards.split_off(keep);
        drawn.reverse();
        drawn
    }

    /// The top card, without taking it.
    pub fn peek(&self) -> Option<&T> {
        self.cards.last()
    }

    /// Cards left.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether the pile is exhausted.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// The two shared piles with their face-up rows.
#[derive(Debug, Clone, Default)]
pub struct SharedDecks {
    resource: DrawPile<Arc<Card>>,
    gold: DrawPile<Arc<Card>>,
    visible_resource: Vec<Option<Arc<Card>>>,
    visible_gold: Vec<Option<Arc<Card>>>,
}

impl SharedDecks {
    /// Build the decks and open `slots` face-up cards per pile.
    pub fn new(
        mut resource: DrawPile<Arc<Card>>,
        mut gold: DrawPile<Arc<Card>>,
        slots: usize,
    ) -> Self {
        let visible_resource = (0..slots).map(|_| resource.draw()).collect();
        let visible_gold = (0..slots).map(|_| gold.draw()).collect();
        Self {
            resource,
            gold,
            visible_resource,
            visible_gold,
        }
    }

    /// The pile of kind `deck`.
    pub const fn pile(&self, deck: DeckKind) -> &DrawPile<Arc<Card>> {
        match deck {
            DeckKind::Resource => &self.resource,
            DeckKind::Gold => &self.gold,
        }
    }

    const fn pile_mut(&mut self, deck: DeckKind) -> &mut DrawPile<Arc<Card>> {
        match deck {
            DeckKind::Resource => &mut self.resource,
            DeckKind::Gold => &mut self.gold,
        }
    }

    /// Face-up cards next to pile `deck`.
    pub fn visible(&self, deck: DeckKind) -> &[Option<Arc<Card>>] {
        match deck {
            DeckKind::Resource => &self.visible_resource,
            DeckKind::Gold => &self.visible_gold,
        }
    }

    /// Kingdom shown on the back of the top card of `deck`.
    pub fn top_kingdom(&self, deck: DeckKind) -> Option<Kingdom> {
        self.pile(deck).peek().and_then(|card| card.kingdom)
    }

    /// Take one card from the top of a pile.
    pub fn draw_from_pile(&mut self, deck: DeckKind) -> Option<Arc<Card>> {
        self.pile_mut(deck).draw()
    }

    /// Take a card from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`RejectionReason::EmptySource`] if the pile is exhausted,
    /// the slot does not exist, or the slot is empty. Nothing changes.
    pub fn draw(&mut self, source: DrawSource) -> Result<Arc<Card>, RejectionReason> {
        match source {
            DrawSource::Deck { deck } => self
                .draw_from_pile(deck)
                .ok_or(RejectionReason::EmptySource),
            DrawSource::Visible { deck, slot } => {
                let index = usize::try_from(slot)
                    .ok()
                    .ok_or(RejectionReason::EmptySource)?;
                let taken = self
                    .visible_mut(deck)
                    .get_mut(index)
                    .and_then(Option::take)
                    .ok_or(RejectionReason::EmptySource)?;
                let refill = self
                    .draw_from_pile(deck)
                    .or_else(|| self.draw_from_pile(deck.other()));
                if let Some(cell) = self.visible_mut(deck).get_mut(index) {
                    *cell = refill;
                }
                Ok(taken)
            }
        }
    }

    fn visible_mut(&mut self, deck: DeckKind) -> &mut Vec<Option<Arc<Card>>> {
        match deck {
            DeckKind::Resource => &mut self.visible_resource,
            DeckKind::Gold => &mut self.visible_gold,
        }
    }

    /// Whether both face-down piles are exhausted.
    pub fn piles_empty(&self) -> bool {
        self.resource.is_empty() && self.gold.is_empty()
    }

    /// Whether no card can be drawn from anywhere.
    pub fn exhausted(&self) -> bool {
        self.piles_empty()
            && self
                .visible_resource
                .iter()
                .chain(&self.visible_gold)
                .all(Option::is_none)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use codex_types::{CardId, CardKind, Face};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn card(id: u16, kind: CardKind) -> Arc<Card> {
        Arc::new(Card {
            id: CardId(id),
            kind,
            kingdom: Some(Kingdom::Plant),
            front: Face::plain_back(Kingdom::Plant),
            back: Face::plain_back(Kingdom::Plant),
        })
    }

    fn pile(ids: std::ops::RangeInclusive<u16>, kind: CardKind) -> DrawPile<Arc<Card>> {
        DrawPile {
            cards: ids.map(|id| card(id, kind)).collect(),
        }
    }

    fn ids(cards: &[Option<Arc<Card>>]) -> Vec<Option<u16>> {
        cards.iter().map(|c| c.as_ref().map(|c| c.id.0)).collect()
    }

    #[test]
    fn shuffle_is_deterministic_per_seed() {
        let cards: Vec<u16> = (1..=40).collect();
        let mut a = DrawPile::shuffled(cards.clone(), &mut StdRng::seed_from_u64(7));
        let mut b = DrawPile::shuffled(cards, &mut StdRng::seed_from_u64(7));
        assert_eq!(a.draw_many(40), b.draw_many(40));
    }

    #[test]
    fn draw_many_takes_from_the_top() {
        let mut pile = DrawPile {
            cards: vec![1, 2, 3, 4],
        };
        assert_eq!(pile.draw_many(2), vec![4, 3]);
        assert_eq!(pile.draw_many(5), vec![2, 1]);
        assert!(pile.is_empty());
    }

    #[test]
    fn opening_fills_the_slots() {
        let decks = SharedDecks::new(
            pile(1..=5, CardKind::Resource),
            pile(41..=45, CardKind::Gold),
            2,
        );
        assert_eq!(ids(decks.visible(DeckKind::Resource)), vec![Some(5), Some(4)]);
        assert_eq!(ids(decks.visible(DeckKind::Gold)), vec![Some(45), Some(44)]);
        assert_eq!(decks.pile(DeckKind::Resource).len(), 3);
    }

    #[test]
    fn taking_a_face_up_card_refills_from_the_same_pile() {
        let mut decks = SharedDecks::new(
            pile(1..=3, CardKind::Resource),
            pile(41..=43, CardKind::Gold),
            2,
        );
        let taken = decks.draw(DrawSource::Visible {
            deck: DeckKind::Resource,
            slot: 0,
        });
        assert_eq!(taken.ok().map(|c| c.id.0), Some(3));
        assert_eq!(ids(decks.visible(DeckKind::Resource)), vec![Some(1), Some(2)]);
        assert!(decks.pile(DeckKind::Resource).is_empty());
    }

    #[test]
    fn refill_falls_back_to_the_other_pile_then_leaves_a_gap() {
        let mut decks = SharedDecks::new(
            pile(1..=2, CardKind::Resource),
            pile(41..=43, CardKind::Gold),
            2,
        );
        let slot0 = DrawSource::Visible {
            deck: DeckKind::Resource,
            slot: 0,
        };
        assert!(decks.draw(slot0).is_ok());
        assert_eq!(ids(decks.visible(DeckKind::Resource)), vec![Some(41), Some(1)]);
        assert!(decks.piles_empty());
        assert!(decks.draw(slot0).is_ok());
        assert_eq!(ids(decks.visible(DeckKind::Resource)), vec![None, Some(1)]);
        assert_eq!(decks.draw(slot0).err(), Some(RejectionReason::EmptySource));
        assert!(!decks.exhausted());
    }

    #[test]
    fn empty_pile_and_bad_slot_are_rejected() {
        let mut decks = SharedDecks::new(
            pile(1..=2, CardKind::Resource),
            DrawPile::default(),
            2,
        );
        let from_gold = decks.draw(DrawSource::Deck {
            deck: DeckKind::Gold,
        });
        assert_eq!(from_gold.err(), Some(RejectionReason::EmptySource));
        let bad_slot = decks.draw(DrawSource::Visible {
            deck: DeckKind::Resource,
            slot: 9,
        });
        assert_eq!(bad_slot.err(), Some(RejectionReason::EmptySource));
        assert_eq!(ids(decks.visible(DeckKind::Gold)), vec![None, None]);
        assert!(decks.top_kingdom(DeckKind::Gold).is_none());
    }
}
