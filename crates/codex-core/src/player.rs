//! Per-seat state: identity, connectivity, hand, objectives and board.

use std::sync::Arc;

use codex_rules::PlayerBoard;
use codex_types::{Card, ObjectiveCard, ObjectiveId};

/// One seat of a game.
#[derive(Debug, Clone)]
pub struct Player {
    name: String,
    seat: u32,
    connected: bool,
    hand: Vec<Arc<Card>>,
    starter: Option<Arc<Card>>,
    objective_choices: Vec<ObjectiveCard>,
    objective: Option<ObjectiveCard>,
    board: PlayerBoard,
}

impl Player {
    /// A freshly seated, connected player with nothing dealt.
    pub const fn new(name: String, seat: u32) -> Self {
        Self {
            name,
            seat,
            connected: true,
            hand: Vec::new(),
            starter: None,
            objective_choices: Vec::new(),
            objective: None,
            board: PlayerBoard::new(),
        }
    }

    /// Player name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Seat index in join order.
    pub const fn seat(&self) -> u32 {
        self.seat
    }

    /// Whether a client is attached.
    pub const fn is_connected(&self) -> bool {
        self.connected
    }

    pub(crate) const fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    /// Cards in hand.
    pub fn hand(&self) -> &[Arc<Card>] {
        &self.hand
    }

    /// The starter card, until it is placed.
    pub const fn pending_starter(&self) -> Option<&Arc<Card>> {
        self.starter.as_ref()
    }

    /// Candidate objectives offered at setup.
    pub fn objective_choices(&self) -> &[ObjectiveCard] {
        &self.objective_choices
    }

    /// The chosen secret objective.
    pub const fn objective(&self) -> Option<&ObjectiveCard> {
        self.objective.as_ref()
    }

    /// The player's tableau.
    pub const fn board(&self) -> &PlayerBoard {
        &self.board
    }

    pub(crate) const fn board_mut(&mut self) -> &mut PlayerBoard {
        &mut self.board
    }

    /// Whether both setup steps are done.
    pub fn setup_complete(&self) -> bool {
        !self.board.is_empty() && self.objective.is_some()
    }

    pub(crate) fn deal(
        &mut self,
        starter: Arc<Card>,
        hand: Vec<Arc<Card>>,
        objective_choices: Vec<ObjectiveCard>,
    ) {
        self.starter = Some(starter);
        self.hand = hand;
        self.objective_choices = objective_choices;
    }

    pub(crate) const fn take_starter(&mut self) -> Option<Arc<Card>> {
        self.starter.take()
    }

    pub(crate) fn hand_card(&self, index: usize) -> Option<&Arc<Card>> {
        self.hand.get(index)
    }

    pub(crate) fn remove_from_hand(&mut self, index: usize) -> Option<Arc<Card>> {
        (index < self.hand.len()).then(|| self.hand.remove(index))
    }

    pub(crate) fn add_to_hand(&mut self, card: Arc<Card>) {
        self.hand.push(card);
    }

    pub(crate) fn choice(&self, id: ObjectiveId) -> Option<&ObjectiveCard> {
        self.objective_choices.iter().find(|o| o.id == id)
    }

    pub(crate) fn set_objective(&mut self, objective: ObjectiveCard) {
        self.objective = Some(objective);
    }
}
