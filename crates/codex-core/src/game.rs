//! The game state machine.
//!
//! A [`Game`] is the authoritative state of one table. Every public method
//! either commits a complete change and bumps [`Game::version`], or returns
//! an [`ActionError`] and leaves the state exactly as it was.
//!
//! # Phases
//!
//! ```text
//! WaitingForPlayers -> Setup -> Playing -> LastRound -> Ended
//! ```
//!
//! - `WaitingForPlayers`: seats fill in join order; the last join deals.
//! - `Setup`: every player places their starter at the origin and picks a
//!   secret objective, in any order.
//! - `Playing`: the current seat places one card, then draws one. Once a
//!   board reaches the score threshold or both piles are empty, the end is
//!   armed and the phase changes when the round wraps.
//! - `LastRound`: one more placement per connected seat, no draws.
//! - `Ended`: standings are frozen.

use std::sync::Arc;

use codex_rules::{CardCatalog, DrawPile, SharedDecks, evaluate};
use codex_types::{
    ActionKind, ClientMessage, Coordinate, DeckKind, DrawSource, ObjectiveCard, ObjectiveId,
    Phase, RejectionReason, Side, Standing, TurnStage,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::error::{ActionError, GameError};
use crate::player::Player;

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// An in-game action issued by a seated player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerAction {
    /// Place a card (or, during setup, the starter).
    PlaceCard {
        /// Target cell.
        coordinate: Coordinate,
        /// Face to show.
        side: Side,
        /// Index into the hand; ignored for the starter.
        hand_index: u32,
    },
    /// Draw to end the turn.
    DrawCard {
        /// Where from.
        source: DrawSource,
    },
    /// Pick the secret objective.
    ChooseObjective {
        /// Chosen candidate.
        objective_id: ObjectiveId,
    },
}

impl PlayerAction {
    /// The in-game part of a client message, if it is one.
    pub const fn from_message(message: &ClientMessage) -> Option<Self> {
        match *message {
            ClientMessage::PlaceCard {
                coordinate,
                side,
                hand_index,
            } => Some(Self::PlaceCard {
                coordinate,
                side,
                hand_index,
            }),
            ClientMessage::DrawCard { source } => Some(Self::DrawCard { source }),
            ClientMessage::ChooseObjective { objective_id } => {
                Some(Self::ChooseObjective { objective_id })
            }
            ClientMessage::CreateGame { .. } | ClientMessage::JoinGame { .. } => None,
        }
    }

    /// The action tag echoed back with rejections.
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::PlaceCard { .. } => ActionKind::PlaceCard,
            Self::DrawCard { .. } => ActionKind::DrawCard,
            Self::ChooseObjective { .. } => ActionKind::ChooseObjective,
        }
    }
}

/// Result of a successful join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JoinOutcome {
    /// Seat taken or reclaimed.
    pub seat: u32,
    /// Whether a disconnected seat was reclaimed.
    pub reconnected: bool,
}

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

/// Authoritative state of one game.
#[derive(Debug)]
pub struct Game {
    name: String,
    config: GameConfig,
    catalog: Arc<CardCatalog>,
    seed: u64,
    player_count: u32,
    players: Vec<Player>,
    phase: Phase,
    current: usize,
    stage: TurnStage,
    decks: SharedDecks,
    public_objectives: Vec<ObjectiveCard>,
    end_triggered: bool,
    version: u64,
    standings: Option<Vec<Standing>>,
}

impl Game {
    /// Open a game with `player_count` seats. Nobody is seated yet.
    ///
    /// # Errors
    ///
    /// Returns [`RejectionReason::InvalidName`] for an empty name and
    /// [`RejectionReason::InvalidPlayerCount`] for a count outside the
    /// configured range.
    pub fn new(
        name: &str,
        player_count: u32,
        config: GameConfig,
        catalog: Arc<CardCatalog>,
        seed: u64,
    ) -> Result<Self, RejectionReason> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RejectionReason::InvalidName);
        }
        if !config.allows_player_count(player_count) {
            return Err(RejectionReason::InvalidPlayerCount);
        }
        Ok(Self {
            name: String::from(name),
            config,
            catalog,
            seed,
            player_count,
            players: Vec::new(),
            phase: Phase::WaitingForPlayers,
            current: 0,
            stage: TurnStage::Place,
            decks: SharedDecks::default(),
            public_objectives: Vec::new(),
            end_triggered: false,
            version: 0,
            standings: None,
        })
    }

    // -- accessors ----------------------------------------------------------

    /// Game name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of committed mutations.
    pub const fn version(&self) -> u64 {
        self.version
    }

    /// Lifecycle phase.
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Declared number of seats.
    pub const fn player_count(&self) -> u32 {
        self.player_count
    }

    /// Seats in join order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// The seat called `name`.
    pub fn player_by_name(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name() == name)
    }

    /// Seat holding the turn, while the game is not over.
    pub fn current_seat(&self) -> Option<u32> {
        if self.phase == Phase::Ended {
            return None;
        }
        self.players.get(self.current).map(Player::seat)
    }

    /// Half of the turn, while turns are being taken.
    pub fn turn_stage(&self) -> Option<TurnStage> {
        self.phase.is_turn_based().then_some(self.stage)
    }

    /// Whether the end of the game has been armed.
    pub const fn end_triggered(&self) -> bool {
        self.end_triggered
    }

    /// Shared piles and face-up slots.
    pub const fn decks(&self) -> &SharedDecks {
        &self.decks
    }

    /// Objectives shared by everyone.
    pub fn public_objectives(&self) -> &[ObjectiveCard] {
        &self.public_objectives
    }

    /// Final standings, once the game has ended.
    pub fn standings(&self) -> Option<&[Standing]> {
        self.standings.as_deref()
    }

    // -- seating ------------------------------------------------------------

    /// Seat `player_name`, or reconnect the disconnected seat of that name.
    ///
    /// Filling the last seat deals and starts setup.
    ///
    /// # Errors
    ///
    /// Rejects with [`RejectionReason::InvalidName`],
    /// [`RejectionReason::NameTaken`] (a connected seat has that name) or
    /// [`RejectionReason::GameFull`]. Fails with a fault if dealing runs out
    /// of cards.
    pub fn join(&mut self, player_name: &str) -> Result<JoinOutcome, ActionError> {
        let player_name = player_name.trim();
        if player_name.is_empty() {
            return Err(RejectionReason::InvalidName.into());
        }

        if let Some(index) = self.players.iter().position(|p| p.name() == player_name) {
            return self.reconnect(index);
        }

        if self.phase != Phase::WaitingForPlayers || self.seated() >= self.player_count {
            return Err(RejectionReason::GameFull.into());
        }

        let seat = self.seated();
        if self.seated().saturating_add(1) == self.player_count {
            // Deal before seating so a dealing fault leaves the table as it was.
            let mut players = self.players.clone();
            players.push(Player::new(String::from(player_name), seat));
            let dealt = self.deal(players)?;
            self.players = dealt.players;
            self.decks = dealt.decks;
            self.public_objectives = dealt.public_objectives;
            self.phase = Phase::Setup;
            info!(game = %self.name, players = self.player_count, "all seats taken, setup started");
        } else {
            self.players.push(Player::new(String::from(player_name), seat));
        }
        info!(game = %self.name, seat, player = player_name, "player seated");
        self.bump();
        Ok(JoinOutcome {
            seat,
            reconnected: false,
        })
    }

    fn reconnect(&mut self, index: usize) -> Result<JoinOutcome, ActionError> {
        let player = self
            .players
            .get_mut(index)
            .ok_or(RejectionReason::NameTaken)?;
        if player.is_connected() {
            return Err(RejectionReason::NameTaken.into());
        }
        player.set_connected(true);
        let seat = player.seat();
        info!(game = %self.name, seat, "player reconnected");

        // A turn stalled on an absent seat becomes playable again.
        if self.phase.is_turn_based() && !self.current_is_connected() {
            self.advance_turn();
        }
        self.bump();
        Ok(JoinOutcome {
            seat,
            reconnected: true,
        })
    }

    /// Mark `seat` as disconnected. Ends its turn if it held one.
    ///
    /// Returns `false` when the seat was already disconnected or does not
    /// exist, in which case nothing changed.
    pub fn disconnect(&mut self, seat: u32) -> bool {
        let Some(index) = self.index_of(seat) else {
            return false;
        };
        let Some(player) = self.players.get_mut(index) else {
            return false;
        };
        if !player.is_connected() {
            return false;
        }
        player.set_connected(false);
        info!(game = %self.name, seat, "player disconnected");

        if self.phase.is_turn_based() && index == self.current {
            self.end_turn();
        }
        self.bump();
        true
    }

    // -- actions ------------------------------------------------------------

    /// Apply an in-game action for `seat`.
    ///
    /// # Errors
    ///
    /// See [`Self::place_card`], [`Self::draw_card`] and
    /// [`Self::choose_objective`].
    pub fn apply(&mut self, seat: u32, action: PlayerAction) -> Result<(), ActionError> {
        match action {
            PlayerAction::PlaceCard {
                coordinate,
                side,
                hand_index,
            } => self.place_card(seat, coordinate, side, hand_index),
            PlayerAction::DrawCard { source } => self.draw_card(seat, source),
            PlayerAction::ChooseObjective { objective_id } => {
                self.choose_objective(seat, objective_id)
            }
        }
    }

    /// Place a card.
    ///
    /// During setup this places the seat's starter at the origin. During
    /// play it places the hand card at `hand_index`.
    ///
    /// # Errors
    ///
    /// Rejects with [`RejectionReason::WrongPhase`],
    /// [`RejectionReason::AlreadyDone`] or
    /// [`RejectionReason::StarterOffOrigin`] during setup;
    /// [`RejectionReason::NotYourTurn`], [`RejectionReason::WrongStage`],
    /// [`RejectionReason::InvalidHandIndex`] or any placement rejection
    /// during play.
    pub fn place_card(
        &mut self,
        seat: u32,
        coordinate: Coordinate,
        side: Side,
        hand_index: u32,
    ) -> Result<(), ActionError> {
        match self.phase {
            Phase::Setup => self.place_starter(seat, coordinate, side),
            Phase::Playing | Phase::LastRound => {
                let index = self.check_turn(seat, TurnStage::Place)?;
                let hand_index = usize::try_from(hand_index)
                    .ok()
                    .ok_or(RejectionReason::InvalidHandIndex)?;
                let player = self
                    .players
                    .get_mut(index)
                    .ok_or(RejectionReason::NotYourTurn)?;
                let card = player
                    .hand_card(hand_index)
                    .cloned()
                    .ok_or(RejectionReason::InvalidHandIndex)?;
                let outcome = player.board_mut().place(card, side, coordinate)?;
                player.remove_from_hand(hand_index);
                debug!(
                    game = %self.name,
                    seat,
                    %coordinate,
                    points = outcome.points,
                    "card played"
                );

                if self.phase == Phase::LastRound || self.decks.exhausted() {
                    self.end_turn();
                } else {
                    self.stage = TurnStage::Draw;
                }
                self.bump();
                Ok(())
            }
            Phase::WaitingForPlayers | Phase::Ended => Err(RejectionReason::WrongPhase.into()),
        }
    }

    fn place_starter(
        &mut self,
        seat: u32,
        coordinate: Coordinate,
        side: Side,
    ) -> Result<(), ActionError> {
        let index = self.index_of(seat).ok_or(RejectionReason::NotSeated)?;
        let player = self
            .players
            .get_mut(index)
            .ok_or(RejectionReason::NotSeated)?;
        let starter = player
            .pending_starter()
            .cloned()
            .ok_or(RejectionReason::AlreadyDone)?;
        if coordinate != Coordinate::ORIGIN {
            return Err(RejectionReason::StarterOffOrigin.into());
        }
        player.board_mut().place_starter(starter, side)?;
        player.take_starter();
        debug!(game = %self.name, seat, ?side, "starter placed");

        self.finish_setup_if_done();
        self.bump();
        Ok(())
    }

    /// Draw a card to end the turn.
    ///
    /// # Errors
    ///
    /// Rejects with [`RejectionReason::WrongPhase`],
    /// [`RejectionReason::NotYourTurn`], [`RejectionReason::WrongStage`] or
    /// [`RejectionReason::EmptySource`].
    pub fn draw_card(&mut self, seat: u32, source: DrawSource) -> Result<(), ActionError> {
        if !self.phase.is_turn_based() {
            return Err(RejectionReason::WrongPhase.into());
        }
        let index = self.check_turn(seat, TurnStage::Draw)?;
        let card = self.decks.draw(source)?;
        debug!(game = %self.name, seat, card = %card.id, ?source, "card drawn");
        if let Some(player) = self.players.get_mut(index) {
            player.add_to_hand(card);
        }
        self.end_turn();
        self.bump();
        Ok(())
    }

    /// Choose the secret objective during setup.
    ///
    /// # Errors
    ///
    /// Rejects with [`RejectionReason::WrongPhase`],
    /// [`RejectionReason::AlreadyDone`] or
    /// [`RejectionReason::UnknownObjective`].
    pub fn choose_objective(
        &mut self,
        seat: u32,
        objective_id: ObjectiveId,
    ) -> Result<(), ActionError> {
        if self.phase != Phase::Setup {
            return Err(RejectionReason::WrongPhase.into());
        }
        let index = self.index_of(seat).ok_or(RejectionReason::NotSeated)?;
        let player = self
            .players
            .get_mut(index)
            .ok_or(RejectionReason::NotSeated)?;
        if player.objective().is_some() {
            return Err(RejectionReason::AlreadyDone.into());
        }
        let chosen = player
            .choice(objective_id)
            .cloned()
            .ok_or(RejectionReason::UnknownObjective)?;
        player.set_objective(chosen);
        debug!(game = %self.name, seat, objective = %objective_id, "objective chosen");

        self.finish_setup_if_done();
        self.bump();
        Ok(())
    }

    // -- internals ----------------------------------------------------------

    fn seated(&self) -> u32 {
        u32::try_from(self.players.len()).unwrap_or(u32::MAX)
    }

    fn index_of(&self, seat: u32) -> Option<usize> {
        self.players.iter().position(|p| p.seat() == seat)
    }

    fn current_is_connected(&self) -> bool {
        self.players
            .get(self.current)
            .is_some_and(Player::is_connected)
    }

    const fn bump(&mut self) {
        self.version = self.version.saturating_add(1);
    }

    fn check_turn(&self, seat: u32, stage: TurnStage) -> Result<usize, RejectionReason> {
        let index = self.index_of(seat).ok_or(RejectionReason::NotSeated)?;
        if index != self.current {
            return Err(RejectionReason::NotYourTurn);
        }
        if self.stage != stage {
            return Err(RejectionReason::WrongStage);
        }
        Ok(index)
    }

    fn finish_setup_if_done(&mut self) {
        if self.phase != Phase::Setup || !self.players.iter().all(Player::setup_complete) {
            return;
        }
        self.phase = Phase::Playing;
        self.stage = TurnStage::Place;
        self.current = self
            .players
            .iter()
            .position(Player::is_connected)
            .unwrap_or(0);
        info!(game = %self.name, first = self.current, "setup complete, play started");
    }

    /// Close the current turn: check the end triggers, then pass the turn.
    fn end_turn(&mut self) {
        if self.phase == Phase::Playing && !self.end_triggered {
            let threshold = self.config.score_threshold;
            let scored = self
                .players
                .iter()
                .any(|p| p.board().points() >= threshold);
            if scored || self.decks.piles_empty() {
                self.end_triggered = true;
                info!(
                    game = %self.name,
                    by_score = scored,
                    "end of game triggered, finishing the round"
                );
            }
        }
        self.advance_turn();
    }

    /// Move the turn to the next connected seat, handling round wraps.
    fn advance_turn(&mut self) {
        let count = self.players.len();
        if count == 0 {
            return;
        }
        let mut index = self.current;
        for _ in 0..count {
            index = index.checked_add(1).filter(|&i| i < count).unwrap_or(0);
            if index == 0 {
                self.on_round_wrap();
                if self.phase == Phase::Ended {
                    return;
                }
            }
            if self.players.get(index).is_some_and(Player::is_connected) {
                break;
            }
        }
        self.current = index;
        self.stage = TurnStage::Place;
    }

    fn on_round_wrap(&mut self) {
        match self.phase {
            Phase::Playing if self.end_triggered => {
                self.phase = Phase::LastRound;
                info!(game = %self.name, "last round started");
            }
            Phase::LastRound => {
                self.phase = Phase::Ended;
                let standings = self.compute_standings();
                info!(
                    game = %self.name,
                    winner = standings.first().map(|s| s.name.as_str()),
                    "game ended"
                );
                self.standings = Some(standings);
            }
            _ => {}
        }
    }

    fn compute_standings(&self) -> Vec<Standing> {
        let mut standings: Vec<Standing> = self
            .players
            .iter()
            .map(|player| {
                let board = player.board();
                let mut objective_points: u32 = 0;
                let mut objectives_met: u32 = 0;
                for objective in player.objective().into_iter().chain(&self.public_objectives) {
                    let points = evaluate(objective, board);
                    if points > 0 {
                        objectives_met = objectives_met.saturating_add(1);
                    }
                    objective_points = objective_points.saturating_add(points);
                }
                Standing {
                    seat: player.seat(),
                    name: String::from(player.name()),
                    board_points: board.points(),
                    objective_points,
                    total: board.points().saturating_add(objective_points),
                    objectives_met,
                    rank: 0,
                }
            })
            .collect();

        standings.sort_by(|a, b| {
            b.total
                .cmp(&a.total)
                .then(b.objectives_met.cmp(&a.objectives_met))
                .then(a.seat.cmp(&b.seat))
        });
        let keys: Vec<(u32, u32)> = standings
            .iter()
            .map(|s| (s.total, s.objectives_met))
            .collect();
        for standing in &mut standings {
            let better = keys
                .iter()
                .filter(|&&(total, met)| (total, met) > (standing.total, standing.objectives_met))
                .count();
            standing.rank = u32::try_from(better).unwrap_or(u32::MAX).saturating_add(1);
        }
        standings
    }

    /// Shuffle and deal for `players`, without touching `self`.
    fn deal(&self, mut players: Vec<Player>) -> Result<Dealt, GameError> {
        let config = &self.config;
        let mut rng = StdRng::seed_from_u64(self.seed);

        let resource = DrawPile::shuffled(self.catalog.resource_cards().to_vec(), &mut rng);
        let gold = DrawPile::shuffled(self.catalog.gold_cards().to_vec(), &mut rng);
        let mut starters = DrawPile::shuffled(self.catalog.starter_cards().to_vec(), &mut rng);
        let mut objectives = DrawPile::shuffled(self.catalog.objectives().to_vec(), &mut rng);

        let public_count = to_usize(config.public_objectives);
        let public_objectives = objectives.draw_many(public_count);
        if public_objectives.len() < public_count {
            return Err(GameError::DeckTooSmall { what: "objectives" });
        }

        let mut decks = SharedDecks::new(resource, gold, to_usize(config.visible_slots));
        for player in &mut players {
            let starter = starters
                .draw()
                .ok_or(GameError::DeckTooSmall { what: "starters" })?;
            let mut hand = Vec::new();
            for (deck, count) in [
                (DeckKind::Resource, config.resource_cards_in_hand),
                (DeckKind::Gold, config.gold_cards_in_hand),
            ] {
                for _ in 0..count {
                    let card = decks.draw_from_pile(deck).ok_or(GameError::DeckTooSmall {
                        what: "cards in the draw piles",
                    })?;
                    hand.push(card);
                }
            }
            let choices_count = to_usize(config.objective_choices);
            let choices = objectives.draw_many(choices_count);
            if choices.len() < choices_count {
                return Err(GameError::DeckTooSmall { what: "objectives" });
            }
            player.deal(starter, hand, choices);
        }

        Ok(Dealt {
            players,
            decks,
            public_objectives,
        })
    }
}

struct Dealt {
    players: Vec<Player>,
    decks: SharedDecks,
    public_objectives: Vec<ObjectiveCard>,
}

fn to_usize(value: u32) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Arc<CardCatalog> {
        match CardCatalog::standard() {
            Ok(catalog) => Arc::new(catalog),
            Err(err) => panic!("standard catalog failed to load: {err}"),
        }
    }

    fn two_player_game() -> Game {
        let game = Game::new("g1", 2, GameConfig::default(), catalog(), 7);
        let mut game = match game {
            Ok(game) => game,
            Err(reason) => panic!("game creation rejected: {reason:?}"),
        };
        assert!(game.join("Alice").is_ok());
        assert!(game.join("Bob").is_ok());
        game
    }

    fn setup_all(game: &mut Game) {
        for seat in 0..2 {
            let choice = game
                .players()
                .get(usize::try_from(seat).unwrap_or(0))
                .and_then(|p| p.objective_choices().first())
                .map(|o| o.id);
            assert!(choice.is_some());
            if let Some(id) = choice {
                assert!(game.choose_objective(seat, id).is_ok());
            }
            assert!(
                game.place_card(seat, Coordinate::ORIGIN, Side::Back, 0)
                    .is_ok()
            );
        }
    }

    #[test]
    fn invalid_creation_is_rejected() {
        let config = GameConfig::default();
        assert_eq!(
            Game::new(" ", 2, config.clone(), catalog(), 1).err(),
            Some(RejectionReason::InvalidName)
        );
        assert_eq!(
            Game::new("g", 5, config, catalog(), 1).err(),
            Some(RejectionReason::InvalidPlayerCount)
        );
    }

    #[test]
    fn filling_the_table_deals() {
        let game = two_player_game();
        assert_eq!(game.phase(), Phase::Setup);
        assert_eq!(game.version(), 2);
        for player in game.players() {
            assert_eq!(player.hand().len(), 3);
            assert!(player.pending_starter().is_some());
            assert_eq!(player.objective_choices().len(), 2);
        }
        assert_eq!(game.public_objectives().len(), 2);
        assert_eq!(game.decks().visible(DeckKind::Resource).len(), 2);
        // 40 - 2 face up - 2 per hand x 2 players
        assert_eq!(game.decks().pile(DeckKind::Resource).len(), 34);
        assert_eq!(game.decks().pile(DeckKind::Gold).len(), 36);
    }

    #[test]
    fn full_table_rejects_newcomers() {
        let mut game = two_player_game();
        assert_eq!(
            game.join("Carol").err().map(|e| e.reason()),
            Some(RejectionReason::GameFull)
        );
        assert_eq!(
            game.join("Alice").err().map(|e| e.reason()),
            Some(RejectionReason::NameTaken)
        );
        assert_eq!(game.version(), 2);
    }

    #[test]
    fn same_seed_deals_the_same_cards() {
        let a = two_player_game();
        let b = two_player_game();
        let hand = |g: &Game| -> Vec<u16> {
            g.players()
                .iter()
                .flat_map(|p| p.hand().iter().map(|c| c.id.0))
                .collect()
        };
        assert_eq!(hand(&a), hand(&b));
    }

    #[test]
    fn setup_steps_complete_in_any_order() {
        let mut game = two_player_game();
        assert_eq!(
            game.place_card(0, Coordinate::new(1, 1), Side::Front, 0)
                .err()
                .map(|e| e.reason()),
            Some(RejectionReason::StarterOffOrigin)
        );
        assert!(game.place_card(0, Coordinate::ORIGIN, Side::Front, 0).is_ok());
        assert_eq!(
            game.place_card(0, Coordinate::ORIGIN, Side::Front, 0)
                .err()
                .map(|e| e.reason()),
            Some(RejectionReason::AlreadyDone)
        );
        assert_eq!(
            game.choose_objective(0, ObjectiveId(999))
                .err()
                .map(|e| e.reason()),
            Some(RejectionReason::UnknownObjective)
        );
        assert_eq!(game.phase(), Phase::Setup);
        setup_remaining(&mut game);
        assert_eq!(game.phase(), Phase::Playing);
        assert_eq!(game.current_seat(), Some(0));
        assert_eq!(game.turn_stage(), Some(TurnStage::Place));
    }

    fn setup_remaining(game: &mut Game) {
        let picks: Vec<(u32, Option<ObjectiveId>)> = game
            .players()
            .iter()
            .map(|p| {
                let pick = if p.objective().is_none() {
                    p.objective_choices().first().map(|o| o.id)
                } else {
                    None
                };
                (p.seat(), pick)
            })
            .collect();
        for (seat, pick) in picks {
            if let Some(id) = pick {
                assert!(game.choose_objective(seat, id).is_ok());
            }
            let needs_starter = game
                .players()
                .iter()
                .any(|p| p.seat() == seat && p.pending_starter().is_some());
            if needs_starter {
                assert!(
                    game.place_card(seat, Coordinate::ORIGIN, Side::Back, 0)
                        .is_ok()
                );
            }
        }
    }

    #[test]
    fn turns_alternate_place_then_draw() {
        let mut game = two_player_game();
        setup_all(&mut game);
        let version = game.version();

        // Bob may not act on Alice's turn.
        assert_eq!(
            game.place_card(1, Coordinate::new(1, 1), Side::Back, 0)
                .err()
                .map(|e| e.reason()),
            Some(RejectionReason::NotYourTurn)
        );
        // Drawing before placing is out of order.
        let draw = DrawSource::Deck {
            deck: DeckKind::Resource,
        };
        assert_eq!(
            game.draw_card(0, draw).err().map(|e| e.reason()),
            Some(RejectionReason::WrongStage)
        );
        assert_eq!(
            game.place_card(0, Coordinate::new(1, 1), Side::Back, 9)
                .err()
                .map(|e| e.reason()),
            Some(RejectionReason::InvalidHandIndex)
        );
        assert_eq!(game.version(), version);

        // Every starter back has four visible corners.
        assert!(
            game.place_card(0, Coordinate::new(1, 1), Side::Back, 0)
                .is_ok()
        );
        assert_eq!(game.turn_stage(), Some(TurnStage::Draw));
        assert!(game.draw_card(0, draw).is_ok());
        assert_eq!(game.current_seat(), Some(1));
        assert_eq!(game.turn_stage(), Some(TurnStage::Place));
        assert_eq!(game.version(), version.saturating_add(2));
        assert_eq!(game.players().first().map(|p| p.hand().len()), Some(3));
    }

    #[test]
    fn disconnecting_the_current_seat_passes_the_turn() {
        let mut game = two_player_game();
        setup_all(&mut game);
        assert!(game.disconnect(0));
        assert_eq!(game.current_seat(), Some(1));
        assert!(!game.disconnect(0));

        // Bob plays; the turn comes back to Bob while Alice is away.
        assert!(
            game.place_card(1, Coordinate::new(-1, -1), Side::Back, 0)
                .is_ok()
        );
        assert!(
            game.draw_card(
                1,
                DrawSource::Visible {
                    deck: DeckKind::Gold,
                    slot: 0
                }
            )
            .is_ok()
        );
        assert_eq!(game.current_seat(), Some(1));

        let rejoin = game.join("Alice");
        assert_eq!(
            rejoin.ok(),
            Some(JoinOutcome {
                seat: 0,
                reconnected: true
            })
        );
    }

    #[test]
    fn reconnect_unstalls_an_abandoned_table() {
        let mut game = two_player_game();
        setup_all(&mut game);
        assert!(game.disconnect(1));
        assert!(game.disconnect(0));
        // Nobody is connected: the turn parks on a disconnected seat.
        assert_eq!(game.current_seat(), Some(0));
        assert!(game.join("Bob").is_ok());
        assert_eq!(game.current_seat(), Some(1));
        assert_eq!(game.turn_stage(), Some(TurnStage::Place));
    }

    #[test]
    fn threshold_arms_the_end_and_the_round_finishes() {
        let config = GameConfig {
            score_threshold: 0,
            ..GameConfig::default()
        };
        let game = Game::new("short", 2, config, catalog(), 3);
        let mut game = match game {
            Ok(game) => game,
            Err(reason) => panic!("game creation rejected: {reason:?}"),
        };
        assert!(game.join("Alice").is_ok());
        assert!(game.join("Bob").is_ok());
        setup_all(&mut game);

        let draw = DrawSource::Deck {
            deck: DeckKind::Resource,
        };
        // Alice's turn: zero points already meets a zero threshold.
        assert!(game.place_card(0, Coordinate::new(1, 1), Side::Back, 0).is_ok());
        assert!(game.draw_card(0, draw).is_ok());
        assert!(game.end_triggered());
        assert_eq!(game.phase(), Phase::Playing);

        // Bob closes the round.
        assert!(game.place_card(1, Coordinate::new(1, 1), Side::Back, 0).is_ok());
        assert!(game.draw_card(1, draw).is_ok());
        assert_eq!(game.phase(), Phase::LastRound);
        assert_eq!(game.current_seat(), Some(0));

        // Last round: placing ends the turn, no draw.
        assert!(game.place_card(0, Coordinate::new(-1, 1), Side::Back, 0).is_ok());
        assert_eq!(game.current_seat(), Some(1));
        assert_eq!(
            game.draw_card(1, draw).err().map(|e| e.reason()),
            Some(RejectionReason::WrongStage)
        );
        assert!(game.place_card(1, Coordinate::new(-1, 1), Side::Back, 0).is_ok());

        assert_eq!(game.phase(), Phase::Ended);
        assert_eq!(game.current_seat(), None);
        let standings = game.standings().map(<[Standing]>::to_vec).unwrap_or_default();
        assert_eq!(standings.len(), 2);
        assert_eq!(standings.first().map(|s| s.rank), Some(1));
        for standing in &standings {
            assert_eq!(
                standing.total,
                standing.board_points.saturating_add(standing.objective_points)
            );
        }
        assert_eq!(
            game.place_card(0, Coordinate::new(-1, -1), Side::Back, 0)
                .err()
                .map(|e| e.reason()),
            Some(RejectionReason::WrongPhase)
        );
    }
}
