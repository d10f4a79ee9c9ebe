//! The card catalog: every card and objective a game can use.
//!
//! The standard deck ships as YAML embedded in the binary. Entries are read
//! into flat `Raw*` records first and then turned into the immutable
//! [`Card`] and [`ObjectiveCard`] values, checking ids and shapes on the way.

use std::collections::BTreeMap;
use std::sync::Arc;

use codex_types::{
    Card, CardId, CardKind, Corner, Corners, Face, Kingdom, ObjectiveCard, ObjectiveId,
    ObjectiveRule, PatternCell, Scoring, Symbol,
};
use serde::Deserialize;
use tracing::debug;

use crate::error::RulesError;

/// The standard deck definition.
const STANDARD_DECK: &str = include_str!("../data/cards.yaml");

// ---------------------------------------------------------------------------
// Raw catalog records
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCatalog {
    resource: Vec<RawPlayable>,
    gold: Vec<RawPlayable>,
    starter: Vec<RawStarter>,
    objectives: Vec<RawObjective>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
enum RawCorner {
    Hidden,
    Empty,
    Fungi,
    Plant,
    Animal,
    Insect,
    Quill,
    Inkwell,
    Manuscript,
}

impl From<RawCorner> for Corner {
    fn from(raw: RawCorner) -> Self {
        match raw {
            RawCorner::Hidden => Self::Hidden,
            RawCorner::Empty => Self::Empty,
            RawCorner::Fungi => Self::Symbol(Symbol::Fungi),
            RawCorner::Plant => Self::Symbol(Symbol::Plant),
            RawCorner::Animal => Self::Symbol(Symbol::Animal),
            RawCorner::Insect => Self::Symbol(Symbol::Insect),
            RawCorner::Quill => Self::Symbol(Symbol::Quill),
            RawCorner::Inkwell => Self::Symbol(Symbol::Inkwell),
            RawCorner::Manuscript => Self::Symbol(Symbol::Manuscript),
        }
    }
}

fn corners([top_left, top_right, bottom_left, bottom_right]: [RawCorner; 4]) -> Corners {
    Corners {
        top_left: top_left.into(),
        top_right: top_right.into(),
        bottom_left: bottom_left.into(),
        bottom_right: bottom_right.into(),
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
enum RawScoringKind {
    Fixed,
    CoveredCorners,
    Symbols,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawScoring {
    kind: RawScoringKind,
    #[serde(default)]
    points: u32,
    #[serde(default)]
    multiplier: u32,
    #[serde(default)]
    kinds: Vec<Symbol>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPlayable {
    id: u16,
    kingdom: Kingdom,
    corners: [RawCorner; 4],
    #[serde(default)]
    center: Vec<Symbol>,
    /// Shorthand for a fixed score.
    #[serde(default)]
    points: u32,
    #[serde(default)]
    scoring: Option<RawScoring>,
    #[serde(default)]
    requires: BTreeMap<Symbol, u32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFace {
    corners: [RawCorner; 4],
    #[serde(default)]
    center: Vec<Symbol>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawStarter {
    id: u16,
    front: RawFace,
    back: RawFace,
}

#[derive(Debug, Clone, Copy, Deserialize)]
enum RawRuleKind {
    Threshold,
    Sets,
    Pattern,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawObjective {
    id: u16,
    points: u32,
    kind: RawRuleKind,
    #[serde(default)]
    symbols: BTreeMap<Symbol, u32>,
    #[serde(default)]
    cells: Vec<PatternCell>,
}

fn invalid(id: u16, reason: &str) -> RulesError {
    RulesError::InvalidEntry {
        id,
        reason: String::from(reason),
    }
}

impl RawScoring {
    fn into_scoring(self, id: u16) -> Result<Scoring, RulesError> {
        match self.kind {
            RawScoringKind::Fixed => Ok(Scoring::Fixed(self.points)),
            RawScoringKind::CoveredCorners => Ok(Scoring::CoveredCorners {
                multiplier: self.multiplier,
            }),
            RawScoringKind::Symbols => {
                if self.kinds.is_empty() {
                    return Err(invalid(id, "symbol scoring lists no symbols"));
                }
                Ok(Scoring::Symbols {
                    kinds: self.kinds,
                    multiplier: self.multiplier,
                })
            }
        }
    }
}

impl RawPlayable {
    fn into_card(self, kind: CardKind) -> Result<Card, RulesError> {
        let scoring = match self.scoring {
            Some(raw) => raw.into_scoring(self.id)?,
            None => Scoring::Fixed(self.points),
        };
        Ok(Card {
            id: CardId(self.id),
            kind,
            kingdom: Some(self.kingdom),
            front: Face {
                corners: corners(self.corners),
                center: self.center,
                scoring,
                requires: self.requires,
            },
            back: Face::plain_back(self.kingdom),
        })
    }
}

impl RawStarter {
    fn into_card(self) -> Card {
        let face = |raw: RawFace| Face {
            corners: corners(raw.corners),
            center: raw.center,
            scoring: Scoring::ZERO,
            requires: BTreeMap::new(),
        };
        Card {
            id: CardId(self.id),
            kind: CardKind::Starter,
            kingdom: None,
            front: face(self.front),
            back: face(self.back),
        }
    }
}

impl RawObjective {
    fn into_objective(self) -> Result<ObjectiveCard, RulesError> {
        if self.points == 0 {
            return Err(invalid(self.id, "objective pays no points"));
        }
        let rule = match self.kind {
            RawRuleKind::Threshold | RawRuleKind::Sets => {
                if self.symbols.values().all(|&n| n == 0) {
                    return Err(invalid(self.id, "objective asks for no symbols"));
                }
                if matches!(self.kind, RawRuleKind::Threshold) {
                    ObjectiveRule::Threshold {
                        requires: self.symbols,
                    }
                } else {
                    ObjectiveRule::Sets {
                        per_set: self.symbols,
                    }
                }
            }
            RawRuleKind::Pattern => {
                if self.cells.is_empty() {
                    return Err(invalid(self.id, "pattern has no cells"));
                }
                ObjectiveRule::Pattern { cells: self.cells }
            }
        };
        Ok(ObjectiveCard {
            id: ObjectiveId(self.id),
            points: self.points,
            rule,
        })
    }
}

// ---------------------------------------------------------------------------
// CardCatalog
// ---------------------------------------------------------------------------

/// Every card and objective available to a game, indexed by id.
#[derive(Debug, Clone)]
pub struct CardCatalog {
    cards: BTreeMap<CardId, Arc<Card>>,
    resource: Vec<Arc<Card>>,
    gold: Vec<Arc<Card>>,
    starters: Vec<Arc<Card>>,
    objectives: Vec<ObjectiveCard>,
}

impl CardCatalog {
    /// Load the embedded standard deck.
    ///
    /// # Errors
    ///
    /// Returns a [`RulesError`] if the embedded definition is malformed.
    pub fn standard() -> Result<Self, RulesError> {
        Self::parse(STANDARD_DECK)
    }

    /// Parse a catalog from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::CatalogParse`] on malformed YAML,
    /// [`RulesError::DuplicateCard`] or [`RulesError::DuplicateObjective`]
    /// on repeated ids, and [`RulesError::InvalidEntry`] on entries that
    /// cannot be scored.
    pub fn parse(yaml: &str) -> Result<Self, RulesError> {
        let raw: RawCatalog = serde_yml::from_str(yaml)?;

        let mut cards = BTreeMap::new();
        let mut register = |card: Card| -> Result<Arc<Card>, RulesError> {
            let id = card.id;
            let card = Arc::new(card);
            if cards.insert(id, Arc::clone(&card)).is_some() {
                return Err(RulesError::DuplicateCard(id));
            }
            Ok(card)
        };

        let resource = raw
            .resource
            .into_iter()
            .map(|r| register(r.into_card(CardKind::Resource)?))
            .collect::<Result<Vec<_>, _>>()?;
        let gold = raw
            .gold
            .into_iter()
            .map(|r| register(r.into_card(CardKind::Gold)?))
            .collect::<Result<Vec<_>, _>>()?;
        let starters = raw
            .starter
            .into_iter()
            .map(|r| register(r.into_card()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut objectives: Vec<ObjectiveCard> = Vec::with_capacity(raw.objectives.len());
        for entry in raw.objectives {
            let objective = entry.into_objective()?;
            if objectives.iter().any(|o| o.id == objective.id) {
                return Err(RulesError::DuplicateObjective(objective.id));
            }
            objectives.push(objective);
        }

        debug!(
            resource = resource.len(),
            gold = gold.len(),
            starters = starters.len(),
            objectives = objectives.len(),
            "card catalog loaded"
        );
        Ok(Self {
            cards,
            resource,
            gold,
            starters,
            objectives,
        })
    }

    /// The card with catalog number `id`.
    pub fn card(&self, id: CardId) -> Option<&Arc<Card>> {
        self.cards.get(&id)
    }

    /// The objective with catalog number `id`.
    pub fn objective(&self, id: ObjectiveId) -> Option<&ObjectiveCard> {
        self.objectives.iter().find(|o| o.id == id)
    }

    /// Resource cards in catalog order.
    pub fn resource_cards(&self) -> &[Arc<Card>] {
        &self.resource
    }

    /// Gold cards in catalog order.
    pub fn gold_cards(&self) -> &[Arc<Card>] {
        &self.gold
    }

    /// Starter cards in catalog order.
    pub fn starter_cards(&self) -> &[Arc<Card>] {
        &self.starters
    }

    /// Objectives in catalog order.
    pub fn objectives(&self) -> &[ObjectiveCard] {
        &self.objectives
    }

    /// Total number of playable cards.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether the catalog holds no playable card.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
