//! Error types for the codex-rules crate.
//!
//! Rule violations a player can cause are reported as a
//! [`RejectionReason`]; everything here is either a catalog problem found
//! at load time or an internal fault that should never happen in play.

use codex_types::{CardId, ObjectiveId, RejectionReason, Symbol};

/// Errors raised by catalog loading and rule bookkeeping.
#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    /// The deck catalog is not valid YAML for the expected schema.
    #[error("failed to parse card catalog: {source}")]
    CatalogParse {
        /// The underlying parse error.
        #[from]
        source: serde_yml::Error,
    },

    /// Two cards in the catalog share an id.
    #[error("duplicate card id in catalog: {0}")]
    DuplicateCard(CardId),

    /// Two objectives in the catalog share an id.
    #[error("duplicate objective id in catalog: {0}")]
    DuplicateObjective(ObjectiveId),

    /// A catalog entry is structurally wrong.
    #[error("invalid catalog entry {id}: {reason}")]
    InvalidEntry {
        /// Id of the offending entry.
        id: u16,
        /// What is wrong with it.
        reason: String,
    },

    /// Removing a symbol would make a store negative.
    #[error("resource underflow: wanted {requested} of {symbol:?} but only have {available}")]
    ResourceUnderflow {
        /// The symbol being removed.
        symbol: Symbol,
        /// The quantity the caller attempted to remove.
        requested: u32,
        /// The quantity actually held.
        available: u32,
    },

    /// A counter went past its integer range.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// What was being computed.
        context: String,
    },
}

/// Why a placement did not happen.
#[derive(Debug, thiserror::Error)]
pub enum PlaceError {
    /// The move breaks a placement rule. Nothing was changed.
    #[error("placement rejected: {}", .0.describe())]
    Rejected(RejectionReason),

    /// Bookkeeping failed. Nothing was changed.
    #[error(transparent)]
    Rules(#[from] RulesError),
}

impl From<RejectionReason> for PlaceError {
    fn from(reason: RejectionReason) -> Self {
        Self::Rejected(reason)
    }
}
