//! Error types for the codex-core crate.

use codex_rules::{PlaceError, RulesError};
use codex_types::RejectionReason;

/// Internal faults in the game state machine.
///
/// None of these can be caused by a well-formed player action; they are
/// logged at `error!` and reported to the issuer as an internal rejection.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// The catalog does not hold enough cards to deal.
    #[error("not enough {what} to deal")]
    DeckTooSmall {
        /// Which pile ran out.
        what: &'static str,
    },

    /// A rules-engine bookkeeping failure.
    #[error("rules fault: {source}")]
    Rules {
        /// The underlying rules error.
        #[from]
        source: RulesError,
    },
}

/// Why a player action did not take effect.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    /// The action breaks a rule. Nothing was changed.
    #[error("rejected: {}", .0.describe())]
    Rejected(RejectionReason),

    /// Applying the action failed internally. Nothing was changed.
    #[error(transparent)]
    Fault(#[from] GameError),
}

impl ActionError {
    /// The reason reported to the issuer.
    pub const fn reason(&self) -> RejectionReason {
        match self {
            Self::Rejected(reason) => *reason,
            Self::Fault(_) => RejectionReason::Internal,
        }
    }
}

impl From<RejectionReason> for ActionError {
    fn from(reason: RejectionReason) -> Self {
        Self::Rejected(reason)
    }
}

impl From<PlaceError> for ActionError {
    fn from(err: PlaceError) -> Self {
        match err {
            PlaceError::Rejected(reason) => Self::Rejected(reason),
            PlaceError::Rules(source) => Self::Fault(GameError::Rules { source }),
        }
    }
}

/// Errors talking to a game session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The session task has stopped.
    #[error("game session {0} is closed")]
    Closed(String),

    /// The session rejected the request.
    #[error("rejected: {}", .0.describe())]
    Rejected(RejectionReason),
}

impl SessionError {
    /// The reason reported to the client.
    pub const fn reason(&self) -> RejectionReason {
        match self {
            Self::Closed(_) => RejectionReason::GameClosed,
            Self::Rejected(reason) => *reason,
        }
    }
}

impl From<RejectionReason> for SessionError {
    fn from(reason: RejectionReason) -> Self {
        Self::Rejected(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faults_are_reported_as_internal() {
        let err = ActionError::from(GameError::DeckTooSmall { what: "starters" });
        assert_eq!(err.reason(), RejectionReason::Internal);
        let err = ActionError::from(PlaceError::Rejected(RejectionReason::Occupied));
        assert_eq!(err.reason(), RejectionReason::Occupied);
    }

    #[test]
    fn closed_sessions_map_to_game_closed() {
        let err = SessionError::Closed(String::from("g1"));
        assert_eq!(err.reason(), RejectionReason::GameClosed);
        assert_eq!(err.to_string(), "game session g1 is closed");
    }
}
