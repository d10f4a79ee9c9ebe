//! Inbound and outbound message types for client-server communication.
//!
//! Both directions are self-describing: inbound messages carry an `action`
//! tag, outbound ones a `type` tag, so any general-purpose codec can route
//! them without out-of-band framing.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{ActionKind, DrawSource, RejectionReason, Side};
use crate::ids::ObjectiveId;
use crate::structs::{Coordinate, GameView};

/// A request sent by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "action")]
#[ts(export, export_to = "bindings/")]
pub enum ClientMessage {
    /// Open a new game and take its first seat.
    CreateGame {
        /// Unique game name.
        game_name: String,
        /// Number of seats.
        player_count: u32,
        /// Name of the creating player.
        player_name: String,
    },
    /// Take a seat in an existing game, or reclaim a disconnected one.
    JoinGame {
        /// Game to join.
        game_name: String,
        /// Player name.
        player_name: String,
    },
    /// Place a card. During setup this places the starter at the origin
    /// and `hand_index` is ignored.
    PlaceCard {
        /// Target cell.
        coordinate: Coordinate,
        /// Face to show.
        side: Side,
        /// Index of the card in hand.
        hand_index: u32,
    },
    /// Draw a card to end the turn.
    DrawCard {
        /// Where to draw from.
        source: DrawSource,
    },
    /// Pick the secret objective during setup.
    ChooseObjective {
        /// One of the offered candidates.
        objective_id: ObjectiveId,
    },
}

impl ClientMessage {
    /// The action tag of this message.
    pub const fn kind(&self) -> ActionKind {
        match self {
            Self::CreateGame { .. } => ActionKind::CreateGame,
            Self::JoinGame { .. } => ActionKind::JoinGame,
            Self::PlaceCard { .. } => ActionKind::PlaceCard,
            Self::DrawCard { .. } => ActionKind::DrawCard,
            Self::ChooseObjective { .. } => ActionKind::ChooseObjective,
        }
    }
}

/// A message pushed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type")]
#[ts(export, export_to = "bindings/")]
pub enum ServerMessage {
    /// Sent once a create or join succeeds, before the first snapshot.
    Welcome {
        /// Joined game.
        game_name: String,
        /// Seat assigned to this connection.
        seat: u32,
        /// Player name.
        player_name: String,
        /// Whether an existing disconnected seat was reclaimed.
        reconnected: bool,
    },
    /// The full game state after a committed mutation.
    Snapshot {
        /// Shared immutable view.
        view: Arc<GameView>,
    },
    /// The issuer's action was rejected; nothing changed.
    Rejected {
        /// Which action.
        action: ActionKind,
        /// Why.
        reason: RejectionReason,
        /// Human-readable explanation.
        message: String,
    },
    /// The inbound message could not be understood.
    ProtocolError {
        /// What went wrong.
        message: String,
    },
}

impl ServerMessage {
    /// Build a [`ServerMessage::Rejected`] with the standard description.
    pub fn rejected(action: ActionKind, reason: RejectionReason) -> Self {
        Self::Rejected {
            action,
            reason,
            message: String::from(reason.describe()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_messages_are_tagged_by_action() {
        let json = r#"{"action":"JoinGame","game_name":"g1","player_name":"Bob"}"#;
        let msg: Result<ClientMessage, _> = serde_json::from_str(json);
        let msg = msg.ok();
        assert_eq!(
            msg,
            Some(ClientMessage::JoinGame {
                game_name: String::from("g1"),
                player_name: String::from("Bob"),
            })
        );
        assert_eq!(msg.map(|m| m.kind()), Some(ActionKind::JoinGame));
    }

    #[test]
    fn place_card_parses_nested_coordinate() {
        let json = r#"{"action":"PlaceCard","coordinate":{"x":1,"y":-1},"side":"Back","hand_index":2}"#;
        let msg: Result<ClientMessage, _> = serde_json::from_str(json);
        assert_eq!(
            msg.ok(),
            Some(ClientMessage::PlaceCard {
                coordinate: Coordinate::new(1, -1),
                side: Side::Back,
                hand_index: 2,
            })
        );
    }

    #[test]
    fn unknown_action_is_an_error() {
        let json = r#"{"action":"FlipTable"}"#;
        let msg: Result<ClientMessage, _> = serde_json::from_str(json);
        assert!(msg.is_err());
    }

    #[test]
    fn rejections_carry_a_message() {
        let msg = ServerMessage::rejected(ActionKind::PlaceCard, RejectionReason::Occupied);
        let json = serde_json::to_value(&msg).unwrap_or_default();
        assert_eq!(json["type"], "Rejected");
        assert_eq!(json["reason"], "Occupied");
        assert_eq!(json["message"], RejectionReason::Occupied.describe());
    }
}
