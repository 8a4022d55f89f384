//! JSON wire protocol spoken over the WebSocket.
//!
//! Both directions use internally-tagged messages (`{"type": "...", ...}`)
//! with camelCase names, so payloads stay readable in browser dev tools.

use serde::{Deserialize, Serialize};

use crate::action::{Action, PlayerId};
use crate::card::{Card, Suit};
use crate::state::{Effect, GameStateView};

/// Messages sent from client to server.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Pick a display name. Required before any room operation.
    Identify { name: String },
    CreateRoom,
    JoinRoom { code: String },
    LeaveRoom,
    /// Host only; needs at least two members.
    StartGame,
    PlayCards { cards: Vec<Card> },
    DrawCard,
    CallGame,
    ChooseSuit { suit: Suit },
}

impl ClientMessage {
    /// The engine intent this message carries, if any.
    pub fn action(&self) -> Option<Action> {
        match self {
            Self::PlayCards { cards } => Some(Action::Play {
                cards: cards.clone(),
            }),
            Self::DrawCard => Some(Action::Draw),
            Self::CallGame => Some(Action::CallGame),
            Self::ChooseSuit { suit } => Some(Action::ChooseSuit { suit: *suit }),
            _ => None,
        }
    }
}

/// Messages sent from server to client.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Identification acknowledged; `player_id` is connection-scoped.
    Connected { player_id: u64, name: String },
    RoomCreated { code: String, room: RoomSnapshot },
    RoomJoined { code: String, room: RoomSnapshot },
    RoomNotFound { code: String },
    RoomFull { code: String },
    /// Roster changed (join, leave, host migration, connectivity).
    PlayerUpdate { room: RoomSnapshot },
    /// Match started; `state` is this client's redacted view.
    GameStart { state: GameStateView },
    /// Fresh redacted view plus the effects that produced it.
    GameStateUpdate {
        state: GameStateView,
        effects: Vec<Effect>,
    },
    /// The current player ran out of time and was forced to draw.
    TurnTimeout { player_id: PlayerId },
    GameEnd {
        winner: PlayerId,
        winner_name: String,
        scores: Vec<u32>,
    },
    PlayerDisconnected {
        player_id: PlayerId,
        name: String,
        grace_seconds: u64,
    },
    Error { message: String },
}

/// Roster view of a room, sent with every membership change.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub code: String,
    pub players: Vec<PlayerSummary>,
    pub max_players: usize,
    pub in_game: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSummary {
    pub name: String,
    pub host: bool,
    pub connected: bool,
    pub seat: Option<PlayerId>,
}

impl ServerMessage {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("serialize server message")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Rank;

    #[test]
    fn client_messages_use_camel_case_tags() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"joinRoom","code":"AB12CD"}"#)
            .unwrap();
        assert_eq!(
            msg,
            ClientMessage::JoinRoom {
                code: "AB12CD".into()
            }
        );
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"drawCard"}"#).unwrap();
        assert_eq!(msg, ClientMessage::DrawCard);
    }

    #[test]
    fn cards_travel_as_glyph_suits_and_rank_labels() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"playCards","cards":[{"suit":"♥","rank":"8"}]}"#)
                .unwrap();
        assert_eq!(
            msg.action(),
            Some(Action::Play {
                cards: vec![Card::new(Suit::Hearts, Rank::Eight)]
            })
        );
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"chooseSuit","suit":"♠"}"#)
            .unwrap();
        assert_eq!(msg.action(), Some(Action::ChooseSuit { suit: Suit::Spades }));
    }

    #[test]
    fn unknown_type_is_rejected() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"teleport"}"#).is_err());
    }

    #[test]
    fn server_messages_use_camel_case_tags_and_fields() {
        let json = ServerMessage::RoomNotFound {
            code: "XXXXXX".into(),
        }
        .to_json();
        assert!(json.contains(r#""type":"roomNotFound""#));

        let json = ServerMessage::PlayerDisconnected {
            player_id: 1,
            name: "ada".into(),
            grace_seconds: 30,
        }
        .to_json();
        assert!(json.contains(r#""playerId":1"#));
        assert!(json.contains(r#""graceSeconds":30"#));

        let json = ServerMessage::TurnTimeout { player_id: 0 }.to_json();
        assert!(json.contains(r#""playerId":0"#));

        let json = ServerMessage::Connected {
            player_id: 7,
            name: "ada".into(),
        }
        .to_json();
        assert!(json.contains(r#""playerId":7"#));

        let json = ServerMessage::GameEnd {
            winner: 1,
            winner_name: "ada".into(),
            scores: vec![0, 17],
        }
        .to_json();
        assert!(json.contains(r#""winnerName":"ada""#));
    }
}
