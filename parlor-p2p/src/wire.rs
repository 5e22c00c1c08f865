//! Wire envelope.
//!
//! One internally-tagged enum covers the whole protocol. Decoding is
//! total: an unrecognized `type` (a newer peer speaking a newer dialect)
//! decodes to [`Envelope::Unknown`] and is ignored at debug level, never
//! an error. Real-time payloads ride inside `GAME_MOVE` via [`MoveKind`],
//! so the host's relay treats them like any other game traffic.

use parlor_core::{Discipline, GameSession, PlayerId, PlayerRecord};
use serde::{Deserialize, Serialize};

/// What a `GAME_MOVE` payload contains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveKind {
    #[serde(rename = "TURN_MOVE")]
    TurnMove,
    #[serde(rename = "ARENA_INPUT")]
    ArenaInput,
    #[serde(rename = "ARENA_SNAPSHOT")]
    ArenaSnapshot,
    #[serde(rename = "ARENA_EVENT")]
    ArenaEvent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Envelope {
    /// First message on a fresh link; registers the sender in the roster
    #[serde(rename = "HELLO")]
    Hello { name: String, avatar: String },

    /// Full-roster broadcast, replacing the receiver's mirror wholesale
    #[serde(rename = "PLAYER_LIST")]
    PlayerList { roster: Vec<PlayerRecord> },

    #[serde(rename = "CREATE_ROOM")]
    CreateRoom { discipline: Discipline },

    #[serde(rename = "CANCEL_HOSTING")]
    CancelHosting,

    #[serde(rename = "JOIN_ROOM")]
    JoinRoom { target: PlayerId },

    /// Sent to both matched players; `starts_first` is true for the side
    /// that was hosting
    #[serde(rename = "GAME_START")]
    GameStart {
        session: GameSession,
        opponent: PlayerId,
        starts_first: bool,
        discipline: Discipline,
    },

    /// Relay-tagged game traffic; the host forwards it to `to` without
    /// rewriting the bytes
    #[serde(rename = "GAME_MOVE")]
    GameMove {
        to: PlayerId,
        kind: MoveKind,
        payload: serde_json::Value,
    },

    #[serde(rename = "LEAVE_GAME")]
    LeaveGame { from: PlayerId },

    /// The one full-state transfer: the rematch baseline
    #[serde(rename = "REMATCH_START")]
    RematchStart { state: serde_json::Value },

    #[serde(rename = "PING")]
    Ping,

    #[serde(rename = "PONG")]
    Pong,

    /// Any type this dialect does not know
    #[serde(other)]
    Unknown,
}

impl Envelope {
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Total decoding: malformed bytes and unknown types both come back
    /// as `Unknown`
    pub fn decode(bytes: &[u8]) -> Envelope {
        match serde_json::from_slice(bytes) {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::debug!(%err, len = bytes.len(), "undecodable envelope ignored");
                Envelope::Unknown
            }
        }
    }
}
