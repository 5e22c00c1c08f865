use crate::domain::PlayerId;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Which synchronization discipline a session uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Discipline {
    /// Continuous physics state, snapshots + interpolation, lossy-tolerant
    Realtime,
    /// Discrete moves, strict alternation, order-sensitive
    TurnBased,
}

impl fmt::Display for Discipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discipline::Realtime => write!(f, "Realtime"),
            Discipline::TurnBased => write!(f, "TurnBased"),
        }
    }
}

/// Which side of a two-player session a player occupies.
///
/// The side that was `Hosting` when the match was made is always the
/// `Starter`. This keeps the first-move rule deterministic and symmetric
/// regardless of clock skew.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum Seat {
    /// The side that offered the room; moves first
    Starter,
    /// The side that joined; moves second
    Responder,
}

impl Seat {
    pub fn other(self) -> Seat {
        match self {
            Seat::Starter => Seat::Responder,
            Seat::Responder => Seat::Starter,
        }
    }

    /// Index into two-element per-seat arrays
    pub fn index(self) -> usize {
        match self {
            Seat::Starter => 0,
            Seat::Responder => 1,
        }
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seat::Starter => write!(f, "Starter"),
            Seat::Responder => write!(f, "Responder"),
        }
    }
}

/// The pairing of exactly two players once matched.
///
/// Created on a successful room join, destroyed on leave, disconnect or
/// declined rematch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GameSession {
    id: Uuid,
    /// `players[0]` is the starter (the side that was hosting)
    players: [PlayerId; 2],
    discipline: Discipline,
}

impl GameSession {
    pub fn new(starter: PlayerId, responder: PlayerId, discipline: Discipline) -> Self {
        Self {
            id: Uuid::new_v4(),
            players: [starter, responder],
            discipline,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn discipline(&self) -> Discipline {
        self.discipline
    }

    pub fn starter(&self) -> &PlayerId {
        &self.players[0]
    }

    pub fn responder(&self) -> &PlayerId {
        &self.players[1]
    }

    pub fn players(&self) -> &[PlayerId; 2] {
        &self.players
    }

    pub fn contains(&self, player: &PlayerId) -> bool {
        self.players.iter().any(|p| p == player)
    }

    /// The other participant, if `player` is in this session
    pub fn opponent_of(&self, player: &PlayerId) -> Option<&PlayerId> {
        if &self.players[0] == player {
            Some(&self.players[1])
        } else if &self.players[1] == player {
            Some(&self.players[0])
        } else {
            None
        }
    }

    pub fn seat_of(&self, player: &PlayerId) -> Option<Seat> {
        if &self.players[0] == player {
            Some(Seat::Starter)
        } else if &self.players[1] == player {
            Some(Seat::Responder)
        } else {
            None
        }
    }
}
