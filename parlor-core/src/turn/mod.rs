//! Turn-based protocol state machine.
//!
//! A symmetric contract on both peers: the same legality and terminal
//! functions run on each side, so applying the same ordered move sequence
//! to two independently initialized boards yields identical state. Only
//! incremental moves cross the wire; the sole full-state transfer is the
//! rematch baseline handoff.

pub mod machine;

pub use machine::{TurnError, TurnMachine, TurnPhase};

use crate::domain::Seat;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Terminal result of a finished game, before it is mapped to a local
/// perspective
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Winner(Seat),
    Draw,
}

/// Where the game stands after the most recent move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Play continues normally
    Continue,
    /// The opponent of the last mover gets exactly one final turn
    FinalTurn,
    /// The game is over
    Over(GameResult),
}

/// Outcome of a match from the local player's perspective.
///
/// `OpponentLeft` is deliberately distinguishable from a normal
/// win/loss/draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchOutcome {
    Won,
    Lost,
    Draw,
    OpponentLeft,
}

impl MatchOutcome {
    pub fn from_result(result: GameResult, my_seat: Seat) -> Self {
        match result {
            GameResult::Draw => MatchOutcome::Draw,
            GameResult::Winner(seat) if seat == my_seat => MatchOutcome::Won,
            GameResult::Winner(_) => MatchOutcome::Lost,
        }
    }
}

/// A discrete two-player game playable over the turn-based protocol.
///
/// Implementations must be deterministic: `validate`, `apply` and
/// `progress` depend only on the board state and the move, never on which
/// peer evaluates them. Any randomness lives inside the state (see
/// [`crate::rng::DeterministicRng`]) so it serializes with the board.
pub trait TurnGame: Serialize + DeserializeOwned + Clone {
    /// Wire representation of one move
    type Move: Serialize + DeserializeOwned + Clone + std::fmt::Debug;

    /// Check a move against the game's own legality rule, independent of
    /// the network layer. The reason string is surfaced to the caller.
    fn validate(&self, mv: &Self::Move, seat: Seat) -> Result<(), String>;

    /// Apply a previously validated move
    fn apply(&mut self, mv: &Self::Move, seat: Seat);

    /// Terminal/last-round detection after the most recent move
    fn progress(&self) -> Progress;

    /// Full-state export, used only for the rematch baseline handoff
    fn export(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Adopt a full state verbatim rather than re-deriving it
    fn import(state: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(state)
    }
}
