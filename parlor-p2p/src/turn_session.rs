//! Turn-based session wire driver.
//!
//! Thin mapping between the symmetric [`TurnMachine`] and `GAME_MOVE` /
//! `REMATCH_START` payloads. Validation happens in the machine before
//! anything is handed back for transmission, so an illegal move never
//! reaches the wire.

use crate::error::Result;
use crate::wire::MoveKind;
use parlor_core::{MatchOutcome, Seat, TurnError, TurnGame, TurnMachine, TurnPhase};

pub struct TurnSession<G: TurnGame> {
    machine: TurnMachine<G>,
    starter: Seat,
}

impl<G: TurnGame> TurnSession<G> {
    /// Start a session on a fresh board. `starts_first` comes straight
    /// from `GAME_START`.
    pub fn begin(game: G, starts_first: bool) -> Self {
        let seat = if starts_first {
            Seat::Starter
        } else {
            Seat::Responder
        };
        Self {
            machine: TurnMachine::new(game, seat, Seat::Starter),
            starter: Seat::Starter,
        }
    }

    // ===== Queries =====

    pub fn machine(&self) -> &TurnMachine<G> {
        &self.machine
    }

    pub fn phase(&self) -> TurnPhase {
        self.machine.phase()
    }

    pub fn is_my_turn(&self) -> bool {
        self.machine.is_my_turn()
    }

    pub fn outcome(&self) -> Option<MatchOutcome> {
        self.machine.outcome()
    }

    // ===== Wire mapping =====

    /// Submit a local move; on success returns the payload to send as a
    /// `GAME_MOVE` with [`MoveKind::TurnMove`]
    pub fn submit(&mut self, mv: G::Move) -> std::result::Result<serde_json::Value, TurnError> {
        let mv = self.machine.submit(mv)?;
        Ok(serde_json::to_value(&mv).map_err(TurnError::StateTransfer)?)
    }

    /// Apply an inbound payload from the opponent
    pub fn handle(&mut self, kind: MoveKind, payload: serde_json::Value) -> Result<()> {
        if kind != MoveKind::TurnMove {
            tracing::debug!(?kind, "non-turn payload ignored by turn session");
            return Ok(());
        }

        let mv: G::Move = serde_json::from_value(payload)?;
        if let Err(err) = self.machine.receive(mv) {
            // A misbehaving or desynced peer; our board stays untouched
            tracing::warn!(%err, "remote move rejected");
        }
        Ok(())
    }

    pub fn opponent_left(&mut self) {
        self.machine.opponent_left();
    }

    // ===== Rematch =====

    /// Re-initialize the board and export the baseline for the one
    /// full-state handoff. Only the session's original starter initiates.
    pub fn rematch_initiate(
        &mut self,
        game: G,
    ) -> std::result::Result<serde_json::Value, TurnError> {
        self.machine.rematch_initiate(game, self.starter)
    }

    /// Adopt a rematch baseline verbatim
    pub fn rematch_adopt(&mut self, state: serde_json::Value) -> std::result::Result<(), TurnError> {
        self.machine.rematch_adopt(state, self.starter)
    }
}
