use crate::domain::Seat;
use crate::turn::{GameResult, MatchOutcome, Progress, TurnGame};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of the turn-based state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnPhase {
    /// No active game (before `GAME_START`, or between rematch offer and
    /// acceptance)
    WaitingForOpponent,
    MyTurn,
    OpponentTurn,
    /// One final turn is pending; `current` says whose it is
    LastRound,
    Ended,
}

impl fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnPhase::WaitingForOpponent => write!(f, "WaitingForOpponent"),
            TurnPhase::MyTurn => write!(f, "MyTurn"),
            TurnPhase::OpponentTurn => write!(f, "OpponentTurn"),
            TurnPhase::LastRound => write!(f, "LastRound"),
            TurnPhase::Ended => write!(f, "Ended"),
        }
    }
}

/// Errors surfaced by the turn machine. All of them are local no-ops:
/// nothing has been applied and nothing may be transmitted.
#[derive(Debug, thiserror::Error)]
pub enum TurnError {
    #[error("Not your turn")]
    NotYourTurn,

    #[error("No active game")]
    NoActiveGame,

    #[error("Match already over")]
    MatchOver,

    #[error("Illegal move: {0}")]
    IllegalMove(String),

    #[error("State transfer failed: {0}")]
    StateTransfer(#[from] serde_json::Error),
}

/// Symmetric turn-based state machine, one instance per peer.
///
/// A local move is validated and applied before any network effect; an
/// illegal move is rejected with no send. A remote move runs through the
/// same deterministic rule, which is what keeps the two board copies
/// consistent without ever transmitting full board state.
#[derive(Debug, Clone)]
pub struct TurnMachine<G: TurnGame> {
    game: Option<G>,
    seat: Seat,
    phase: TurnPhase,
    /// Whose move it is right now (meaningful in MyTurn/OpponentTurn/LastRound)
    current: Seat,
    outcome: Option<MatchOutcome>,
}

impl<G: TurnGame> TurnMachine<G> {
    /// A machine with no board yet; `begin` or `adopt` starts play
    pub fn awaiting(seat: Seat) -> Self {
        Self {
            game: None,
            seat,
            phase: TurnPhase::WaitingForOpponent,
            current: Seat::Starter,
            outcome: None,
        }
    }

    /// Start play on a fresh board. `starter` is the seat that moves
    /// first (the side that was hosting).
    pub fn begin(&mut self, game: G, starter: Seat) {
        self.game = Some(game);
        self.current = starter;
        self.outcome = None;
        self.phase = if starter == self.seat {
            TurnPhase::MyTurn
        } else {
            TurnPhase::OpponentTurn
        };
    }

    pub fn new(game: G, seat: Seat, starter: Seat) -> Self {
        let mut machine = Self::awaiting(seat);
        machine.begin(game, starter);
        machine
    }

    // ===== Queries =====

    pub fn seat(&self) -> Seat {
        self.seat
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn current(&self) -> Seat {
        self.current
    }

    pub fn game(&self) -> Option<&G> {
        self.game.as_ref()
    }

    pub fn outcome(&self) -> Option<MatchOutcome> {
        self.outcome
    }

    pub fn is_my_turn(&self) -> bool {
        match self.phase {
            TurnPhase::MyTurn => true,
            TurnPhase::LastRound => self.current == self.seat,
            _ => false,
        }
    }

    // ===== Transitions =====

    /// Submit a local move. Legal only while it is our turn; the move is
    /// validated by the game rule and, only if legal, applied locally and
    /// returned for transmission.
    pub fn submit(&mut self, mv: G::Move) -> Result<G::Move, TurnError> {
        if self.phase == TurnPhase::Ended {
            return Err(TurnError::MatchOver);
        }
        if !self.is_my_turn() {
            return Err(TurnError::NotYourTurn);
        }

        let seat = self.seat;
        self.play(&mv, seat)?;
        Ok(mv)
    }

    /// Apply a move received from the opponent through the same
    /// deterministic rule
    pub fn receive(&mut self, mv: G::Move) -> Result<(), TurnError> {
        if self.phase == TurnPhase::Ended {
            return Err(TurnError::MatchOver);
        }
        if self.is_my_turn() || self.phase == TurnPhase::WaitingForOpponent {
            return Err(TurnError::NotYourTurn);
        }

        let seat = self.seat.other();
        self.play(&mv, seat)
    }

    fn play(&mut self, mv: &G::Move, seat: Seat) -> Result<(), TurnError> {
        let game = self.game.as_mut().ok_or(TurnError::NoActiveGame)?;

        game.validate(mv, seat).map_err(TurnError::IllegalMove)?;
        game.apply(mv, seat);

        match game.progress() {
            Progress::Continue => {
                self.current = seat.other();
                self.phase = if self.current == self.seat {
                    TurnPhase::MyTurn
                } else {
                    TurnPhase::OpponentTurn
                };
            }
            Progress::FinalTurn => {
                self.current = seat.other();
                self.phase = TurnPhase::LastRound;
            }
            Progress::Over(result) => {
                self.finish(result);
            }
        }

        Ok(())
    }

    fn finish(&mut self, result: GameResult) {
        self.phase = TurnPhase::Ended;
        self.outcome = Some(MatchOutcome::from_result(result, self.seat));
    }

    /// The opponent left or vanished; terminal, and distinguishable from
    /// a played-out result
    pub fn opponent_left(&mut self) {
        self.phase = TurnPhase::Ended;
        self.outcome = Some(MatchOutcome::OpponentLeft);
    }

    // ===== Rematch =====

    /// Initiate a rematch: re-initialize the board locally and export the
    /// complete initial state for the one full-state handoff
    pub fn rematch_initiate(
        &mut self,
        game: G,
        starter: Seat,
    ) -> Result<serde_json::Value, TurnError> {
        let state = game.export()?;
        self.begin(game, starter);
        Ok(state)
    }

    /// Adopt a rematch baseline verbatim rather than re-deriving it
    pub fn rematch_adopt(
        &mut self,
        state: serde_json::Value,
        starter: Seat,
    ) -> Result<(), TurnError> {
        let game = G::import(state)?;
        self.begin(game, starter);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::turn::Progress;

    /// Counting game: each move adds to a shared total; the game enters
    /// its final round at `limit - 1` and ends at `limit`. Odd totals are
    /// illegal to add, to exercise rejection.
    #[derive(Debug, Clone, Serialize, Deserialize)]
    struct Counting {
        total: u32,
        limit: u32,
        last_mover: Option<Seat>,
    }

    impl Counting {
        fn new(limit: u32) -> Self {
            Self {
                total: 0,
                limit,
                last_mover: None,
            }
        }
    }

    impl TurnGame for Counting {
        type Move = u32;

        fn validate(&self, mv: &u32, _seat: Seat) -> Result<(), String> {
            if *mv == 0 || *mv > 2 {
                return Err(format!("may only add 1 or 2, not {mv}"));
            }
            Ok(())
        }

        fn apply(&mut self, mv: &u32, seat: Seat) {
            self.total += *mv;
            self.last_mover = Some(seat);
        }

        fn progress(&self) -> Progress {
            if self.total >= self.limit {
                Progress::Over(GameResult::Winner(self.last_mover.unwrap_or(Seat::Starter)))
            } else if self.total == self.limit - 1 {
                Progress::FinalTurn
            } else {
                Progress::Continue
            }
        }
    }

    fn pair(limit: u32) -> (TurnMachine<Counting>, TurnMachine<Counting>) {
        let starter = TurnMachine::new(Counting::new(limit), Seat::Starter, Seat::Starter);
        let responder = TurnMachine::new(Counting::new(limit), Seat::Responder, Seat::Starter);
        (starter, responder)
    }

    #[test]
    fn test_initial_phases() {
        let (a, b) = pair(10);
        assert_eq!(a.phase(), TurnPhase::MyTurn);
        assert_eq!(b.phase(), TurnPhase::OpponentTurn);
        assert!(a.is_my_turn());
        assert!(!b.is_my_turn());
    }

    #[test]
    fn test_alternation_stays_consistent() {
        let (mut a, mut b) = pair(10);

        let mv = a.submit(2).unwrap();
        b.receive(mv).unwrap();

        assert_eq!(a.phase(), TurnPhase::OpponentTurn);
        assert_eq!(b.phase(), TurnPhase::MyTurn);

        let mv = b.submit(1).unwrap();
        a.receive(mv).unwrap();

        assert_eq!(a.phase(), TurnPhase::MyTurn);
        assert_eq!(b.phase(), TurnPhase::OpponentTurn);
    }

    #[test]
    fn test_out_of_turn_submit_rejected() {
        let (_, mut b) = pair(10);

        let err = b.submit(1).unwrap_err();
        assert!(matches!(err, TurnError::NotYourTurn));
        // The board is untouched
        assert_eq!(b.game().unwrap().total, 0);
    }

    #[test]
    fn test_illegal_move_rejected_before_any_effect() {
        let (mut a, _) = pair(10);

        let err = a.submit(7).unwrap_err();
        assert!(matches!(err, TurnError::IllegalMove(_)));
        assert_eq!(a.game().unwrap().total, 0);
        assert_eq!(a.phase(), TurnPhase::MyTurn);
    }

    #[test]
    fn test_deterministic_replay_on_both_copies() {
        let (mut a, mut b) = pair(30);
        let moves = [2u32, 1, 2, 2, 1, 1, 2, 1];

        for (i, mv) in moves.iter().enumerate() {
            if i % 2 == 0 {
                let sent = a.submit(*mv).unwrap();
                b.receive(sent).unwrap();
            } else {
                let sent = b.submit(*mv).unwrap();
                a.receive(sent).unwrap();
            }
        }

        assert_eq!(a.game().unwrap().total, b.game().unwrap().total);
        assert_eq!(a.phase(), TurnPhase::MyTurn);
        assert_eq!(b.phase(), TurnPhase::OpponentTurn);
    }

    #[test]
    fn test_last_round_then_end() {
        // limit 4: after total reaches 3 the other side has one final turn
        let (mut a, mut b) = pair(4);

        let mv = a.submit(2).unwrap(); // total 2
        b.receive(mv).unwrap();
        let mv = b.submit(1).unwrap(); // total 3: final turn pending
        a.receive(mv).unwrap();

        assert_eq!(a.phase(), TurnPhase::LastRound);
        assert_eq!(b.phase(), TurnPhase::LastRound);
        assert!(a.is_my_turn());
        assert!(!b.is_my_turn());

        let mv = a.submit(1).unwrap(); // total 4: over, a moved last
        b.receive(mv).unwrap();

        assert_eq!(a.phase(), TurnPhase::Ended);
        assert_eq!(b.phase(), TurnPhase::Ended);
        assert_eq!(a.outcome(), Some(MatchOutcome::Won));
        assert_eq!(b.outcome(), Some(MatchOutcome::Lost));
    }

    #[test]
    fn test_moves_after_end_rejected() {
        let (mut a, mut b) = pair(2);
        let mv = a.submit(2).unwrap();
        b.receive(mv).unwrap();

        assert!(matches!(a.submit(1), Err(TurnError::MatchOver)));
        assert!(matches!(b.receive(1), Err(TurnError::MatchOver)));
    }

    #[test]
    fn test_opponent_left_is_distinguishable() {
        let (mut a, _) = pair(10);
        a.opponent_left();

        assert_eq!(a.phase(), TurnPhase::Ended);
        assert_eq!(a.outcome(), Some(MatchOutcome::OpponentLeft));
    }

    #[test]
    fn test_rematch_handoff_resynchronizes() {
        let (mut a, mut b) = pair(4);
        let mv = a.submit(2).unwrap();
        b.receive(mv).unwrap();
        let mv = b.submit(2).unwrap();
        a.receive(mv).unwrap();
        assert_eq!(a.phase(), TurnPhase::Ended);

        // Initiator resets its board and ships the complete baseline once
        let state = a.rematch_initiate(Counting::new(4), Seat::Starter).unwrap();
        b.rematch_adopt(state, Seat::Starter).unwrap();

        assert_eq!(a.phase(), TurnPhase::MyTurn);
        assert_eq!(b.phase(), TurnPhase::OpponentTurn);
        assert_eq!(a.game().unwrap().total, 0);
        assert_eq!(b.game().unwrap().total, 0);
        assert!(a.outcome().is_none());
    }

    #[test]
    fn test_awaiting_machine_accepts_nothing() {
        let mut machine: TurnMachine<Counting> = TurnMachine::awaiting(Seat::Responder);
        assert_eq!(machine.phase(), TurnPhase::WaitingForOpponent);

        assert!(matches!(machine.submit(1), Err(TurnError::NotYourTurn)));
        assert!(matches!(machine.receive(1), Err(TurnError::NotYourTurn)));
    }
}
