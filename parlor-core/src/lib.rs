// Pure domain: no networking, no async. The wire and runtime layers live
// in `parlor-p2p`.

pub mod arena;
pub mod domain;
pub mod games;
pub mod profile;
pub mod rng;
pub mod turn;

pub use domain::{
    Discipline, GameSession, PlayerId, PlayerRecord, PlayerStatus, Roster, RosterError, Seat,
};
pub use profile::{MemoryProfileStore, ProfileError, ProfileStore, ProfileSummary};
pub use turn::{GameResult, MatchOutcome, Progress, TurnError, TurnGame, TurnMachine, TurnPhase};
