pub mod player;
pub mod roster;
pub mod session;

pub use player::{PlayerError, PlayerId, PlayerRecord, PlayerStatus};
pub use roster::{Roster, RosterError};
pub use session::{Discipline, GameSession, Seat};
