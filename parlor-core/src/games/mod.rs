//! Built-in turn-based games.
//!
//! Both implement [`crate::turn::TurnGame`], so they share the same wire
//! protocol and state machine; the game rule is the only thing that
//! differs.

pub mod pile;
pub mod tictactoe;

pub use pile::{Card, PileGame, PileMove};
pub use tictactoe::{Mark, TicTacToe, TicTacToeMove};
