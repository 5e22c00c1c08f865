use crate::domain::Seat;
use crate::turn::{GameResult, Progress, TurnGame};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Mark on the board; the starter always plays `X`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    pub fn for_seat(seat: Seat) -> Self {
        match seat {
            Seat::Starter => Mark::X,
            Seat::Responder => Mark::O,
        }
    }

    pub fn seat(self) -> Seat {
        match self {
            Mark::X => Seat::Starter,
            Mark::O => Seat::Responder,
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mark::X => write!(f, "X"),
            Mark::O => write!(f, "O"),
        }
    }
}

/// One move: place your mark in a cell (row-major, 0..9)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicTacToeMove {
    pub cell: usize,
}

/// 3x3 alignment duel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TicTacToe {
    cells: [Option<Mark>; 9],
}

const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

impl TicTacToe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cell(&self, index: usize) -> Option<Mark> {
        self.cells.get(index).copied().flatten()
    }

    fn winner(&self) -> Option<Mark> {
        LINES.iter().find_map(|line| {
            let first = self.cells[line[0]]?;
            if line.iter().all(|&i| self.cells[i] == Some(first)) {
                Some(first)
            } else {
                None
            }
        })
    }

    fn is_full(&self) -> bool {
        self.cells.iter().all(|c| c.is_some())
    }
}

impl TurnGame for TicTacToe {
    type Move = TicTacToeMove;

    fn validate(&self, mv: &TicTacToeMove, _seat: Seat) -> Result<(), String> {
        if mv.cell >= 9 {
            return Err(format!("cell {} out of range", mv.cell));
        }
        if self.cells[mv.cell].is_some() {
            return Err(format!("cell {} is already taken", mv.cell));
        }
        Ok(())
    }

    fn apply(&mut self, mv: &TicTacToeMove, seat: Seat) {
        self.cells[mv.cell] = Some(Mark::for_seat(seat));
    }

    fn progress(&self) -> Progress {
        if let Some(mark) = self.winner() {
            Progress::Over(GameResult::Winner(mark.seat()))
        } else if self.is_full() {
            Progress::Over(GameResult::Draw)
        } else {
            Progress::Continue
        }
    }
}
