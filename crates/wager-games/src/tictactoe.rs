//! Tic-tac-toe: 3×3, creator marks first, three in a row wins.

use serde::{Deserialize, Serialize};
use wager_types::{GameType, Outcome, Result, Seat, WagerError};

use crate::rules::{GameRules, ensure_unresolved};

pub const SIZE: usize = 3;

/// The 8 winning lines: 3 rows, 3 columns, 2 diagonals.
const LINES: [[(usize, usize); 3]; 8] = [
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    [(0, 0), (1, 1), (2, 2)],
    [(0, 2), (1, 1), (2, 0)],
];

/// Place a mark at `(row, col)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mark {
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicTacToe {
    board: [[Option<Seat>; SIZE]; SIZE],
    to_move: Seat,
    moves: u8,
    outcome: Outcome,
}

impl TicTacToe {
    #[must_use]
    pub fn new() -> Self {
        Self {
            board: [[None; SIZE]; SIZE],
            to_move: Seat::Creator,
            moves: 0,
            outcome: Outcome::Unresolved,
        }
    }

    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Option<Seat> {
        self.board.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    #[must_use]
    pub fn to_move(&self) -> Seat {
        self.to_move
    }

    #[must_use]
    pub fn moves(&self) -> u8 {
        self.moves
    }

    /// Number of complete lines held by `seat`.
    #[must_use]
    pub fn completed_lines(&self, seat: Seat) -> usize {
        LINES
            .iter()
            .filter(|line| line.iter().all(|&(r, c)| self.board[r][c] == Some(seat)))
            .count()
    }
}

impl Default for TicTacToe {
    fn default() -> Self {
        Self::new()
    }
}

impl GameRules for TicTacToe {
    type Action = Mark;

    fn game_type(&self) -> GameType {
        GameType::TicTacToe
    }

    fn outcome(&self) -> Outcome {
        self.outcome
    }

    fn apply(&self, actor: Seat, action: &Mark) -> Result<(Self, Outcome)> {
        ensure_unresolved(self.outcome)?;
        if actor != self.to_move {
            return Err(WagerError::NotYourTurn);
        }
        let Mark { row, col } = *action;
        if row >= SIZE || col >= SIZE {
            return Err(WagerError::IllegalMove {
                reason: format!("cell ({row}, {col}) is off the board"),
            });
        }
        if self.board[row][col].is_some() {
            return Err(WagerError::IllegalMove {
                reason: format!("cell ({row}, {col}) is occupied"),
            });
        }

        let mut next = self.clone();
        next.board[row][col] = Some(actor);
        next.moves += 1;
        next.to_move = actor.other();
        // Only the mover can have completed a line on this move.
        next.outcome = if next.completed_lines(actor) > 0 {
            Outcome::Winner(actor)
        } else if usize::from(next.moves) == SIZE * SIZE {
            Outcome::Draw
        } else {
            Outcome::Unresolved
        };
        let outcome = next.outcome;
        Ok((next, outcome))
    }
}
