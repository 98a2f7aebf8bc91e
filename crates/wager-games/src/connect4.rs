//! Connect 4: 6 rows × 7 columns, discs drop to the lowest empty cell,
//! four in a row wins.
//!
//! Row 0 is the top of the board; discs settle at the highest free row
//! index of their column.

use serde::{Deserialize, Serialize};
use wager_types::{GameType, Outcome, Result, Seat, WagerError};

use crate::rules::{GameRules, ensure_unresolved};

pub const ROWS: usize = 6;
pub const COLS: usize = 7;
pub const CONNECT: usize = 4;

/// Scan axes: horizontal, vertical, and both diagonals.
const AXES: [(isize, isize); 4] = [(0, 1), (1, 0), (1, 1), (1, -1)];

/// Drop a disc into `column`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropDisc {
    pub column: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connect4 {
    board: [[Option<Seat>; COLS]; ROWS],
    to_move: Seat,
    moves: u8,
    outcome: Outcome,
}

impl Connect4 {
    #[must_use]
    pub fn new() -> Self {
        Self {
            board: [[None; COLS]; ROWS],
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

    /// Row a disc dropped into `column` would land on.
    #[must_use]
    pub fn landing_row(&self, column: usize) -> Option<usize> {
        if column >= COLS {
            return None;
        }
        (0..ROWS).rev().find(|&row| self.board[row][column].is_none())
    }

    /// Length of the run of `seat` discs through `(row, col)` along `axis`.
    fn run_length(&self, row: usize, col: usize, seat: Seat, (dr, dc): (isize, isize)) -> usize {
        let mut count = 1;
        for sign in [1isize, -1] {
            let (mut r, mut c) = (row as isize + dr * sign, col as isize + dc * sign);
            while r >= 0
                && c >= 0
                && (r as usize) < ROWS
                && (c as usize) < COLS
                && self.board[r as usize][c as usize] == Some(seat)
            {
                count += 1;
                r += dr * sign;
                c += dc * sign;
            }
        }
        count
    }
}

impl Default for Connect4 {
    fn default() -> Self {
        Self::new()
    }
}

impl GameRules for Connect4 {
    type Action = DropDisc;

    fn game_type(&self) -> GameType {
        GameType::Connect4
    }

    fn outcome(&self) -> Outcome {
        self.outcome
    }

    fn apply(&self, actor: Seat, action: &DropDisc) -> Result<(Self, Outcome)> {
        ensure_unresolved(self.outcome)?;
        if actor != self.to_move {
            return Err(WagerError::NotYourTurn);
        }
        let column = action.column;
        if column >= COLS {
            return Err(WagerError::IllegalMove {
                reason: format!("column {column} is off the board"),
            });
        }
        let row = self.landing_row(column).ok_or_else(|| WagerError::IllegalMove {
            reason: format!("column {column} is full"),
        })?;

        let mut next = self.clone();
        next.board[row][column] = Some(actor);
        next.moves += 1;
        next.to_move = actor.other();
        let connected = AXES
            .iter()
            .any(|&axis| next.run_length(row, column, actor, axis) >= CONNECT);
        next.outcome = if connected {
            Outcome::Winner(actor)
        } else if usize::from(next.moves) == ROWS * COLS {
            Outcome::Draw
        } else {
            Outcome::Unresolved
        };
        let outcome = next.outcome;
        Ok((next, outcome))
    }
}
