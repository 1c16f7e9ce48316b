//! Core domain types for tic-tac-toe.

use super::position::Position;
use super::rules;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Player in the game, identified by the mark it places.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
pub enum Player {
    /// Player X.
    #[display("X")]
    X,
    /// Player O.
    #[display("O")]
    O,
}

impl Player {
    /// Returns the opponent player.
    pub fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }
}

/// A square on the tic-tac-toe board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Square {
    /// Empty square.
    Empty,
    /// Square occupied by a player.
    Occupied(Player),
}

/// 3x3 tic-tac-toe board.
///
/// The only way to place a mark is [`Board::apply`], which refuses
/// occupied or out-of-range cells, so every occupied square corresponds
/// to exactly one completed move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// Squares in row-major order (0-8).
    squares: [Square; 9],
}

impl Board {
    /// Creates a new empty board.
    pub fn new() -> Self {
        Self {
            squares: [Square::Empty; 9],
        }
    }

    /// Gets the square at the given position.
    pub fn get(&self, pos: Position) -> Square {
        self.squares[pos.to_index()]
    }

    /// Checks if a square is empty.
    pub fn is_empty(&self, pos: Position) -> bool {
        self.get(pos) == Square::Empty
    }

    /// Returns true iff `index` is on the board (0-8) and its square is empty.
    #[instrument(skip(self))]
    pub fn is_valid_move(&self, index: usize) -> bool {
        Position::from_index(index).is_some_and(|pos| self.is_empty(pos))
    }

    /// Places `player`'s mark at `index`.
    ///
    /// Returns `false` and leaves the board untouched when the move is not
    /// valid (see [`Board::is_valid_move`]).
    #[instrument(skip(self))]
    pub fn apply(&mut self, index: usize, player: Player) -> bool {
        if !self.is_valid_move(index) {
            debug!(index, "Rejected move on invalid square");
            return false;
        }
        self.squares[index] = Square::Occupied(player);
        true
    }

    /// Returns the winning player, if any line holds three equal marks.
    pub fn winner(&self) -> Option<Player> {
        rules::check_winner(self)
    }

    /// Checks if no empty square remains.
    pub fn is_full(&self) -> bool {
        rules::is_full(self)
    }

    /// Returns all squares as a slice.
    pub fn squares(&self) -> &[Square; 9] {
        &self.squares
    }

    /// Empty positions in ascending order.
    pub fn available(&self) -> Vec<Position> {
        Position::ALL
            .iter()
            .copied()
            .filter(|&pos| self.is_empty(pos))
            .collect()
    }

    /// Occupied positions in ascending order.
    pub fn taken(&self) -> Vec<Position> {
        Position::ALL
            .iter()
            .copied()
            .filter(|&pos| !self.is_empty(pos))
            .collect()
    }

    /// Number of marks on the board.
    pub fn mark_count(&self) -> usize {
        self.squares.iter().filter(|s| **s != Square::Empty).count()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
