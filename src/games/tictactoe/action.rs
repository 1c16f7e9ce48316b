//! Recorded moves.

use super::{Player, Position};
use derive_new::new;
use serde::{Deserialize, Serialize};

/// A move in tic-tac-toe: a player placing their mark at a position.
///
/// Moves are created only after the board accepted them and are never
/// modified afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, new)]
pub struct Move {
    /// The player making the move.
    pub player: Player,
    /// The position where the player placed their mark.
    pub position: Position,
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {} played position {}", self.player, self.position)
    }
}
