//! Immediate win and block detection.

use super::rules::LINES;
use super::{Board, Player, Position, Square};
use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

/// Positions that decide the game on the next move.
///
/// Both lists follow [`LINES`] scan order. A square that completes two
/// lines appears twice; consumers only read the first entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Threats {
    /// Squares where the player to move completes a line.
    pub winning: Vec<Position>,
    /// Squares where the opponent would complete a line next turn.
    pub blocking: Vec<Position>,
}

impl Threats {
    /// First winning square, if any.
    pub fn first_win(&self) -> Option<Position> {
        self.winning.first().copied()
    }

    /// First square that must be blocked, if any.
    pub fn first_block(&self) -> Option<Position> {
        self.blocking.first().copied()
    }
}

/// Returns the single empty square of `line` when the other two hold `mark`.
fn completing_square(board: &Board, line: [Position; 3], mark: Player) -> Option<Position> {
    let mut marked = 0;
    let mut empty = None;
    let mut empty_count = 0;
    for pos in line {
        match board.get(pos) {
            Square::Occupied(p) if p == mark => marked += 1,
            Square::Empty => {
                empty_count += 1;
                empty = Some(pos);
            }
            Square::Occupied(_) => {}
        }
    }
    if marked == 2 && empty_count == 1 { empty } else { None }
}

/// Scans all winning lines for `player`'s immediate wins and the
/// opponent's immediate wins that need blocking.
#[instrument(skip(board))]
pub fn detect_threats(board: &Board, player: Player) -> Threats {
    let opponent = player.opponent();
    let mut threats = Threats::default();

    for line in LINES {
        if let Some(pos) = completing_square(board, line, player) {
            threats.winning.push(pos);
        }
        if let Some(pos) = completing_square(board, line, opponent) {
            threats.blocking.push(pos);
        }
    }

    trace!(?threats, "Threat scan complete");
    threats
}
