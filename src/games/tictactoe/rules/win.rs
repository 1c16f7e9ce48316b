//! Win detection logic for tic-tac-toe.

use super::super::{Board, Player, Position, Square};

/// The 8 winning lines, scanned in this fixed order:
/// rows 0-2, columns 0-2, the ↘ diagonal, then the ↙ diagonal.
pub const LINES: [[Position; 3]; 8] = [
    // Rows
    [Position::TopLeft, Position::TopCenter, Position::TopRight],
    [Position::MiddleLeft, Position::Center, Position::MiddleRight],
    [Position::BottomLeft, Position::BottomCenter, Position::BottomRight],
    // Columns
    [Position::TopLeft, Position::MiddleLeft, Position::BottomLeft],
    [Position::TopCenter, Position::Center, Position::BottomCenter],
    [Position::TopRight, Position::MiddleRight, Position::BottomRight],
    // Diagonals
    [Position::TopLeft, Position::Center, Position::BottomRight],
    [Position::TopRight, Position::Center, Position::BottomLeft],
];

/// Checks if there is a winner on the board.
///
/// Returns `Some(player)` for the first line (in [`LINES`] order) holding
/// three of the same mark, `None` otherwise.
pub fn check_winner(board: &Board) -> Option<Player> {
    for [a, b, c] in LINES {
        let sq = board.get(a);
        if sq != Square::Empty && sq == board.get(b) && sq == board.get(c) {
            return match sq {
                Square::Occupied(player) => Some(player),
                Square::Empty => None,
            };
        }
    }

    None
}
