//! Draw detection logic for tic-tac-toe.

use super::super::{Board, Square};

/// Checks if the board is full (all squares occupied).
///
/// A full board with no winner indicates a draw.
pub fn is_full(board: &Board) -> bool {
    board.squares().iter().all(|s| *s != Square::Empty)
}

#[cfg(test)]
mod tests {
    use super::super::super::{Player, Position};
    use super::super::win::check_winner;
    use super::*;

    fn is_draw(board: &Board) -> bool {
        is_full(board) && check_winner(board).is_none()
    }

    #[test]
    fn test_empty_board_not_full() {
        let board = Board::new();
        assert!(!is_full(&board));
    }

    #[test]
    fn test_partial_board_not_full() {
        let mut board = Board::new();
        board.apply(Position::Center.to_index(), Player::X);
        assert!(!is_full(&board));
    }

    #[test]
    fn test_draw_detection() {
        let mut board = Board::new();
        // X O X / O X X / O X O
        let marks = [
            Player::X,
            Player::O,
            Player::X,
            Player::O,
            Player::X,
            Player::X,
            Player::O,
            Player::X,
            Player::O,
        ];
        for (i, player) in marks.into_iter().enumerate() {
            board.apply(i, player);
        }

        assert!(is_draw(&board));
    }

    #[test]
    fn test_not_draw_if_winner() {
        let mut board = Board::new();
        for pos in [Position::TopLeft, Position::TopCenter, Position::TopRight] {
            board.apply(pos.to_index(), Player::X);
        }
        board.apply(Position::MiddleLeft.to_index(), Player::O);
        board.apply(Position::Center.to_index(), Player::O);

        assert!(!is_draw(&board));
    }
}
