//! Turning raw generator text into a board move.

use crate::games::tictactoe::{Board, Player, Position};
use derive_more::{Display, Error};
use tracing::{debug, instrument, warn};

/// No position digit could be found in a response.
#[derive(Debug, Clone, Display, Error)]
#[display("no digit 0-8 found in response {:?} at {}:{}", response, file, line)]
pub struct ParseError {
    /// The trimmed response that failed to parse.
    pub response: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ParseError {
    /// Creates a new parse error.
    #[track_caller]
    pub fn new(response: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            response: response.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Why a candidate move was not applied.
#[derive(Debug, Clone, Display)]
pub enum MoveRejection {
    /// The response contained no digit 0-8.
    #[display("{}", _0)]
    ParseFailure(ParseError),

    /// The parsed value maps outside the 3x3 grid.
    #[display("row {} col {} is off the board", row, col)]
    OutOfRange {
        /// Row derived from the parsed value.
        row: usize,
        /// Column derived from the parsed value.
        col: usize,
    },

    /// The square is already occupied.
    #[display("position {} is already taken", _0)]
    CellTaken(Position),

    /// The generator call itself failed.
    #[display("generator call failed: {}", _0)]
    TransportFailure(String),
}

impl std::error::Error for MoveRejection {}

/// Extracts the first single digit 0-8 from `raw`.
///
/// Only one character is read: `"12"` yields `1` and `"9"` is skipped.
#[instrument]
pub fn parse_move(raw: &str) -> Result<usize, ParseError> {
    let trimmed = raw.trim();
    trimmed
        .chars()
        .find(|c| ('0'..='8').contains(c))
        .and_then(|c| c.to_digit(10))
        .map(|d| d as usize)
        .ok_or_else(|| ParseError::new(trimmed))
}

/// Parses `raw`, validates the square and places `player`'s mark.
///
/// The board is only modified when `Ok` is returned.
#[instrument(skip(board))]
pub fn resolve_move(board: &mut Board, player: Player, raw: &str) -> Result<Position, MoveRejection> {
    let index = parse_move(raw).map_err(MoveRejection::ParseFailure)?;

    let (row, col) = (index / 3, index % 3);
    let position = Position::from_row_col(row, col).ok_or_else(|| {
        warn!(row, col, "Parsed move is off the board");
        MoveRejection::OutOfRange { row, col }
    })?;

    if !board.apply(position.to_index(), player) {
        debug!(%position, "Square already occupied");
        return Err(MoveRejection::CellTaken(position));
    }

    debug!(%position, %player, "Move applied");
    Ok(position)
}
