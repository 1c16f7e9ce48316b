//! Prompt construction for the player to move.
//!
//! The prompt is the whole contract with the generator: move history,
//! the numbered board, taken and available squares, a threat analysis
//! and strict output instructions. It is a pure function of its inputs,
//! so identical games always produce identical prompts.

use crate::games::tictactoe::{Board, Move, Player, Position, Square, detect_threats};
use tracing::{instrument, trace};

/// Joins position numbers with `sep`.
fn join_positions(positions: &[Position], sep: &str) -> String {
    positions
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(sep)
}

/// Formats positions as `[0 4 8]`.
fn bracket_list(positions: &[Position]) -> String {
    format!("[{}]", join_positions(positions, " "))
}

/// Renders the board with position numbers in empty squares.
fn write_grid(out: &mut String, board: &Board) {
    out.push_str("-------------\n");
    for row in Position::ALL.chunks(3) {
        out.push_str("| ");
        for &pos in row {
            match board.get(pos) {
                Square::Empty => out.push_str(&format!("{} ", pos)),
                Square::Occupied(player) => out.push_str(&format!("{} ", player)),
            }
            out.push_str("| ");
        }
        out.push_str("\n-------------\n");
    }
}

/// Builds the move request for `player` given the current board and history.
#[instrument(skip(board, history), fields(moves = history.len()))]
pub fn build_prompt(board: &Board, player: Player, history: &[Move]) -> String {
    let opponent = player.opponent();
    let mut prompt = String::new();

    prompt.push_str(&format!("You are playing Tic-Tac-Toe as player {}.\n\n", player));

    if !history.is_empty() {
        prompt.push_str("Move history:\n");
        for (i, mv) in history.iter().enumerate() {
            prompt.push_str(&format!("{}. {}\n", i + 1, mv));
        }
        prompt.push('\n');
    }

    prompt.push_str("Current board (empty spaces show their position number):\n");
    write_grid(&mut prompt, board);

    let available = board.available();
    let taken = board.taken();

    if !taken.is_empty() {
        prompt.push_str(&format!(
            "\n⛔ POSITIONS ALREADY TAKEN (DO NOT USE): {}\n",
            join_positions(&taken, ", ")
        ));
    }

    prompt.push_str(&format!(
        "\n✅ AVAILABLE POSITIONS (CHOOSE ONE OF THESE): {}\n",
        join_positions(&available, ", ")
    ));

    let threats = detect_threats(board, player);

    prompt.push_str("\n*** CRITICAL ANALYSIS ***\n");
    if let Some(win) = threats.first_win() {
        prompt.push_str(&format!(
            "🎯 YOU CAN WIN NOW! Play position {} to win immediately!\n",
            win
        ));
        prompt.push_str(&format!(
            "WINNING MOVE DETECTED: Position {} will give you three in a row!\n",
            win
        ));
    } else if let Some(block) = threats.first_block() {
        prompt.push_str(&format!(
            "⚠️  DANGER! {} can win with position {}! You MUST BLOCK IT!\n",
            opponent, block
        ));
        prompt.push_str(&format!(
            "BLOCKING REQUIRED: If you don't play position {}, {} will win next turn!\n",
            block, opponent
        ));
    } else {
        prompt.push_str("No immediate wins or threats detected. Play strategically.\n");
        prompt.push_str(&format!(
            "Best strategy: Take center ({}) if available, then corners ({}), then edges ({})\n",
            join_positions(&Position::CENTER, ","),
            join_positions(&Position::CORNERS, ","),
            join_positions(&Position::EDGES, ","),
        ));
    }
    prompt.push_str("*** END ANALYSIS ***\n");

    prompt.push_str("\nSTRATEGY PRIORITY:\n");
    prompt.push_str("1. WIN: Play winning moves immediately\n");
    prompt.push_str(&format!("2. BLOCK: Block {}'s winning moves immediately\n", opponent));
    prompt.push_str(&format!(
        "3. STRATEGIC: Otherwise, prefer center ({}), then corners ({}), then edges ({})\n",
        join_positions(&Position::CENTER, ","),
        join_positions(&Position::CORNERS, ","),
        join_positions(&Position::EDGES, ","),
    ));

    prompt.push_str("\n⚠️  CRITICAL INSTRUCTIONS:\n");
    prompt.push_str("1. You MUST choose ONLY from the AVAILABLE POSITIONS list above\n");
    if !taken.is_empty() {
        prompt.push_str(&format!(
            "2. NEVER choose positions that are taken: {}\n",
            bracket_list(&taken)
        ));
    }
    prompt.push_str(&format!(
        "3. ONLY respond with ONE number from: {}\n",
        bracket_list(&available)
    ));
    prompt.push_str("4. Do NOT include any other text, explanation, or formatting\n");
    prompt.push_str("5. Your response should be a SINGLE digit only\n");

    trace!(prompt_length = prompt.len(), "Prompt built");
    prompt
}
