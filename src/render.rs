//! Console presentation of game events and session statistics.

use crate::games::tictactoe::{Board, Position, Square};
use crate::match_runner::{AttemptOutcome, GameEvent};
use crate::session::SessionStats;
use tokio::sync::mpsc;
use tracing::{debug, instrument};

const RULE_WIDTH: usize = 50;

/// Draws the board with row and column headers.
pub fn render_board(board: &Board) -> String {
    let mut out = String::from("\n  0 | 1 | 2\n -----------\n");
    for (row, cells) in Position::ALL.chunks(3).enumerate() {
        let marks: Vec<String> = cells
            .iter()
            .map(|&pos| match board.get(pos) {
                Square::Empty => " ".to_string(),
                Square::Occupied(player) => player.to_string(),
            })
            .collect();
        out.push_str(&format!("{} {}\n", row, marks.join(" | ")));
        if row < 2 {
            out.push_str(" -----------\n");
        }
    }
    out
}

/// Console text for one event.
pub fn describe_event(event: &GameEvent) -> String {
    match event {
        GameEvent::GameStarted {
            game_number,
            starting,
        } => format!(
            "\n=== Game {} ===\nPlayer {} moves first{}",
            game_number,
            starting,
            render_board(&Board::new())
        ),
        GameEvent::TurnStarted { player, .. } => format!("\n--- Player {}'s turn ---", player),
        GameEvent::PromptBuilt { prompt, .. } => format!(
            "\n========== PROMPT DEBUG ==========\n{}\n==================================\n",
            prompt
        ),
        GameEvent::Attempt {
            attempt,
            max_attempts,
            response,
            outcome,
            player,
        } => {
            let mut text = format!(
                "Requesting move from LLM (attempt {}/{})...",
                attempt, max_attempts
            );
            if let Some(response) = response {
                text.push_str(&format!("\nLLM response: {}", response.trim()));
            }
            match outcome {
                AttemptOutcome::Applied(pos) => {
                    text.push_str(&format!(
                        "\nPlayer {} plays position {} (row {}, col {})",
                        player,
                        pos,
                        pos.row(),
                        pos.col()
                    ));
                }
                AttemptOutcome::Rejected(reason) => {
                    text.push_str(&format!("\nInvalid move: {}", reason));
                }
            }
            text
        }
        GameEvent::MoveApplied { board, .. } => render_board(board),
        GameEvent::GameFinished { result, moves, .. } => {
            format!("Result: {}\nTotal moves played: {}", result, moves)
        }
        GameEvent::Intermission { pause_secs } => format!(
            "\nPress Ctrl+C to stop, or the next game will start in {} seconds...",
            pause_secs
        ),
    }
}

/// Prints events until every sender is dropped.
#[instrument(skip(events))]
pub async fn run_console(mut events: mpsc::UnboundedReceiver<GameEvent>) {
    while let Some(event) = events.recv().await {
        println!("{}", describe_event(&event));
    }
    debug!("Event stream closed");
}

/// Final statistics block.
///
/// The abandoned row only appears when a game was abandoned.
pub fn format_report(stats: &SessionStats) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = String::new();
    out.push_str(&format!("\n{}\n", rule));
    out.push_str("FINAL STATISTICS\n");
    out.push_str(&format!("{}\n", rule));
    out.push_str(&format!("Total games played: {}\n", stats.total_games));

    let mut row = |label: &str, count: u32| {
        out.push_str(&format!(
            "{:<20}{} ({:.1}%)\n",
            label,
            count,
            stats.percentage(count)
        ));
    };
    row("Player X wins:", stats.x_wins);
    row("Player O wins:", stats.o_wins);
    row("Draws:", stats.draws);
    if stats.abandoned > 0 {
        row("Abandoned:", stats.abandoned);
    }

    out.push_str(&format!("{}\n", rule));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::tictactoe::Player;
    use crate::match_runner::GameResult;

    #[test]
    fn test_render_board_shows_marks_and_blanks() {
        let mut board = Board::new();
        board.apply(0, Player::X);
        board.apply(4, Player::O);
        let text = render_board(&board);
        assert!(text.contains("0 X |   |  \n"));
        assert!(text.contains("1   | O |  \n"));
        assert!(text.starts_with("\n  0 | 1 | 2\n"));
    }

    #[test]
    fn test_report_with_no_games_does_not_divide_by_zero() {
        let report = format_report(&SessionStats::new());
        assert!(report.contains("Total games played: 0"));
        assert!(report.contains("Player X wins:      0 (0.0%)"));
        assert!(!report.contains("Abandoned"));
    }

    #[test]
    fn test_report_lists_abandoned_games() {
        let mut stats = SessionStats::new();
        for result in [GameResult::WinnerX, GameResult::Draw, GameResult::Abandoned] {
            stats.record(result);
        }
        let report = format_report(&stats);
        assert!(report.contains("Player X wins:      1 (33.3%)"));
        assert!(report.contains("Player O wins:      0 (0.0%)"));
        assert!(report.contains("Draws:              1 (33.3%)"));
        assert!(report.contains("Abandoned:          1 (33.3%)"));
    }
}
