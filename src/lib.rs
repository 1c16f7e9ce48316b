//! Tic-tac-toe between two text-generation endpoints.
//!
//! # Architecture
//!
//! - **Games**: board model, win/draw rules and threat analysis
//! - **Prompt**: the full game context rendered for the player to move
//! - **Resolver**: raw generator text to a validated, applied move
//! - **Match runner**: one game with bounded retries per move
//! - **Session**: a series of games and their statistics
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use llm_tictactoe::{
//!     Contestants, LlmClient, LlmConfig, LlmProvider, MatchRunner, Session,
//! };
//!
//! # async fn example() {
//! let config = LlmConfig::new(LlmProvider::Ollama, "http://localhost:11434", "llama3.2");
//! let contestants = Contestants::shared(Arc::new(LlmClient::new(config)));
//! let runner = MatchRunner::new(contestants, 3);
//! let stats = Session::new(runner, 5).run().await;
//! println!("X won {} of {}", stats.x_wins, stats.total_games);
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod games;
mod generator;
mod llm_client;
mod match_runner;
mod prompt;
mod render;
mod resolver;
mod session;

// Crate-level exports - Configuration
pub use config::{ConfigError, SessionConfig};

// Crate-level exports - Generators
pub use generator::{GenerateError, TextGenerator};
pub use llm_client::{LlmClient, LlmConfig, LlmProvider};

// Crate-level exports - Game types (tic-tac-toe)
pub use games::tictactoe::{
    Board, Move, Player, Position, Square, Threats, detect_threats, rules,
};

// Crate-level exports - Move resolution
pub use prompt::build_prompt;
pub use resolver::{MoveRejection, ParseError, parse_move, resolve_move};

// Crate-level exports - Match and session control
pub use match_runner::{
    AttemptOutcome, Contestants, GameEvent, GameResult, MatchRecord, MatchRunner,
    starting_player,
};
pub use session::{Session, SessionStats, StopSignal};

// Crate-level exports - Presentation
pub use render::{describe_event, format_report, render_board, run_console};
