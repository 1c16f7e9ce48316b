//! Drives a single game between two generators.
//!
//! Each turn the player to move gets a fresh prompt, and the generator is
//! asked up to `max_retries` times for a legal move. Every attempt
//! (transport failure, unparsable text, occupied square) is reported as a
//! [`GameEvent::Attempt`]; running out of attempts abandons the game.

use crate::games::tictactoe::{Board, Move, Player, Position};
use crate::generator::TextGenerator;
use crate::prompt::build_prompt;
use crate::resolver::{MoveRejection, resolve_move};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, trace, warn};

/// How a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum GameResult {
    /// X completed a line.
    #[display("X wins")]
    WinnerX,
    /// O completed a line.
    #[display("O wins")]
    WinnerO,
    /// The board filled up without a line.
    #[display("Draw")]
    Draw,
    /// A player produced no legal move within the retry budget.
    #[display("Abandoned")]
    Abandoned,
}

impl GameResult {
    /// The win result for `player`.
    pub fn win_for(player: Player) -> Self {
        match player {
            Player::X => GameResult::WinnerX,
            Player::O => GameResult::WinnerO,
        }
    }
}

/// Result of one request to the generator.
#[derive(Debug, Clone)]
pub enum AttemptOutcome {
    /// The move was legal and is now on the board.
    Applied(Position),
    /// The move was refused; the attempt is spent.
    Rejected(MoveRejection),
}

impl AttemptOutcome {
    /// Whether the attempt placed a mark.
    pub fn is_applied(&self) -> bool {
        matches!(self, AttemptOutcome::Applied(_))
    }
}

/// Messages sent from the match loop to the presentation layer.
#[derive(Debug, Clone)]
pub enum GameEvent {
    /// A new game began.
    GameStarted {
        /// 1-based game number within the session.
        game_number: u32,
        /// Mark that moves first.
        starting: Player,
    },
    /// A player is about to be asked for a move.
    TurnStarted {
        /// Player to move.
        player: Player,
        /// Board before the move.
        board: Board,
    },
    /// Full prompt text, only sent in debug mode.
    PromptBuilt {
        /// Player the prompt is for.
        player: Player,
        /// Prompt text.
        prompt: String,
    },
    /// One generator request finished.
    Attempt {
        /// Player to move.
        player: Player,
        /// 1-based attempt number.
        attempt: u32,
        /// Attempt budget for this turn.
        max_attempts: u32,
        /// Raw generator text, absent on transport failure.
        response: Option<String>,
        /// What happened to the candidate move.
        outcome: AttemptOutcome,
    },
    /// A move was recorded.
    MoveApplied {
        /// The recorded move.
        mv: Move,
        /// Board after the move.
        board: Board,
    },
    /// The game reached a terminal state.
    GameFinished {
        /// 1-based game number within the session.
        game_number: u32,
        /// Final outcome.
        result: GameResult,
        /// Number of moves played.
        moves: usize,
    },
    /// Unlimited sessions pause between games.
    Intermission {
        /// Seconds until the next game starts.
        pause_secs: u64,
    },
}

/// The generator behind each mark.
#[derive(Clone)]
pub struct Contestants {
    x: Arc<dyn TextGenerator>,
    o: Arc<dyn TextGenerator>,
}

impl Contestants {
    /// Uses separate generators for X and O.
    pub fn new(x: Arc<dyn TextGenerator>, o: Arc<dyn TextGenerator>) -> Self {
        Self { x, o }
    }

    /// Uses one generator for both marks.
    pub fn shared(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            x: Arc::clone(&generator),
            o: generator,
        }
    }

    /// Generator playing `player`.
    pub fn for_player(&self, player: Player) -> &dyn TextGenerator {
        match player {
            Player::X => self.x.as_ref(),
            Player::O => self.o.as_ref(),
        }
    }
}

impl std::fmt::Debug for Contestants {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Contestants")
            .field("x", &self.x.name())
            .field("o", &self.o.name())
            .finish()
    }
}

/// Summary of a finished game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// 1-based game number within the session.
    pub game_number: u32,
    /// Mark that moved first.
    pub starting: Player,
    /// Final outcome.
    pub result: GameResult,
    /// Moves in play order.
    pub moves: Vec<Move>,
    /// Final board.
    pub board: Board,
}

/// Mark that opens game `game_number`: X for odd games, O for even ones.
pub fn starting_player(game_number: u32) -> Player {
    if game_number % 2 == 1 { Player::X } else { Player::O }
}

/// Plays games between two generators.
#[derive(Debug, Clone)]
pub struct MatchRunner {
    contestants: Contestants,
    max_retries: u32,
    debug: bool,
    events: Option<mpsc::UnboundedSender<GameEvent>>,
}

impl MatchRunner {
    /// Creates a runner allowing `max_retries` attempts per move (at least one).
    #[instrument(skip(contestants))]
    pub fn new(contestants: Contestants, max_retries: u32) -> Self {
        Self {
            contestants,
            max_retries: max_retries.max(1),
            debug: false,
            events: None,
        }
    }

    /// Sends prompt text along with the other events.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Reports progress on `events`.
    pub fn with_events(mut self, events: mpsc::UnboundedSender<GameEvent>) -> Self {
        self.events = Some(events);
        self
    }

    /// Forwards an event; a closed receiver is not an error.
    pub(crate) fn emit(&self, event: GameEvent) {
        if let Some(tx) = &self.events
            && tx.send(event).is_err()
        {
            trace!("Event receiver dropped");
        }
    }

    /// Plays game `game_number` to completion.
    ///
    /// Always returns a record: generator failures end the game as
    /// [`GameResult::Abandoned`] rather than as an error.
    #[instrument(skip(self))]
    pub async fn play(&self, game_number: u32) -> MatchRecord {
        let starting = starting_player(game_number);
        let mut board = Board::new();
        let mut moves: Vec<Move> = Vec::new();
        let mut turn = starting;

        info!(%starting, "Starting game");
        self.emit(GameEvent::GameStarted {
            game_number,
            starting,
        });

        let result = loop {
            self.emit(GameEvent::TurnStarted {
                player: turn,
                board: board.clone(),
            });

            let prompt = build_prompt(&board, turn, &moves);
            if self.debug {
                self.emit(GameEvent::PromptBuilt {
                    player: turn,
                    prompt: prompt.clone(),
                });
            }

            let Some(position) = self.request_move(&mut board, turn, &prompt).await else {
                warn!(player = %turn, attempts = self.max_retries, "No valid move, abandoning game");
                break GameResult::Abandoned;
            };

            let mv = Move::new(turn, position);
            moves.push(mv);
            self.emit(GameEvent::MoveApplied {
                mv,
                board: board.clone(),
            });

            if let Some(winner) = board.winner() {
                info!(%winner, moves = moves.len(), "Game won");
                break GameResult::win_for(winner);
            }
            if board.is_full() {
                info!(moves = moves.len(), "Game drawn");
                break GameResult::Draw;
            }

            turn = turn.opponent();
        };

        self.emit(GameEvent::GameFinished {
            game_number,
            result,
            moves: moves.len(),
        });

        MatchRecord {
            game_number,
            starting,
            result,
            moves,
            board,
        }
    }

    /// Asks the generator for `player`'s move until one applies or the budget runs out.
    #[instrument(skip(self, board, prompt))]
    async fn request_move(&self, board: &mut Board, player: Player, prompt: &str) -> Option<Position> {
        let generator = self.contestants.for_player(player);

        for attempt in 1..=self.max_retries {
            debug!(attempt, max = self.max_retries, "Requesting move");

            let (response, outcome) = match generator.generate(prompt).await {
                Ok(text) => {
                    let outcome = match resolve_move(board, player, &text) {
                        Ok(position) => AttemptOutcome::Applied(position),
                        Err(rejection) => AttemptOutcome::Rejected(rejection),
                    };
                    (Some(text), outcome)
                }
                Err(e) => (
                    None,
                    AttemptOutcome::Rejected(MoveRejection::TransportFailure(e.message)),
                ),
            };

            let applied = match &outcome {
                AttemptOutcome::Applied(position) => Some(*position),
                AttemptOutcome::Rejected(reason) => {
                    warn!(attempt, %reason, "Attempt rejected");
                    None
                }
            };

            self.emit(GameEvent::Attempt {
                player,
                attempt,
                max_attempts: self.max_retries,
                response,
                outcome,
            });

            if applied.is_some() {
                return applied;
            }
        }

        None
    }
}
