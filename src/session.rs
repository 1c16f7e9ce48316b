//! Runs a series of games and keeps the tally.

use crate::match_runner::{GameEvent, GameResult, MatchRunner};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tracing::{debug, info, instrument};

/// Outcome counters for a session. Counters only ever grow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Games completed.
    pub total_games: u32,
    /// Games won by X.
    pub x_wins: u32,
    /// Games won by O.
    pub o_wins: u32,
    /// Games drawn.
    pub draws: u32,
    /// Games abandoned after retry exhaustion.
    pub abandoned: u32,
}

impl SessionStats {
    /// Creates empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one finished game.
    #[instrument(skip(self))]
    pub fn record(&mut self, result: GameResult) {
        self.total_games += 1;
        match result {
            GameResult::WinnerX => self.x_wins += 1,
            GameResult::WinnerO => self.o_wins += 1,
            GameResult::Draw => self.draws += 1,
            GameResult::Abandoned => self.abandoned += 1,
        }
    }

    /// `count` as a percentage of all games, rounded to one decimal.
    ///
    /// Returns `0.0` before any game has completed.
    pub fn percentage(&self, count: u32) -> f64 {
        if self.total_games == 0 {
            return 0.0;
        }
        let pct = f64::from(count) / f64::from(self.total_games) * 100.0;
        (pct * 10.0).round() / 10.0
    }
}

/// Cooperative stop request, honoured only between games.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    stopped: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl StopSignal {
    /// Creates a signal that has not fired.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the session to stop after the current game.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    /// Whether a stop was requested.
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    /// Sleeps for `duration`, waking early if a stop is requested.
    async fn pause(&self, duration: Duration) {
        // Register before checking the flag so a concurrent stop is not missed.
        let notified = self.notify.notified();
        if self.is_stopped() {
            return;
        }
        tokio::select! {
            _ = tokio::time::sleep(duration) => {}
            _ = notified => {}
        }
    }
}

/// Plays games one after another.
#[derive(Debug, Clone)]
pub struct Session {
    runner: MatchRunner,
    games: u32,
    pause: Duration,
    stop: StopSignal,
}

impl Session {
    /// Creates a session of `games` games; `0` means unlimited.
    #[instrument(skip(runner))]
    pub fn new(runner: MatchRunner, games: u32) -> Self {
        Self {
            runner,
            games,
            pause: Duration::from_secs(2),
            stop: StopSignal::new(),
        }
    }

    /// Delay between games in unlimited mode.
    pub fn with_pause(mut self, pause: Duration) -> Self {
        self.pause = pause;
        self
    }

    /// Uses `stop` to end the session early.
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    /// Whether the session runs until stopped.
    pub fn is_unlimited(&self) -> bool {
        self.games == 0
    }

    /// Plays until the game count is reached or a stop is requested.
    ///
    /// A stop never interrupts a game in progress.
    #[instrument(skip(self), fields(games = self.games))]
    pub async fn run(&self) -> SessionStats {
        let mut stats = SessionStats::new();
        let mut game_number: u32 = 1;

        loop {
            if !self.is_unlimited() && game_number > self.games {
                break;
            }
            if self.stop.is_stopped() {
                info!(completed = stats.total_games, "Stop requested, ending session");
                break;
            }

            let record = self.runner.play(game_number).await;
            stats.record(record.result);
            debug!(?stats, "Statistics updated");

            game_number += 1;

            if self.is_unlimited() && !self.stop.is_stopped() {
                self.runner.emit(GameEvent::Intermission {
                    pause_secs: self.pause.as_secs(),
                });
                self.stop.pause(self.pause).await;
            }
        }

        info!(
            total = stats.total_games,
            x_wins = stats.x_wins,
            o_wins = stats.o_wins,
            draws = stats.draws,
            abandoned = stats.abandoned,
            "Session finished"
        );
        stats
    }
}
