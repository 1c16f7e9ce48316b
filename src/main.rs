//! Tic-Tac-Toe: LLM vs LLM
//!
//! Plays a series of games between two model endpoints and prints the
//! final statistics.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use llm_tictactoe::{
    Contestants, LlmClient, MatchRunner, Player, Session, SessionConfig, SessionStats,
    StopSignal, format_report, run_console,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, instrument, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    initialize_tracing();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    print_banner(&config);

    let stats = run_session(&config).await?;

    print!("{}", format_report(&stats));

    if let Some(path) = &cli.stats_json {
        write_stats(path, &stats)?;
    }

    Ok(())
}

/// Logs go to stderr so the console board on stdout stays readable.
fn initialize_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,llm_tictactoe=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[instrument(skip(cli))]
fn load_config(cli: &Cli) -> Result<SessionConfig> {
    let base = match &cli.config {
        Some(path) => SessionConfig::from_file(path)?,
        None => SessionConfig::default(),
    };
    let config = cli.apply(base);
    config.validate()?;
    info!(?config, "Configuration ready");
    Ok(config)
}

fn print_banner(config: &SessionConfig) {
    println!("=== Tic-Tac-Toe: LLM vs LLM ===");
    println!("Provider: {}", config.provider());
    println!("Using model: {}", config.model_for(Player::X));
    if config.model_o().is_some() {
        println!("Model for O: {}", config.model_for(Player::O));
    }
    println!("API URL: {}", config.endpoint());
    println!("Temperature: {}", config.temperature());
    println!("Max retries: {}", config.max_retries());
    println!("Request timeout: {}s", config.timeout_secs());
    if *config.games() == 0 {
        println!("Games to play: Unlimited");
    } else {
        println!("Games to play: {}", config.games());
    }
}

#[instrument(skip(config))]
async fn run_session(config: &SessionConfig) -> Result<SessionStats> {
    let x = LlmClient::new(config.llm_config_for(Player::X)?);
    let o = LlmClient::new(config.llm_config_for(Player::O)?);
    let contestants = Contestants::new(Arc::new(x), Arc::new(o));

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let console = tokio::spawn(run_console(event_rx));

    let stop = StopSignal::new();
    tokio::spawn(watch_ctrl_c(stop.clone()));

    let runner = MatchRunner::new(contestants, *config.max_retries())
        .with_debug(*config.debug())
        .with_events(event_tx);
    let session = Session::new(runner, *config.games())
        .with_pause(Duration::from_secs(*config.pause_secs()))
        .with_stop_signal(stop);

    let stats = session.run().await;

    // Dropping the session closes the event channel so the console drains.
    drop(session);
    console.await.context("Console task failed")?;

    Ok(stats)
}

/// First Ctrl+C finishes the current game; a second one exits immediately.
async fn watch_ctrl_c(stop: StopSignal) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Could not listen for Ctrl+C");
        return;
    }
    println!("\nStopping after the current game (Ctrl+C again to quit now)...");
    stop.stop();

    if tokio::signal::ctrl_c().await.is_ok() {
        warn!("Second Ctrl+C, exiting without statistics");
        std::process::exit(130);
    }
}

#[instrument(skip(stats))]
fn write_stats(path: &std::path::Path, stats: &SessionStats) -> Result<()> {
    let json = serde_json::to_string_pretty(stats)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write statistics to {}", path.display()))?;
    info!(path = %path.display(), "Statistics written");
    Ok(())
}
