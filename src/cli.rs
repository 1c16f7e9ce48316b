//! Command-line interface for llm_tictactoe.

use clap::Parser;
use llm_tictactoe::{LlmProvider, SessionConfig};
use std::path::PathBuf;

/// Tic-Tac-Toe: LLM vs LLM
#[derive(Parser, Debug)]
#[command(name = "llm_tictactoe")]
#[command(about = "Plays tic-tac-toe between two LLM endpoints", long_about = None)]
#[command(version)]
pub struct Cli {
    /// TOML config file; flags below override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Provider: ollama, openai or anthropic
    #[arg(long)]
    pub provider: Option<LlmProvider>,

    /// API base URL (Ollama, LM Studio, OpenAI or Anthropic)
    #[arg(long)]
    pub url: Option<String>,

    /// Model to use (e.g., llama3.2, llama3.1:70b, qwen2.5, mistral)
    #[arg(long)]
    pub model: Option<String>,

    /// Separate model for player O
    #[arg(long)]
    pub model_o: Option<String>,

    /// Sampling temperature (0.0-2.0)
    #[arg(long)]
    pub temperature: Option<f32>,

    /// Maximum retries for invalid moves
    #[arg(long)]
    pub retries: Option<u32>,

    /// Show full prompts sent to LLM
    #[arg(long)]
    pub debug: bool,

    /// Number of games to play (0 for unlimited)
    #[arg(long)]
    pub games: Option<u32>,

    /// Seconds to wait between games in unlimited mode
    #[arg(long)]
    pub pause: Option<u64>,

    /// Seconds to wait for one LLM response before counting a failed attempt
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Write final statistics as JSON to this path
    #[arg(long)]
    pub stats_json: Option<PathBuf>,
}

impl Cli {
    /// Applies flags given on the command line on top of `config`.
    pub fn apply(&self, mut config: SessionConfig) -> SessionConfig {
        if let Some(provider) = self.provider {
            config = config.with_provider(provider);
        }
        if let Some(url) = &self.url {
            config = config.with_url(Some(url.clone()));
        }
        if let Some(model) = &self.model {
            config = config.with_model(model.clone());
        }
        if let Some(model_o) = &self.model_o {
            config = config.with_model_o(Some(model_o.clone()));
        }
        if let Some(temperature) = self.temperature {
            config = config.with_temperature(temperature);
        }
        if let Some(retries) = self.retries {
            config = config.with_max_retries(retries);
        }
        if self.debug {
            config = config.with_debug(true);
        }
        if let Some(games) = self.games {
            config = config.with_games(games);
        }
        if let Some(pause) = self.pause {
            config = config.with_pause_secs(pause);
        }
        if let Some(timeout) = self.timeout {
            config = config.with_timeout_secs(timeout);
        }
        config
    }
}
