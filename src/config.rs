//! Session configuration loaded from TOML with CLI overrides.

use crate::games::tictactoe::Player;
use crate::llm_client::{DEFAULT_TIMEOUT, LlmConfig, LlmProvider};
use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Everything needed to run a session.
#[derive(Debug, Clone, PartialEq, Getters, Setters, Serialize, Deserialize)]
#[setters(prefix = "with_")]
pub struct SessionConfig {
    /// LLM provider (ollama, openai or anthropic).
    #[serde(default)]
    provider: LlmProvider,

    /// Endpoint base URL; the provider's default when unset.
    #[serde(default)]
    url: Option<String>,

    /// Model playing X, and O unless `model_o` is set.
    #[serde(default = "default_model")]
    model: String,

    /// Separate model for O.
    #[serde(default)]
    model_o: Option<String>,

    /// Sampling temperature, 0.0-2.0.
    #[serde(default = "default_temperature")]
    temperature: f32,

    /// Maximum tokens per response (OpenAI and Anthropic).
    #[serde(default = "default_max_tokens")]
    max_tokens: u32,

    /// Attempts per move before a game is abandoned.
    #[serde(default = "default_max_retries")]
    max_retries: u32,

    /// Show full prompts.
    #[serde(default)]
    debug: bool,

    /// Number of games, 0 for unlimited.
    #[serde(default = "default_games")]
    games: u32,

    /// Pause between games in unlimited mode.
    #[serde(default = "default_pause_secs")]
    pause_secs: u64,

    /// Seconds a single LLM request may take before the attempt fails.
    #[serde(default = "default_timeout_secs")]
    timeout_secs: u64,
}

fn default_model() -> String {
    "llama3.2".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    150
}

fn default_max_retries() -> u32 {
    3
}

fn default_games() -> u32 {
    1
}

fn default_pause_secs() -> u64 {
    2
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            url: None,
            model: default_model(),
            model_o: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_retries: default_max_retries(),
            debug: false,
            games: default_games(),
            pause_secs: default_pause_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SessionConfig {
    /// Loads configuration from a TOML file. Missing keys take defaults.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(model = %config.model, games = config.games, "Config loaded successfully");
        Ok(config)
    }

    /// Checks value ranges.
    #[instrument(skip(self))]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_retries == 0 {
            return Err(ConfigError::new("max_retries must be at least 1"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::new(format!(
                "temperature must be between 0.0 and 2.0, got {}",
                self.temperature
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::new("timeout_secs must be at least 1"));
        }
        if self.model.trim().is_empty() {
            return Err(ConfigError::new("model must not be empty"));
        }
        Ok(())
    }

    /// Endpoint actually used: the configured URL or the provider default.
    pub fn endpoint(&self) -> &str {
        self.url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_url())
    }

    /// Model playing `player`.
    pub fn model_for(&self, player: Player) -> &str {
        match (player, self.model_o.as_deref()) {
            (Player::O, Some(model)) => model,
            _ => &self.model,
        }
    }

    /// Builds the generator configuration for `player`.
    ///
    /// Anthropic requires `ANTHROPIC_API_KEY`; `OPENAI_API_KEY` is optional
    /// so local OpenAI-compatible servers work without one.
    #[instrument(skip(self), fields(provider = %self.provider))]
    pub fn llm_config_for(&self, player: Player) -> Result<LlmConfig, ConfigError> {
        let api_key = match self.provider.api_key_var() {
            Some(var) => match std::env::var(var) {
                Ok(key) => Some(key),
                Err(_) if self.provider == LlmProvider::Anthropic => {
                    return Err(ConfigError::new(format!(
                        "{} environment variable not set",
                        var
                    )));
                }
                Err(_) => {
                    warn!(var, "API key not set, sending requests without one");
                    None
                }
            },
            None => None,
        };

        Ok(
            LlmConfig::new(self.provider, self.endpoint(), self.model_for(player))
                .with_temperature(self.temperature)
                .with_max_tokens(self.max_tokens)
                .with_timeout(Duration::from_secs(self.timeout_secs))
                .with_api_key(api_key),
        )
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
