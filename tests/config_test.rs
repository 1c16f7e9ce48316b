//! Tests for session configuration.

use llm_tictactoe::{LlmProvider, Player, SessionConfig};
use std::io::Write;

#[test]
fn test_defaults_match_cli_defaults() {
    let config = SessionConfig::default();
    assert_eq!(*config.provider(), LlmProvider::Ollama);
    assert_eq!(config.endpoint(), "http://localhost:11434");
    assert_eq!(config.model(), "llama3.2");
    assert_eq!(*config.max_retries(), 3);
    assert_eq!(*config.games(), 1);
    assert!(!*config.debug());
    assert_eq!(*config.timeout_secs(), 60);
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_partial_toml() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
provider = "openai"
url = "http://localhost:1234/v1"
model = "qwen2.5"
model_o = "mistral"
games = 0
temperature = 0.2
"#
    )
    .unwrap();

    let config = SessionConfig::from_file(file.path()).unwrap();
    assert_eq!(*config.provider(), LlmProvider::OpenAI);
    assert_eq!(config.endpoint(), "http://localhost:1234/v1");
    assert_eq!(config.model_for(Player::X), "qwen2.5");
    assert_eq!(config.model_for(Player::O), "mistral");
    assert_eq!(*config.games(), 0);
    assert_eq!(*config.max_retries(), 3);
}

#[test]
fn test_missing_file_is_an_error() {
    let err = SessionConfig::from_file("/nonexistent/llm_tictactoe.toml").unwrap_err();
    assert!(err.message.contains("Failed to read config file"));
}

#[test]
fn test_invalid_toml_is_an_error() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "games = \"many\"").unwrap();
    let err = SessionConfig::from_file(file.path()).unwrap_err();
    assert!(err.message.contains("Failed to parse config"));
}

#[test]
fn test_validate_rejects_zero_retries() {
    let config = SessionConfig::default().with_max_retries(0);
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_temperature_out_of_range() {
    assert!(SessionConfig::default().with_temperature(2.5).validate().is_err());
    assert!(SessionConfig::default().with_temperature(-0.1).validate().is_err());
    assert!(SessionConfig::default().with_temperature(2.0).validate().is_ok());
}

#[test]
fn test_o_shares_model_by_default() {
    let config = SessionConfig::default().with_model("phi3".to_string());
    assert_eq!(config.model_for(Player::O), "phi3");
}

#[test]
fn test_ollama_config_needs_no_key() {
    let config = SessionConfig::default().with_temperature(1.1);
    let llm = config.llm_config_for(Player::X).unwrap();
    assert_eq!(llm.url(), "http://localhost:11434");
    assert_eq!(*llm.temperature(), 1.1);
    assert!(!llm.has_api_key());
}

#[test]
fn test_validate_rejects_zero_timeout() {
    let config = SessionConfig::default().with_timeout_secs(0);
    assert!(config.validate().is_err());
}

#[test]
fn test_timeout_reaches_llm_config() {
    let config = SessionConfig::default().with_timeout_secs(7);
    let llm = config.llm_config_for(Player::O).unwrap();
    assert_eq!(*llm.timeout(), std::time::Duration::from_secs(7));
}
