//! Integration test for LLM client connectivity.
//!
//! Run with `--features api` against live endpoints.

use llm_tictactoe::{
    AttemptOutcome, Board, Contestants, GameEvent, GameResult, LlmClient, LlmConfig, LlmProvider,
    MatchRunner, MoveRejection, Player, TextGenerator, build_prompt, parse_move,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// Accepts connections on loopback and never writes a byte back.
async fn silent_endpoint() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
    format!("http://{}", addr)
}

fn silent_client(url: String) -> LlmClient {
    LlmClient::new(
        LlmConfig::new(LlmProvider::Ollama, url, "llama3.2")
            .with_timeout(Duration::from_millis(200)),
    )
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn test_ollama_connectivity() {
    dotenvy::dotenv().ok();

    let url = std::env::var("OLLAMA_URL")
        .unwrap_or_else(|_| LlmProvider::Ollama.default_url().to_string());
    let model = std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama3.2".to_string());
    let client = LlmClient::new(LlmConfig::new(LlmProvider::Ollama, url, model));

    let prompt = build_prompt(&Board::new(), Player::X, &[]);
    let response = client.generate(&prompt).await.expect("Failed to generate");

    assert!(!response.is_empty(), "Response should not be empty");
    eprintln!("Response: {} -> {:?}", response, parse_move(&response));
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn test_anthropic_connectivity() {
    dotenvy::dotenv().ok();

    let api_key = std::env::var("ANTHROPIC_API_KEY").expect("ANTHROPIC_API_KEY not set");

    let config = LlmConfig::new(
        LlmProvider::Anthropic,
        LlmProvider::Anthropic.default_url(),
        "claude-3-5-haiku-20241022",
    )
    .with_max_tokens(50)
    .with_api_key(Some(api_key));

    let client = LlmClient::new(config);

    let response = client
        .generate("Say 'Hello, world!' and nothing else.")
        .await
        .expect("Failed to generate");

    assert!(!response.is_empty(), "Response should not be empty");
    eprintln!("Response: {}", response);
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn test_openai_connectivity() {
    dotenvy::dotenv().ok();

    let api_key = std::env::var("OPENAI_API_KEY").expect("OPENAI_API_KEY not set");

    let config = LlmConfig::new(
        LlmProvider::OpenAI,
        LlmProvider::OpenAI.default_url(),
        "gpt-4o-mini",
    )
    .with_max_tokens(50)
    .with_api_key(Some(api_key));

    let client = LlmClient::new(config);

    let response = client
        .generate("Say 'Hello, world!' and nothing else.")
        .await
        .expect("Failed to generate");

    assert!(!response.is_empty(), "Response should not be empty");
    eprintln!("Response: {}", response);
}

#[tokio::test]
async fn test_unreachable_endpoint_is_an_error() {
    let client = LlmClient::new(LlmConfig::new(
        LlmProvider::Ollama,
        "http://127.0.0.1:9",
        "llama3.2",
    ));

    let err = client.generate("4").await.unwrap_err();
    assert!(err.message.contains("Ollama request failed"));
}

#[tokio::test]
async fn test_silent_endpoint_times_out() {
    let client = silent_client(silent_endpoint().await);

    let result = tokio::time::timeout(Duration::from_secs(10), client.generate("4"))
        .await
        .expect("generate should give up on its own");

    let err = result.unwrap_err();
    assert!(err.message.contains("timed out"), "got: {}", err.message);
}

#[tokio::test]
async fn test_silent_endpoint_spends_attempts_and_abandons() {
    let client = silent_client(silent_endpoint().await);
    let (tx, mut rx) = mpsc::unbounded_channel();
    let runner = MatchRunner::new(Contestants::shared(Arc::new(client)), 2).with_events(tx);

    let record = tokio::time::timeout(Duration::from_secs(10), runner.play(1))
        .await
        .expect("game should end once the attempts are spent");
    assert_eq!(record.result, GameResult::Abandoned);
    assert!(record.moves.is_empty());

    drop(runner);
    let mut failures = 0;
    while let Some(event) = rx.recv().await {
        if let GameEvent::Attempt {
            response, outcome, ..
        } = event
        {
            assert!(response.is_none());
            let AttemptOutcome::Rejected(MoveRejection::TransportFailure(msg)) = &outcome else {
                panic!("expected a transport failure, got {:?}", outcome);
            };
            assert!(msg.contains("timed out"), "got: {}", msg);
            failures += 1;
        }
    }
    assert_eq!(failures, 2);
}
