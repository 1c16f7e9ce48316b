//! LLM API client for Ollama, OpenAI-compatible servers and Anthropic.

use crate::generator::{GenerateError, TextGenerator};
use async_openai::{
    Client as OpenAIClient,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
};
use derive_getters::Getters;
use derive_setters::Setters;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// How long one generation may take before it counts as failed.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// LLM provider selection.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LlmProvider {
    /// Ollama `/api/generate` (local models).
    #[default]
    Ollama,
    /// OpenAI chat completions, or any compatible server such as LM Studio.
    OpenAI,
    /// Anthropic messages API.
    Anthropic,
}

impl LlmProvider {
    /// Endpoint used when none is configured.
    pub fn default_url(self) -> &'static str {
        match self {
            LlmProvider::Ollama => "http://localhost:11434",
            LlmProvider::OpenAI => "https://api.openai.com/v1",
            LlmProvider::Anthropic => "https://api.anthropic.com",
        }
    }

    /// Environment variable holding the API key, if the provider uses one.
    pub fn api_key_var(self) -> Option<&'static str> {
        match self {
            LlmProvider::Ollama => None,
            LlmProvider::OpenAI => Some("OPENAI_API_KEY"),
            LlmProvider::Anthropic => Some("ANTHROPIC_API_KEY"),
        }
    }
}

/// Configuration for one model endpoint.
///
/// Game logic never looks inside; it is handed to [`LlmClient`] as is.
#[derive(Debug, Clone, Getters, Setters)]
#[setters(prefix = "with_")]
pub struct LlmConfig {
    provider: LlmProvider,
    url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout: Duration,
    #[getter(skip)]
    api_key: Option<String>,
}

impl LlmConfig {
    /// Creates a configuration with temperature 0.7, 150 max tokens and a
    /// 60 second request timeout.
    #[instrument(skip_all, fields(provider = %provider))]
    pub fn new(provider: LlmProvider, url: impl Into<String>, model: impl Into<String>) -> Self {
        debug!("Creating LLM config");
        Self {
            provider,
            url: url.into(),
            model: model.into(),
            temperature: 0.7,
            max_tokens: 150,
            timeout: DEFAULT_TIMEOUT,
            api_key: None,
        }
    }

    /// Whether an API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Ollama `/api/generate` request body.
#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

/// LLM client that abstracts over multiple providers.
#[derive(Debug, Clone)]
pub struct LlmClient {
    config: LlmConfig,
    http: reqwest::Client,
}

impl LlmClient {
    /// Creates a new LLM client.
    #[instrument(skip(config), fields(provider = %config.provider(), model = %config.model()))]
    pub fn new(config: LlmConfig) -> Self {
        info!("Creating LLM client");
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.url.trim_end_matches('/'), path)
    }

    /// Generates a completion using Ollama.
    #[instrument(skip(self, prompt))]
    async fn generate_ollama(&self, prompt: &str) -> Result<String, GenerateError> {
        let request_body = OllamaRequest {
            model: &self.config.model,
            prompt,
            stream: false,
            options: OllamaOptions {
                temperature: self.config.temperature,
            },
        };

        debug!("Sending request to Ollama");
        let response = self
            .http
            .post(self.endpoint("/api/generate"))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Ollama request failed");
                GenerateError::new(format!("Ollama request failed: {}", e))
            })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            error!(error = ?e, "Failed to read Ollama response");
            GenerateError::new(format!("Failed to read response: {}", e))
        })?;

        if !status.is_success() {
            error!(status = %status, response = %response_text, "Ollama API error");
            return Err(GenerateError::new(format!(
                "Ollama API error {}: {}",
                status, response_text
            )));
        }

        let parsed: OllamaResponse = serde_json::from_str(&response_text).map_err(|e| {
            error!(error = ?e, response = %response_text, "Failed to parse Ollama response");
            GenerateError::new(format!("Failed to parse response: {}", e))
        })?;

        info!(content_length = parsed.response.len(), "Generated completion");
        Ok(parsed.response)
    }

    /// Generates a completion using Anthropic Claude.
    #[instrument(skip(self, prompt))]
    async fn generate_anthropic(&self, prompt: &str) -> Result<String, GenerateError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| GenerateError::new("Anthropic API key not configured"))?;

        debug!("Building Anthropic API request");
        let request_body = serde_json::json!({
            "model": self.config.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": [
                {
                    "role": "user",
                    "content": prompt
                }
            ]
        });

        debug!("Sending request to Anthropic");
        let response = self
            .http
            .post(self.endpoint("/v1/messages"))
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Anthropic API request failed");
                GenerateError::new(format!("Anthropic API request failed: {}", e))
            })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            error!(error = ?e, "Failed to read Anthropic response");
            GenerateError::new(format!("Failed to read response: {}", e))
        })?;

        if !status.is_success() {
            error!(status = %status, response = %response_text, "Anthropic API error");
            return Err(GenerateError::new(format!(
                "Anthropic API error {}: {}",
                status, response_text
            )));
        }

        debug!(response_length = response_text.len(), "Parsing Anthropic response");
        let response_json: serde_json::Value =
            serde_json::from_str(&response_text).map_err(|e| {
                error!(error = ?e, response = %response_text, "Failed to parse Anthropic response");
                GenerateError::new(format!("Failed to parse response: {}", e))
            })?;

        let content = response_json["content"][0]["text"]
            .as_str()
            .ok_or_else(|| {
                error!(response = %response_json, "No text content in Anthropic response");
                GenerateError::new("No text content in Anthropic response")
            })?
            .to_string();

        info!(content_length = content.len(), "Generated completion");
        Ok(content)
    }

    /// Generates a completion using an OpenAI-compatible chat endpoint.
    #[instrument(skip(self, prompt))]
    async fn generate_openai(&self, prompt: &str) -> Result<String, GenerateError> {
        let client = OpenAIClient::with_config(
            OpenAIConfig::new()
                .with_api_base(self.config.url.trim_end_matches('/'))
                .with_api_key(self.config.api_key.clone().unwrap_or_default()),
        );

        debug!("Building chat completion request");
        let messages = vec![ChatCompletionRequestMessage::User(
            ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()
                .map_err(|e| {
                    error!(error = ?e, "Failed to build user message");
                    GenerateError::new(format!("Failed to build user message: {}", e))
                })?,
        )];

        #[allow(deprecated)]
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.config.model)
            .messages(messages)
            .temperature(self.config.temperature)
            .max_tokens(self.config.max_tokens)
            .build()
            .map_err(|e| {
                error!(error = ?e, "Failed to build request");
                GenerateError::new(format!("Failed to build request: {}", e))
            })?;

        debug!("Sending request to OpenAI");
        let response = client.chat().create(request).await.map_err(|e| {
            error!(error = ?e, "OpenAI API error");
            GenerateError::new(format!("OpenAI API error: {}", e))
        })?;

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .ok_or_else(|| {
                error!("No content in OpenAI response");
                GenerateError::new("No content in OpenAI response")
            })?;

        info!(content_length = content.len(), "Generated completion");
        Ok(content)
    }
}

#[async_trait::async_trait]
impl TextGenerator for LlmClient {
    #[instrument(skip(self, prompt))]
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        debug!(provider = %self.config.provider, model = %self.config.model, "Generating completion");
        let request = async {
            match self.config.provider {
                LlmProvider::Ollama => self.generate_ollama(prompt).await,
                LlmProvider::OpenAI => self.generate_openai(prompt).await,
                LlmProvider::Anthropic => self.generate_anthropic(prompt).await,
            }
        };

        // A server that accepts the connection but never answers would
        // otherwise hold the turn forever.
        let timeout = self.config.timeout;
        match tokio::time::timeout(timeout, request).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout_secs = timeout.as_secs_f32(), "LLM request timed out");
                Err(GenerateError::new(format!(
                    "LLM request timed out after {:.1}s",
                    timeout.as_secs_f32()
                )))
            }
        }
    }

    fn name(&self) -> &str {
        &self.config.model
    }
}
