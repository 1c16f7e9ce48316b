//! The text-generation capability the match loop depends on.

use derive_more::{Display, Error};
use tracing::{error, instrument};

/// Something that turns a prompt into raw text.
///
/// Implementations may fail for any reason (network, HTTP status,
/// malformed body). The match loop treats every failure as one spent
/// attempt and never aborts on it.
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generates a completion for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;

    /// Short name used in logs and reports (usually the model id).
    fn name(&self) -> &str;
}

/// Text generation error.
#[derive(Debug, Clone, Display, Error)]
#[display("Generation error: {} at {}:{}", message, file, line)]
pub struct GenerateError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl GenerateError {
    /// Creates a new generation error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        let message = message.into();
        error!(error_message = %message, "Generation error created");
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
