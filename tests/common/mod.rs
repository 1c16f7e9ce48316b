//! Shared test helpers.

#![allow(dead_code)]

use llm_tictactoe::{GenerateError, TextGenerator};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Replays canned responses in order; `None` entries and an empty queue
/// behave like a failed HTTP call.
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Option<String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn new(responses: &[&str]) -> Self {
        Self::with_failures(&responses.iter().map(|r| Some(*r)).collect::<Vec<_>>())
    }

    pub fn with_failures(responses: &[Option<&str>]) -> Self {
        Self {
            responses: Mutex::new(responses.iter().map(|r| r.map(str::to_string)).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.responses.lock().unwrap().pop_front() {
            Some(Some(text)) => Ok(text),
            Some(None) => Err(GenerateError::new("connection refused")),
            None => Err(GenerateError::new("script exhausted")),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
