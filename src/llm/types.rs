use serde::{Deserialize, Serialize};

use crate::core::config::OpenAiConfig;

/// A single-prompt text completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    pub prompt: String,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u32>,
    pub stop: Option<Vec<String>>,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            temperature: None,
            max_tokens: None,
            stop: None,
        }
    }

    pub fn with_config(mut self, config: &OpenAiConfig) -> Self {
        self.temperature = self.temperature.or(Some(config.temperature));
        self.max_tokens = self.max_tokens.or(Some(config.max_tokens));
        self
    }
}
