use async_trait::async_trait;

use super::types::CompletionRequest;
use crate::core::errors::ApiError;

#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// return the provider name (e.g. "openai")
    fn name(&self) -> &str;

    /// embed a single query string
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, ApiError>;

    /// embed a batch of documents, one vector per input in order
    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ApiError>;

    /// text completion (non-streaming)
    async fn complete(&self, request: CompletionRequest) -> Result<String, ApiError>;
}
