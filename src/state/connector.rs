use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;

use crate::core::config::AppConfig;
use crate::core::errors::ApiError;
use crate::llm::{LlmProvider, OpenAiProvider};
use crate::vector::{IndexController, PineconeController, PineconeIndex, VectorIndex};

/// Opens clients for the hosted services from the current configuration.
///
/// Handlers call this on every request; nothing is pooled across requests.
#[async_trait]
pub trait Connector: Send + Sync {
    fn llm(&self, config: &AppConfig) -> Result<Arc<dyn LlmProvider>, ApiError>;

    fn index_controller(&self, config: &AppConfig) -> Result<Arc<dyn IndexController>, ApiError>;

    async fn vector_index(&self, config: &AppConfig) -> Result<Arc<dyn VectorIndex>, ApiError>;
}

/// OpenAI + Pinecone over HTTPS.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostedConnector;

#[async_trait]
impl Connector for HostedConnector {
    fn llm(&self, config: &AppConfig) -> Result<Arc<dyn LlmProvider>, ApiError> {
        if config.openai.api_key.trim().is_empty() {
            return Err(ApiError::Internal(
                "OPENAI_API_KEY is not configured".to_string(),
            ));
        }
        Ok(Arc::new(OpenAiProvider::new(&config.openai)))
    }

    fn index_controller(&self, config: &AppConfig) -> Result<Arc<dyn IndexController>, ApiError> {
        Ok(Arc::new(PineconeController::new(
            &config.pinecone,
            Client::new(),
        )?))
    }

    async fn vector_index(&self, config: &AppConfig) -> Result<Arc<dyn VectorIndex>, ApiError> {
        let index = PineconeIndex::connect(&config.pinecone, Client::new()).await?;
        Ok(Arc::new(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hosted_llm_requires_api_key() {
        let err = HostedConnector.llm(&AppConfig::default()).err().unwrap();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[tokio::test]
    async fn hosted_index_requires_api_key() {
        let err = HostedConnector
            .vector_index(&AppConfig::default())
            .await
            .err()
            .unwrap();
        assert!(err.to_string().contains("PINECONE_API_KEY"));
    }
}
