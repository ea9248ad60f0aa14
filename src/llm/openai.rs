use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::provider::LlmProvider;
use super::types::CompletionRequest;
use crate::core::config::OpenAiConfig;
use crate::core::errors::ApiError;

const SERVICE: &str = "openai";

/// OpenAI-compatible embeddings and completions over HTTP.
#[derive(Clone)]
pub struct OpenAiProvider {
    base_url: String,
    api_key: String,
    embedding_model: String,
    completion_model: String,
    sampling: OpenAiConfig,
    client: Client,
}

impl OpenAiProvider {
    pub fn new(config: &OpenAiConfig) -> Self {
        Self::with_client(config, Client::new())
    }

    pub fn with_client(config: &OpenAiConfig, client: Client) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            embedding_model: config.embedding_model.clone(),
            completion_model: config.completion_model.clone(),
            sampling: config.clone(),
            client,
        }
    }

    async fn post(
        &self,
        path: &str,
        body: serde_json::Value,
    ) -> Result<reqwest::Response, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.client.post(&url).json(&body);
        if !self.api_key.is_empty() {
            req = req.bearer_auth(&self.api_key);
        }

        let res = req
            .send()
            .await
            .map_err(|e| ApiError::upstream(SERVICE, e))?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::upstream(
                SERVICE,
                format!("{} returned {}: {}", path, status, text),
            ));
        }

        Ok(res)
    }
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Deserialize)]
struct EmbeddingItem {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    #[serde(default)]
    text: String,
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn embed_query(&self, text: &str) -> Result<Vec<f32>, ApiError> {
        let mut vectors = self.embed_documents(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| ApiError::upstream(SERVICE, "embedding response was empty"))
    }

    async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = json!({
            "model": self.embedding_model,
            "input": texts,
        });

        let res = self.post("/embeddings", body).await?;
        let mut payload: EmbeddingResponse = res
            .json()
            .await
            .map_err(|e| ApiError::upstream(SERVICE, e))?;

        if payload.data.len() != texts.len() {
            return Err(ApiError::upstream(
                SERVICE,
                format!(
                    "expected {} embeddings, got {}",
                    texts.len(),
                    payload.data.len()
                ),
            ));
        }

        payload.data.sort_by_key(|item| item.index);
        Ok(payload.data.into_iter().map(|item| item.embedding).collect())
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, ApiError> {
        let request = request.with_config(&self.sampling);
        let mut body = json!({
            "model": self.completion_model,
            "prompt": request.prompt,
        });

        if let Some(obj) = body.as_object_mut() {
            if let Some(t) = request.temperature {
                obj.insert("temperature".to_string(), json!(t));
            }
            if let Some(t) = request.max_tokens {
                obj.insert("max_tokens".to_string(), json!(t));
            }
            if let Some(s) = request.stop {
                obj.insert("stop".to_string(), json!(s));
            }
        }

        let res = self.post("/completions", body).await?;
        let payload: CompletionResponse = res
            .json()
            .await
            .map_err(|e| ApiError::upstream(SERVICE, e))?;

        let text = payload
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.text)
            .ok_or_else(|| ApiError::upstream(SERVICE, "completion response had no choices"))?;

        Ok(text.trim().to_string())
    }
}
