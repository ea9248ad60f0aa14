use crate::core::errors::ApiError;
use crate::llm::{CompletionRequest, LlmProvider};
use crate::vector::{VectorIndex, VectorQuery};

use super::prompt::{
    concatenate_matches, fill_question_prompt, serialize_chat_history, HistoryMessage,
};

/// Number of nearest neighbours retrieved per question.
pub const TOP_K: usize = 10;

/// Returned instead of an answer when the index has no neighbours.
pub const NO_MATCHES_ANSWER: &str = "No matches found, GPT-3 was not queried.";

/// Embeds `question`, retrieves context from `index` and asks `llm` to answer.
///
/// The completion model is called exactly once when at least one match is
/// found and never otherwise. Failures from either service are returned
/// unchanged; nothing is retried.
pub async fn query_vector_store_and_llm(
    index: &dyn VectorIndex,
    llm: &dyn LlmProvider,
    question: &str,
    chat_history: Option<&[HistoryMessage]>,
) -> Result<String, ApiError> {
    tracing::info!("Querying vector store...");
    let query_embedding = llm.embed_query(question).await?;

    let response = index
        .query(VectorQuery {
            vector: query_embedding,
            top_k: TOP_K,
            include_metadata: true,
            include_values: true,
            namespace: None,
        })
        .await?;

    tracing::info!("Found {} matches...", response.matches.len());
    tracing::info!("Asking question: {}...", question);

    if response.matches.is_empty() {
        tracing::info!("Since there are no matches, the completion model will not be queried.");
        return Ok(NO_MATCHES_ANSWER.to_string());
    }

    let context = concatenate_matches(&response.matches);
    // No length guard: oversized context is left for the completion service to reject.
    tracing::debug!(chars = context.len(), "Assembled retrieval context");

    let history = chat_history
        .map(serialize_chat_history)
        .unwrap_or_default();
    let prompt = fill_question_prompt(&context, &history, question);

    tracing::info!(provider = llm.name(), "Requesting completion...");
    let answer = llm.complete(CompletionRequest::new(prompt)).await?;
    tracing::info!("Answer: {}", answer);
    Ok(answer)
}

#[cfg(test)]
pub(crate) mod fakes {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::core::errors::ApiError;
    use crate::llm::{CompletionRequest, LlmProvider};
    use crate::vector::{QueryResponse, VectorIndex, VectorMatch, VectorQuery, VectorRecord};

    /// Index returning a fixed set of matches and recording every call.
    #[derive(Default)]
    pub struct FakeIndex {
        pub contents: Vec<String>,
        pub queries: Mutex<Vec<VectorQuery>>,
        pub upserted: Mutex<Vec<VectorRecord>>,
        pub fail_query: bool,
    }

    impl FakeIndex {
        pub fn with_contents(contents: &[&str]) -> Self {
            Self {
                contents: contents.iter().map(|c| c.to_string()).collect(),
                ..Self::default()
            }
        }
    }

    #[async_trait]
    impl VectorIndex for FakeIndex {
        async fn query(&self, query: VectorQuery) -> Result<QueryResponse, ApiError> {
            self.queries.lock().unwrap().push(query);
            if self.fail_query {
                return Err(ApiError::upstream("pinecone", "query failed"));
            }
            let matches = self
                .contents
                .iter()
                .enumerate()
                .map(|(i, content)| {
                    let mut metadata = serde_json::Map::new();
                    metadata.insert("pageContent".to_string(), json!(content));
                    VectorMatch {
                        id: i.to_string(),
                        score: 1.0 - i as f32 * 0.1,
                        values: vec![0.0; 3],
                        metadata: Some(metadata),
                    }
                })
                .collect();
            Ok(QueryResponse {
                matches,
                namespace: None,
            })
        }

        async fn upsert(&self, records: Vec<VectorRecord>) -> Result<usize, ApiError> {
            let n = records.len();
            self.upserted.lock().unwrap().extend(records);
            Ok(n)
        }
    }

    /// Provider with deterministic embeddings and a canned answer.
    pub struct FakeLlm {
        pub answer: String,
        pub prompts: Mutex<Vec<String>>,
        pub embed_calls: AtomicUsize,
        pub fail_completion: bool,
    }

    impl FakeLlm {
        pub fn answering(answer: &str) -> Self {
            Self {
                answer: answer.to_string(),
                prompts: Mutex::new(Vec::new()),
                embed_calls: AtomicUsize::new(0),
                fail_completion: false,
            }
        }

        pub fn completion_calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl LlmProvider for FakeLlm {
        fn name(&self) -> &str {
            "fake"
        }

        async fn embed_query(&self, text: &str) -> Result<Vec<f32>, ApiError> {
            self.embed_calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![text.len() as f32, 1.0, 0.0])
        }

        async fn embed_documents(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
            self.embed_calls.fetch_add(1, Ordering::SeqCst);
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0, 0.0]).collect())
        }

        async fn complete(&self, request: CompletionRequest) -> Result<String, ApiError> {
            self.prompts.lock().unwrap().push(request.prompt);
            if self.fail_completion {
                return Err(ApiError::upstream("openai", "completion failed"));
            }
            Ok(self.answer.clone())
        }
    }
}
