//! Vector index traits and the wire shapes shared by every backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::core::errors::ApiError;

/// Metadata key holding a chunk's raw text.
pub const PAGE_CONTENT_KEY: &str = "pageContent";

/// Nearest-neighbour query by embedding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VectorQuery {
    pub vector: Vec<f32>,
    pub top_k: usize,
    pub include_metadata: bool,
    pub include_values: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
}

/// One neighbour returned by the index. Owned by the external store; only
/// its presence is checked here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VectorMatch {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub score: f32,
    #[serde(default)]
    pub values: Vec<f32>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

impl VectorMatch {
    /// The chunk text stored under `pageContent`, if any.
    pub fn page_content(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get(PAGE_CONTENT_KEY))
            .and_then(|v| v.as_str())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    pub matches: Vec<VectorMatch>,
    #[serde(default)]
    pub namespace: Option<String>,
}

/// A vector with metadata, ready for upsert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: Map<String, Value>,
}

/// Description of a named index as reported by the control plane.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDescription {
    pub name: String,
    pub dimension: Option<usize>,
    pub ready: bool,
    pub host: Option<String>,
}

/// Data-plane operations on one index.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Search for the nearest neighbours of `query.vector`.
    async fn query(&self, query: VectorQuery) -> Result<QueryResponse, ApiError>;

    /// Insert or overwrite records, returning the upserted count.
    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<usize, ApiError>;
}

/// Control-plane operations: listing, creating and describing indexes.
#[async_trait]
pub trait IndexController: Send + Sync {
    async fn list_indexes(&self) -> Result<Vec<String>, ApiError>;

    async fn create_index(&self, name: &str, dimension: usize, metric: &str)
        -> Result<(), ApiError>;

    async fn describe_index(&self, name: &str) -> Result<IndexDescription, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn query_serializes_in_camel_case() {
        let query = VectorQuery {
            vector: vec![0.5],
            top_k: 10,
            include_metadata: true,
            include_values: true,
            namespace: None,
        };
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({
                "vector": [0.5],
                "topK": 10,
                "includeMetadata": true,
                "includeValues": true
            })
        );
    }

    #[test]
    fn page_content_reads_metadata() {
        let response: QueryResponse = serde_json::from_value(json!({
            "matches": [
                { "id": "a", "score": 0.9, "metadata": { "pageContent": "alpha" } },
                { "id": "b", "score": 0.8 }
            ]
        }))
        .unwrap();

        assert_eq!(response.matches[0].page_content(), Some("alpha"));
        assert_eq!(response.matches[1].page_content(), None);
        assert!(response.matches[1].values.is_empty());
    }
}
