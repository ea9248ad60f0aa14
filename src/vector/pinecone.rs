//! Pinecone REST client.
//!
//! Uses the environment-scoped API: the controller at
//! `https://controller.{environment}.pinecone.io` manages indexes and each
//! index serves queries from its own data-plane host. Both planes
//! authenticate with the `Api-Key` header.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{json, Value};

use super::store::{
    IndexController, IndexDescription, QueryResponse, VectorIndex, VectorQuery, VectorRecord,
};
use crate::core::config::PineconeConfig;
use crate::core::errors::ApiError;

const SERVICE: &str = "pinecone";

/// Control-plane client for one Pinecone project environment.
#[derive(Clone)]
pub struct PineconeController {
    base_url: String,
    api_key: String,
    client: Client,
}

impl PineconeController {
    pub fn new(config: &PineconeConfig, client: Client) -> Result<Self, ApiError> {
        require_credentials(config)?;
        Ok(Self {
            base_url: config.controller_base(),
            api_key: config.api_key.clone(),
            client,
        })
    }

    fn authed(&self, req: RequestBuilder) -> RequestBuilder {
        req.header("Api-Key", &self.api_key)
    }
}

#[derive(Deserialize)]
struct DescribeResponse {
    database: DatabaseInfo,
    #[serde(default)]
    status: DatabaseStatus,
}

#[derive(Deserialize)]
struct DatabaseInfo {
    name: String,
    #[serde(default)]
    dimension: Option<usize>,
}

#[derive(Deserialize, Default)]
struct DatabaseStatus {
    #[serde(default)]
    ready: bool,
    #[serde(default)]
    host: Option<String>,
}

#[async_trait]
impl IndexController for PineconeController {
    async fn list_indexes(&self) -> Result<Vec<String>, ApiError> {
        let url = format!("{}/databases", self.base_url);
        let res = send(self.authed(self.client.get(&url))).await?;
        res.json::<Vec<String>>()
            .await
            .map_err(|e| ApiError::upstream(SERVICE, e))
    }

    async fn create_index(
        &self,
        name: &str,
        dimension: usize,
        metric: &str,
    ) -> Result<(), ApiError> {
        let url = format!("{}/databases", self.base_url);
        let body = json!({
            "name": name,
            "dimension": dimension,
            "metric": metric,
        });
        send(self.authed(self.client.post(&url).json(&body))).await?;
        tracing::info!("Requested creation of index {} (dimension {})", name, dimension);
        Ok(())
    }

    async fn describe_index(&self, name: &str) -> Result<IndexDescription, ApiError> {
        let url = format!("{}/databases/{}", self.base_url, name);
        let res = self.authed(self.client.get(&url)).send().await;
        let res = res.map_err(|e| ApiError::upstream(SERVICE, e))?;
        if res.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(format!("Index {} does not exist", name)));
        }
        let res = check_status(res).await?;
        let payload: DescribeResponse = res
            .json()
            .await
            .map_err(|e| ApiError::upstream(SERVICE, e))?;

        Ok(IndexDescription {
            name: payload.database.name,
            dimension: payload.database.dimension,
            ready: payload.status.ready,
            host: payload.status.host,
        })
    }
}

/// Data-plane client bound to a single index host.
#[derive(Clone)]
pub struct PineconeIndex {
    host: String,
    api_key: String,
    namespace: Option<String>,
    client: Client,
}

impl PineconeIndex {
    /// Opens a client for the configured index, asking the controller for
    /// its host unless `index_host` is set.
    pub async fn connect(config: &PineconeConfig, client: Client) -> Result<Self, ApiError> {
        require_credentials(config)?;

        let host = match &config.index_host {
            Some(host) if !host.trim().is_empty() => host.trim().to_string(),
            _ => {
                let controller = PineconeController::new(config, client.clone())?;
                controller
                    .describe_index(&config.index_name)
                    .await
                    .map_err(|err| match err {
                        // Only the readiness poll treats a missing index as retryable.
                        ApiError::NotFound(message) => ApiError::upstream(SERVICE, message),
                        other => other,
                    })?
                    .host
                    .ok_or_else(|| {
                        ApiError::upstream(
                            SERVICE,
                            format!("index {} has no host yet", config.index_name),
                        )
                    })?
            }
        };

        Ok(Self {
            host: normalize_host(&host),
            api_key: config.api_key.clone(),
            namespace: config.namespace.clone(),
            client,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn query(&self, mut query: VectorQuery) -> Result<QueryResponse, ApiError> {
        if query.namespace.is_none() {
            query.namespace = self.namespace.clone();
        }
        let url = format!("{}/query", self.host);
        let req = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&query);
        let res = send(req).await?;
        res.json::<QueryResponse>()
            .await
            .map_err(|e| ApiError::upstream(SERVICE, e))
    }

    async fn upsert(&self, records: Vec<VectorRecord>) -> Result<usize, ApiError> {
        if records.is_empty() {
            return Ok(0);
        }
        let url = format!("{}/vectors/upsert", self.host);
        let mut body = json!({ "vectors": records });
        if let (Some(ns), Some(obj)) = (&self.namespace, body.as_object_mut()) {
            obj.insert("namespace".to_string(), json!(ns));
        }
        let req = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&body);
        let res = send(req).await?;
        let payload: Value = res.json().await.map_err(|e| ApiError::upstream(SERVICE, e))?;
        let count = payload
            .get("upsertedCount")
            .and_then(|v| v.as_u64())
            .unwrap_or(0) as usize;
        Ok(count)
    }
}

fn require_credentials(config: &PineconeConfig) -> Result<(), ApiError> {
    if config.api_key.trim().is_empty() {
        return Err(ApiError::Internal(
            "PINECONE_API_KEY is not configured".to_string(),
        ));
    }
    let has_location = config.controller_url.is_some()
        || config.index_host.is_some()
        || !config.environment.trim().is_empty();
    if !has_location {
        return Err(ApiError::Internal(
            "PINECONE_ENVIRONMENT is not configured".to_string(),
        ));
    }
    Ok(())
}

fn normalize_host(host: &str) -> String {
    let host = host.trim_end_matches('/');
    if host.contains("://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    }
}

async fn send(req: RequestBuilder) -> Result<reqwest::Response, ApiError> {
    let res = req.send().await.map_err(|e| ApiError::upstream(SERVICE, e))?;
    check_status(res).await
}

async fn check_status(res: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    if res.status().is_success() {
        return Ok(res);
    }
    let status = res.status();
    let text = res.text().await.unwrap_or_default();
    Err(ApiError::upstream(
        SERVICE,
        format!("request failed with {}: {}", status, text),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use tokio::net::TcpListener;

    async fn spawn_mock(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn config_for(base: &str) -> PineconeConfig {
        PineconeConfig {
            api_key: "pc-key".to_string(),
            environment: "test-env".to_string(),
            index_name: "docs".to_string(),
            controller_url: Some(base.to_string()),
            ..PineconeConfig::default()
        }
    }

    #[test]
    fn controller_url_defaults_to_environment_host() {
        let config = PineconeConfig {
            environment: "us-west1-gcp".to_string(),
            ..PineconeConfig::default()
        };
        assert_eq!(
            config.controller_base(),
            "https://controller.us-west1-gcp.pinecone.io"
        );
    }

    #[test]
    fn normalize_host_adds_scheme() {
        assert_eq!(
            normalize_host("docs-abc.svc.us-west1-gcp.pinecone.io"),
            "https://docs-abc.svc.us-west1-gcp.pinecone.io"
        );
        assert_eq!(normalize_host("http://127.0.0.1:9/"), "http://127.0.0.1:9");
    }

    #[test]
    fn missing_api_key_is_rejected() {
        let config = PineconeConfig::default();
        let err = PineconeController::new(&config, Client::new()).err().unwrap();
        assert!(err.to_string().contains("PINECONE_API_KEY"));
    }

    #[tokio::test]
    async fn connect_resolves_host_and_queries() {
        // The controller and the data plane share one mock server here.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let host = base.clone();

        let app = Router::new()
            .route(
                "/databases/:name",
                get(move |Path(name): Path<String>, headers: HeaderMap| {
                    let host = host.clone();
                    async move {
                        assert_eq!(headers["api-key"], "pc-key");
                        Json(json!({
                            "database": { "name": name, "dimension": 1536 },
                            "status": { "ready": true, "host": host }
                        }))
                    }
                }),
            )
            .route(
                "/query",
                post(|Json(body): Json<Value>| async move {
                    assert_eq!(body["topK"], 10);
                    assert_eq!(body["includeValues"], true);
                    Json(json!({
                        "matches": [
                            { "id": "1", "score": 0.9, "values": [0.1],
                              "metadata": { "pageContent": "hello" } }
                        ],
                        "namespace": ""
                    }))
                }),
            );
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let index = PineconeIndex::connect(&config_for(&base), Client::new())
            .await
            .unwrap();
        assert_eq!(index.host(), base);

        let response = index
            .query(VectorQuery {
                vector: vec![0.1],
                top_k: 10,
                include_metadata: true,
                include_values: true,
                namespace: None,
            })
            .await
            .unwrap();

        assert_eq!(response.matches.len(), 1);
        assert_eq!(response.matches[0].page_content(), Some("hello"));
    }

    #[tokio::test]
    async fn describe_missing_index_is_not_found() {
        let app = Router::new().route(
            "/databases/:name",
            get(|| async { (StatusCode::NOT_FOUND, "not found") }),
        );
        let base = spawn_mock(app).await;
        let controller = PineconeController::new(&config_for(&base), Client::new()).unwrap();

        let err = controller.describe_index("docs").await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn connect_to_missing_index_is_upstream_failure() {
        let app = Router::new().route(
            "/databases/:name",
            get(|| async { (StatusCode::NOT_FOUND, "not found") }),
        );
        let base = spawn_mock(app).await;

        let err = PineconeIndex::connect(&config_for(&base), Client::new())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ApiError::Upstream { service: "pinecone", .. }));
        assert!(err.to_string().contains("docs"));
    }

    #[tokio::test]
    async fn upsert_reports_count() {
        let app = Router::new().route(
            "/vectors/upsert",
            post(|Json(body): Json<Value>| async move {
                let n = body["vectors"].as_array().map(|v| v.len()).unwrap_or(0);
                Json(json!({ "upsertedCount": n }))
            }),
        );
        let base = spawn_mock(app).await;
        let mut config = config_for(&base);
        config.index_host = Some(base.clone());
        let index = PineconeIndex::connect(&config, Client::new()).await.unwrap();

        let record = VectorRecord {
            id: "a".to_string(),
            values: vec![1.0],
            metadata: serde_json::Map::new(),
        };
        let count = index.upsert(vec![record.clone(), record]).await.unwrap();
        assert_eq!(count, 2);
    }
}
