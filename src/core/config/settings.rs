use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Typed view of `config.yml` merged with `secrets.yaml` and the environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub pinecone: PineconeConfig,
    pub openai: OpenAiConfig,
    pub indexing: IndexingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: defaults::SERVER_HOST.to_string(),
            port: defaults::SERVER_PORT,
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PineconeConfig {
    pub api_key: String,
    /// Legacy project environment, e.g. `us-west1-gcp`.
    pub environment: String,
    pub index_name: String,
    /// Data-plane host; resolved through the controller when unset.
    pub index_host: Option<String>,
    /// Overrides `https://controller.{environment}.pinecone.io`.
    pub controller_url: Option<String>,
    pub namespace: Option<String>,
}

impl Default for PineconeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            environment: String::new(),
            index_name: defaults::PINECONE_INDEX_NAME.to_string(),
            index_host: None,
            controller_url: None,
            namespace: None,
        }
    }
}

impl PineconeConfig {
    pub fn controller_base(&self) -> String {
        match &self.controller_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://controller.{}.pinecone.io", self.environment),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub embedding_model: String,
    pub completion_model: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: defaults::OPENAI_BASE_URL.to_string(),
            embedding_model: defaults::OPENAI_EMBEDDING_MODEL.to_string(),
            completion_model: defaults::OPENAI_COMPLETION_MODEL.to_string(),
            temperature: defaults::OPENAI_TEMPERATURE,
            max_tokens: defaults::OPENAI_MAX_TOKENS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexingConfig {
    pub documents_dir: PathBuf,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub batch_size: usize,
    pub vector_dimension: usize,
    pub metric: String,
    pub ready_timeout_secs: u64,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            documents_dir: PathBuf::from(defaults::DOCUMENTS_DIR),
            chunk_size: defaults::CHUNK_SIZE,
            chunk_overlap: defaults::CHUNK_OVERLAP,
            batch_size: defaults::BATCH_SIZE,
            vector_dimension: defaults::VECTOR_DIMENSION,
            metric: defaults::METRIC.to_string(),
            ready_timeout_secs: defaults::READY_TIMEOUT_SECS,
        }
    }
}
