//! Default values for every configurable setting.

pub const SERVER_HOST: &str = "127.0.0.1";
pub const SERVER_PORT: u16 = 3000;

pub const PINECONE_INDEX_NAME: &str = "ragchat-index";

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const OPENAI_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
pub const OPENAI_COMPLETION_MODEL: &str = "gpt-3.5-turbo-instruct";
pub const OPENAI_TEMPERATURE: f64 = 0.7;
pub const OPENAI_MAX_TOKENS: u32 = 256;

pub const DOCUMENTS_DIR: &str = "documents";
pub const CHUNK_SIZE: usize = 1000;
pub const CHUNK_OVERLAP: usize = 200;
pub const BATCH_SIZE: usize = 100;
/// Output width of `text-embedding-ada-002`.
pub const VECTOR_DIMENSION: usize = 1536;
pub const METRIC: &str = "cosine";
pub const READY_TIMEOUT_SECS: u64 = 180;

pub fn local_origins() -> Vec<String> {
    vec![
        "http://localhost".to_string(),
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
        "http://127.0.0.1".to_string(),
        "http://127.0.0.1:3000".to_string(),
        "http://127.0.0.1:5173".to_string(),
    ]
}
